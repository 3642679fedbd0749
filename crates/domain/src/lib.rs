//! Domain layer for the course access backend.
//!
//! This crate contains:
//! - Domain models (Enrollment, Course, access requests)
//! - The record store collaborator trait and an in-memory implementation
//! - Business logic services (enrollment lifecycle, access gateway)
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;
pub mod store;
