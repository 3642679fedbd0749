//! Persistence layer for the course access backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - The PostgreSQL record store implementation

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
