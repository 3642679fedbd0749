//! HTTP route handlers.

pub mod access;
pub mod enrollments;
pub mod health;
