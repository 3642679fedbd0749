//! Repository implementations for database operations.

pub mod enrollment;

pub use enrollment::EnrollmentRepository;
