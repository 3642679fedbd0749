//! Domain services for course access.
//!
//! Services contain business logic that operates on domain models.

pub mod access_gateway;
pub mod enrollment;

pub use access_gateway::{AccessGateway, TokenSettings};
pub use enrollment::EnrollmentService;
