//! Database entity definitions (row mappings).

pub mod course;
pub mod enrollment;

pub use course::CourseEntity;
pub use enrollment::{EnrollmentEntity, EnrollmentStatusDb};
