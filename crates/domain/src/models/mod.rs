//! Domain models for course access.

pub mod access;
pub mod course;
pub mod enrollment;

pub use access::{
    AccessGrant, IssueAccessLinkResponse, IssuedAccessLink, RequestAccessRequest,
    RequestAccessResponse,
};
pub use course::Course;
pub use enrollment::{
    Enrollment, EnrollmentStatus, ParseStatusError, StatusChange, TransitionEnrollmentRequest,
    TransitionEnrollmentResponse,
};
