//! Gated access to a course's Telegram group.
//!
//! A link is produced only for an `APPROVED` enrollment that belongs to the
//! requesting user and matches the requested course. This holds for both
//! entry points: the direct request (trusting the caller's identity plus an
//! ownership check) and the redemption of a signed access token.

use metrics::counter;
use shared::access_token::{self, DEFAULT_TOKEN_TTL_SECS};
use shared::deep_link::{self, TelegramLink};
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::AccessError;
use crate::models::{AccessGrant, Course, Enrollment, EnrollmentStatus, IssuedAccessLink};
use crate::services::enrollment::EnrollmentService;
use crate::store::EnrollmentStore;

/// Settings for signed access links.
#[derive(Clone)]
pub struct TokenSettings {
    /// Shared application secret used to sign tokens.
    secret: String,
    /// Token lifetime in seconds.
    pub ttl_secs: i64,
    /// Public base URL the access link points at.
    pub base_url: String,
}

impl TokenSettings {
    pub fn new(secret: impl Into<String>, ttl_secs: i64, base_url: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
            base_url: base_url.into(),
        }
    }

    pub fn with_default_ttl(secret: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::new(secret, DEFAULT_TOKEN_TTL_SECS, base_url)
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Entry point for obtaining course channel links.
#[derive(Clone)]
pub struct AccessGateway {
    store: Arc<dyn EnrollmentStore>,
    enrollments: EnrollmentService,
    tokens: TokenSettings,
}

impl AccessGateway {
    pub fn new(
        store: Arc<dyn EnrollmentStore>,
        enrollments: EnrollmentService,
        tokens: TokenSettings,
    ) -> Self {
        Self {
            store,
            enrollments,
            tokens,
        }
    }

    /// Returns the Telegram link for an approved enrollment and records the
    /// first join.
    pub async fn request_access(
        &self,
        user_id: &str,
        course_id: &str,
        enrollment_id: &str,
    ) -> Result<AccessGrant, AccessError> {
        require_fields(user_id, course_id, enrollment_id)?;

        let enrollment = self
            .store
            .find_enrollment(enrollment_id)
            .await?
            .ok_or(AccessError::EnrollmentNotFound)?;

        authorize(&enrollment, user_id, course_id)?;
        self.grant(enrollment).await
    }

    /// Issues a signed, time-limited access link for an approved enrollment.
    pub async fn issue_access_link(
        &self,
        user_id: &str,
        course_id: &str,
        enrollment_id: &str,
    ) -> Result<IssuedAccessLink, AccessError> {
        require_fields(user_id, course_id, enrollment_id)?;

        let enrollment = self
            .store
            .find_enrollment(enrollment_id)
            .await?
            .ok_or(AccessError::EnrollmentNotFound)?;

        authorize(&enrollment, user_id, course_id)?;
        let (course, _) = self.linked_course(course_id).await?;

        let token = access_token::issue(
            course_id,
            user_id,
            &self.tokens.secret,
            self.tokens.ttl_secs,
        );

        info!(
            enrollment_id = %enrollment.id,
            user_id = %user_id,
            course_id = %course_id,
            expires_at = token.expires_at,
            "Access link issued"
        );

        let access_url = access_token::access_url(&self.tokens.base_url, &token);
        Ok(IssuedAccessLink {
            share_url: deep_link::share_url(&access_url, &course.title),
            access_url,
            expires_at: token.expires_at,
        })
    }

    /// Redeems a signed access token carried in `raw_query`.
    ///
    /// Every token failure is reported as the same error.
    pub async fn redeem_access_token(&self, raw_query: &str) -> Result<AccessGrant, AccessError> {
        let verified = access_token::parse_and_verify(raw_query, &self.tokens.secret)
            .map_err(|e| {
                warn!(reason = %e, "Rejected access token");
                AccessError::InvalidToken(e)
            })?;

        let enrollment = self
            .store
            .find_enrollment_for(&verified.user_id, &verified.course_id)
            .await?
            .ok_or(AccessError::EnrollmentNotFound)?;

        authorize(&enrollment, &verified.user_id, &verified.course_id)?;
        self.grant(enrollment).await
    }

    /// Loads a course that has a group link configured.
    async fn linked_course(&self, course_id: &str) -> Result<(Course, String), AccessError> {
        let course = self
            .store
            .find_course(course_id)
            .await?
            .ok_or(AccessError::CourseNotFound)?;

        let link = course
            .group_link()
            .map(str::to_string)
            .ok_or(AccessError::LinkUnavailable)?;
        Ok((course, link))
    }

    async fn course_link(&self, course_id: &str) -> Result<String, AccessError> {
        let (_, link) = self.linked_course(course_id).await?;
        Ok(link)
    }

    async fn grant(&self, enrollment: Enrollment) -> Result<AccessGrant, AccessError> {
        let link = self.course_link(&enrollment.course_id).await?;
        let already_joined = enrollment.has_joined();

        if !already_joined {
            // Best-effort: a failed write still returns the link.
            if let Err(e) = self.enrollments.mark_joined(&enrollment.id).await {
                counter!("telegram_join_record_failures_total").increment(1);
                warn!(
                    enrollment_id = %enrollment.id,
                    error = %e,
                    "Failed to record Telegram join"
                );
            }
        }

        let resolved = TelegramLink::classify(&link);
        if !resolved.is_actionable() {
            warn!(
                course_id = %enrollment.course_id,
                "Course group link is not a recognised Telegram link; passing through"
            );
        }

        counter!("telegram_access_granted_total").increment(1);
        info!(
            enrollment_id = %enrollment.id,
            user_id = %enrollment.user_id,
            course_id = %enrollment.course_id,
            already_joined = already_joined,
            "Telegram access granted"
        );

        Ok(AccessGrant {
            link: resolved.to_app_uri(),
            already_joined,
        })
    }
}

fn require_fields(user_id: &str, course_id: &str, enrollment_id: &str) -> Result<(), AccessError> {
    let missing: Vec<&str> = [
        ("userId", user_id),
        ("courseId", course_id),
        ("enrollmentId", enrollment_id),
    ]
    .iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| *name)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AccessError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Ownership, approval and course checks, in that order.
fn authorize(enrollment: &Enrollment, user_id: &str, course_id: &str) -> Result<(), AccessError> {
    if enrollment.user_id != user_id {
        return Err(AccessError::Forbidden);
    }
    if enrollment.status != EnrollmentStatus::Approved {
        return Err(AccessError::NotApproved);
    }
    if enrollment.course_id != course_id {
        return Err(AccessError::CourseMismatch);
    }
    Ok(())
}
