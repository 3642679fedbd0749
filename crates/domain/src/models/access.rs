//! Request and response models for gated channel access.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for obtaining a course's Telegram link.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RequestAccessRequest {
    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_identifier"))]
    pub user_id: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_identifier"))]
    pub course_id: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_identifier"))]
    pub enrollment_id: String,
}

/// Link handed to a user who may join the course channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    /// App URI (or the verbatim link when it was not recognised).
    pub link: String,
    /// True when the join had been recorded before this request.
    pub already_joined: bool,
}

/// Response for a successful access request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAccessResponse {
    pub success: bool,
    pub telegram_link: String,
    pub already_joined: bool,
}

impl From<AccessGrant> for RequestAccessResponse {
    fn from(grant: AccessGrant) -> Self {
        Self {
            success: true,
            telegram_link: grant.link,
            already_joined: grant.already_joined,
        }
    }
}

/// A signed, shareable access link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedAccessLink {
    pub access_url: String,
    /// Telegram share URL pre-filled with the access link.
    pub share_url: String,
    /// Unix seconds.
    pub expires_at: i64,
}

/// Response for a newly issued access link.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueAccessLinkResponse {
    pub success: bool,
    pub access_url: String,
    pub share_url: String,
    pub expires_at: i64,
}

impl From<IssuedAccessLink> for IssueAccessLinkResponse {
    fn from(link: IssuedAccessLink) -> Self {
        Self {
            success: true,
            access_url: link.access_url,
            share_url: link.share_url,
            expires_at: link.expires_at,
        }
    }
}
