//! Course domain model.

use serde::{Deserialize, Serialize};

/// A course whose Telegram group is gated behind enrollment approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    /// External group link; access is unavailable without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_group_link: Option<String>,
}

impl Course {
    /// Returns the configured group link, ignoring blank values.
    pub fn group_link(&self) -> Option<&str> {
        shared::validation::non_blank(self.telegram_group_link.as_deref())
    }
}
