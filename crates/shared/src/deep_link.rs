//! Telegram deep-link resolution.
//!
//! Turns web sharing links (`https://t.me/...`) into `tg://` URIs that open
//! the installed client directly. Matchers run in order and the last one
//! always matches, so resolution never fails. Share URLs for the web
//! share endpoint are built here too.

use std::fmt;

/// Legacy invite-code marker.
const JOINCHAT_MARKER: &str = "joinchat/";

/// Marker of a `+`-prefixed invite path segment.
const PLUS_MARKER: &str = "/+";

/// Marker preceding a public handle.
const HANDLE_MARKER: &str = "t.me/";

/// Telegram's web share endpoint.
const SHARE_ENDPOINT: &str = "https://t.me/share/url";

/// Shape of an external group link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelegramLink {
    /// Private invite (`t.me/joinchat/<code>` or `t.me/+<code>`).
    InviteCode(String),
    /// Public channel or group (`t.me/<handle>`).
    Handle(String),
    /// Anything else, passed through verbatim.
    Opaque(String),
}

impl TelegramLink {
    /// Classifies a link by running the matchers in order.
    pub fn classify(link: &str) -> Self {
        if let Some(code) = match_invite_code(link) {
            return TelegramLink::InviteCode(code.to_string());
        }
        // An invite marker without a code is not a handle.
        if has_invite_marker(link) {
            return TelegramLink::Opaque(link.to_string());
        }
        if let Some(handle) = match_handle(link) {
            return TelegramLink::Handle(handle.to_string());
        }
        TelegramLink::Opaque(link.to_string())
    }

    /// Renders the app URI for this link.
    pub fn to_app_uri(&self) -> String {
        match self {
            TelegramLink::InviteCode(code) => format!("tg://join?invite={}", code),
            TelegramLink::Handle(handle) => format!("tg://resolve?domain={}", handle),
            TelegramLink::Opaque(link) => link.clone(),
        }
    }

    /// Whether the link was recognised as a Telegram link.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, TelegramLink::Opaque(_))
    }
}

impl fmt::Display for TelegramLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_app_uri())
    }
}

/// Resolves an external link into an app URI, or returns it unchanged.
pub fn resolve(link: &str) -> String {
    TelegramLink::classify(link).to_app_uri()
}

/// Builds the message sent alongside a shared course link.
pub fn share_message(course_title: &str, link: &str) -> String {
    format!(
        "Check out this course: *{}*\n\nAccess it here: {}",
        course_title, link
    )
}

/// Builds a Telegram share URL that pre-fills `link` and a message about
/// `course_title`.
pub fn share_url(link: &str, course_title: &str) -> String {
    let message = share_message(course_title, link);
    let query = serde_urlencoded::to_string(&[("url", link), ("text", message.as_str())])
        .unwrap_or_default();
    format!("{}?{}", SHARE_ENDPOINT, query)
}

/// Returns the text after `marker` up to the next `?` or `/`.
fn segment_after<'a>(link: &'a str, marker: &str) -> Option<&'a str> {
    let start = link.find(marker)? + marker.len();
    let rest = &link[start..];
    let end = rest.find(&['?', '/'][..]).unwrap_or(rest.len());
    Some(&rest[..end]).filter(|segment| !segment.is_empty())
}

/// Returns the link from the first `/+` in its path onwards.
///
/// The scheme separator and the query string are skipped.
fn plus_segment(link: &str) -> Option<&str> {
    let rest = link.split_once("://").map_or(link, |(_, rest)| rest);
    let path = rest.split('?').next().unwrap_or(rest);
    let start = path.find(PLUS_MARKER)?;
    Some(&rest[start..])
}

fn match_invite_code(link: &str) -> Option<&str> {
    segment_after(link, JOINCHAT_MARKER)
        .or_else(|| plus_segment(link).and_then(|tail| segment_after(tail, PLUS_MARKER)))
}

fn has_invite_marker(link: &str) -> bool {
    link.contains(JOINCHAT_MARKER) || plus_segment(link).is_some()
}

fn match_handle(link: &str) -> Option<&str> {
    segment_after(link, HANDLE_MARKER)
}
