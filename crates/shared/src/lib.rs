//! Shared utilities and common types for the course access backend.
//!
//! This crate provides common functionality used across all other crates:
//! - HMAC signing and verification
//! - Signed access tokens
//! - Telegram deep-link resolution
//! - Common validation logic

pub mod access_token;
pub mod crypto;
pub mod deep_link;
pub mod validation;
