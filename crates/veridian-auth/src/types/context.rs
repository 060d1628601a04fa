//! Per-request context types.
//!
//! The hosting layer authenticates the user (cookies, sessions) and hands
//! the core a typed `RequestContext` carrying exactly what validation needs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// An authenticated principal, as established by the hosting layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Stable subject identifier (`sub` claim).
    pub id: String,

    /// When the user last actively authenticated. Compared against the
    /// request's `max_age` parameter.
    #[serde(with = "time::serde::rfc3339")]
    pub auth_time: OffsetDateTime,

    /// Profile claims known to the hosting layer (name, email, ...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub claims: Map<String, Value>,
}

impl Subject {
    /// Creates a subject authenticated just now, with no extra claims.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            auth_time: OffsetDateTime::now_utc(),
            claims: Map::new(),
        }
    }

    /// Returns the seconds elapsed since the last active authentication.
    #[must_use]
    pub fn auth_age_seconds(&self) -> i64 {
        (OffsetDateTime::now_utc() - self.auth_time).whole_seconds()
    }
}

/// Typed request context passed from the hosting layer into the core.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// The authenticated user, if any.
    pub subject: Option<Subject>,

    /// Public base URI of this deployment, for building absolute URLs.
    pub base_uri: Option<String>,
}

impl RequestContext {
    /// Creates an anonymous context.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Creates a context for an authenticated subject.
    #[must_use]
    pub fn authenticated(subject: Subject) -> Self {
        Self {
            subject: Some(subject),
            base_uri: None,
        }
    }

    /// Returns `true` if a user is authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.subject.is_some()
    }
}
