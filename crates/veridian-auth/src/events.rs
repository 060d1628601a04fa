//! Authentication events.
//!
//! An explicit observer interface: the core emits an event at each issuance
//! or rejection and the deployment decides what to do with it. The default
//! sink writes structured tracing records.

use crate::types::Flow;

/// Events emitted by the validation and issuance pipeline.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// An authorization code was issued.
    AuthorizationCodeIssued {
        /// The receiving client.
        client_id: String,
        /// The authenticated subject.
        subject: String,
    },

    /// Tokens were issued from the token endpoint.
    TokensIssued {
        /// The receiving client.
        client_id: String,
        /// The token subject (the client id itself for client credentials).
        subject: String,
        /// The grant flow that produced the tokens.
        flow: Flow,
    },

    /// A grant was rejected at the token endpoint.
    GrantRejected {
        /// The presenting client, when known.
        client_id: String,
        /// The OAuth error code returned.
        error: &'static str,
    },
}

/// Receives authentication events. Invoked synchronously on the request
/// path, so implementations should be cheap or hand off to a channel.
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    fn on_event(&self, event: &AuthEvent);
}

/// Default sink: structured tracing records.
#[derive(Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn on_event(&self, event: &AuthEvent) {
        match event {
            AuthEvent::AuthorizationCodeIssued { client_id, subject } => {
                tracing::info!(client_id = %client_id, subject = %subject, "authorization code issued");
            }
            AuthEvent::TokensIssued {
                client_id,
                subject,
                flow,
            } => {
                tracing::info!(client_id = %client_id, subject = %subject, flow = %flow, "tokens issued");
            }
            AuthEvent::GrantRejected { client_id, error } => {
                tracing::warn!(client_id = %client_id, error = %error, "grant rejected");
            }
        }
    }
}
