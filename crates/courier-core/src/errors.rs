use crate::routing::RoutingKey;

/// Typed error hierarchy for record handling.
///
/// Every variant is record-fatal: it is caught at the batch coordinator
/// boundary, recorded against the offending record, and never aborts
/// sibling records. The core performs no retries anywhere; the
/// `redeliverable` classification is what the queue infrastructure uses to
/// decide which records are worth redelivering.
#[derive(Clone, Debug, thiserror::Error)]
pub enum DispatchError {
    /// The outer or inner payload was not parseable, or a required field
    /// was absent. Redelivery will not fix malformed content.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// No execution strategy is registered for the routing key.
    #[error("no adapter registered for {key}")]
    UnknownAdapter { key: RoutingKey },

    /// The meta-routing suggestion call itself failed. The no-suggestion
    /// case is recovered via the fallback model id and never reaches here.
    #[error("meta suggestion failed: {0}")]
    MetaSuggestion(String),

    /// The execution strategy failed; opaque upstream failure.
    #[error("execution failed: {0}")]
    Execution(String),
}

impl DispatchError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedEnvelope(msg.into())
    }

    /// Whether queue redelivery could plausibly change the outcome.
    pub fn redeliverable(&self) -> bool {
        matches!(self, Self::MetaSuggestion(_) | Self::Execution(_))
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::MalformedEnvelope(_) => "malformed_envelope",
            Self::UnknownAdapter { .. } => "unknown_adapter",
            Self::MetaSuggestion(_) => "meta_suggestion_failed",
            Self::Execution(_) => "execution_failed",
        }
    }
}

/// Failure to push an event through the delivery channel.
///
/// Delivery is best-effort everywhere: callers log these at debug/warn and
/// move on; a delivery failure never blocks or fails the owning operation.
#[derive(Clone, Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("event serialization failed: {0}")]
    Serialize(String),

    #[error("no connected client for recipient")]
    NoRecipient,

    #[error("delivery channel closed")]
    ChannelClosed,
}
