//! Correlation types for request tracking and tracing
//!
//! A long-running diff over a world-sized snapshot is usually one step of a
//! larger pipeline run. These identifiers let that run be followed through
//! log events and error reports.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh identifier using UUIDv7
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Get the string representation
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wrap an identifier received from an upstream caller
            pub fn from_string(s: String) -> Self {
                Self(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

correlation_id!(
    /// Identifier for one caller-level request (an ingest run, one diff job)
    RequestId
);

correlation_id!(
    /// Identifier shared by every request of one distributed pipeline run
    TraceId
);

/// Context carried through operation boundaries for correlation
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
}

impl RequestContext {
    /// Create a new context with a fresh RequestId
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with an existing RequestId
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            trace_id: None,
        }
    }

    /// Add a TraceId to the context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// TraceId as a log-friendly string, empty when absent
    pub fn trace_str(&self) -> &str {
        self.trace_id.as_ref().map(TraceId::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_generation() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::from_string("req-7".to_string());
        assert_eq!(format!("{}", id), "req-7");
    }

    #[test]
    fn test_request_context_with_trace_id() {
        let trace_id = TraceId::from_string("trace-1".to_string());
        let ctx = RequestContext::new().with_trace_id(trace_id.clone());

        assert_eq!(ctx.trace_id.as_ref(), Some(&trace_id));
        assert_eq!(ctx.trace_str(), "trace-1");
    }

    #[test]
    fn test_request_context_without_trace_id() {
        let ctx = RequestContext::with_request_id(RequestId::from_string("r".to_string()));
        assert_eq!(ctx.request_id.as_str(), "r");
        assert_eq!(ctx.trace_str(), "");
    }

    #[test]
    fn test_serialization_is_transparent() {
        let id = RequestId::from_string("abc".to_string());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let deserialized: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
