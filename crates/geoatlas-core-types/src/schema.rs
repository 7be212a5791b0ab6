//! Canonical schema constants for structured logging and events
//!
//! Every event emitted by the logging macros uses these keys, so log
//! consumers can filter on them without knowing which module emitted it.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identity
pub const FIELD_ENTITY_KIND: &str = "entity_kind";
pub const FIELD_ENTITY_ID: &str = "entity_id";

// Collection sizes
pub const FIELD_ENTITY_COUNT: &str = "entity_count";
pub const FIELD_CHANGE_COUNT: &str = "change_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";
pub const FIELD_ERR_MESSAGE: &str = "err_message";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
