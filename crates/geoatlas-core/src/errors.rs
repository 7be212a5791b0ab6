use geoatlas_core_types::{RequestId, TraceId};
use thiserror::Error;

use crate::model::{EntityKey, Field, FieldOperation};

/// Result type alias using GeoAtlasError
pub type Result<T> = std::result::Result<T, GeoAtlasError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// tests and reports emitted by downstream tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaErrorKind {
    // Overlay / merge
    Validation,
    MergeConflict,

    // Change set
    DuplicateKey,

    // Identifier codec
    Range,

    // Snapshot integrity
    DanglingReference,
    DuplicateIdentifier,

    // Long-running operations
    Interrupted,

    // Ambient
    Config,
    Serialization,
    Internal,
}

impl GaErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            GaErrorKind::Validation => "ERR_VALIDATION",
            GaErrorKind::MergeConflict => "ERR_MERGE_CONFLICT",
            GaErrorKind::DuplicateKey => "ERR_DUPLICATE_KEY",
            GaErrorKind::Range => "ERR_RANGE",
            GaErrorKind::DanglingReference => "ERR_DANGLING_REFERENCE",
            GaErrorKind::DuplicateIdentifier => "ERR_DUPLICATE_IDENTIFIER",
            GaErrorKind::Interrupted => "ERR_INTERRUPTED",
            GaErrorKind::Config => "ERR_CONFIG",
            GaErrorKind::Serialization => "ERR_SERIALIZATION",
            GaErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification used for programmatic handling plus the
/// context (operation, entity, correlation ids) needed to debug a failure
/// inside a large batch.
#[derive(Debug, Clone)]
pub struct GaError {
    kind: GaErrorKind,
    op: Option<String>,
    entity: Option<EntityKey>,
    field: Option<Field>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl GaError {
    /// Create a new error with the specified kind
    pub fn new(kind: GaErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            field: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context
    pub fn with_entity(mut self, key: EntityKey) -> Self {
        self.entity = Some(key);
        self
    }

    /// Add field context
    pub fn with_field(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> GaErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity(&self) -> Option<EntityKey> {
        self.entity
    }

    pub fn field(&self) -> Option<Field> {
        self.field
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for GaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for GaError {}

// ========== End Error Facility ==========

/// Error taxonomy for GeoAtlas operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoAtlasError {
    // ===== Overlay / merge =====
    /// A field overlay cannot be applied: wrong operation for the field or
    /// wrong value shape
    #[error("Validation failed for {key} field {field}: {reason}")]
    Validation {
        key: EntityKey,
        field: Field,
        reason: String,
    },

    /// An entity-level rule was violated (outside any single field)
    #[error("Invalid entity {key}: {reason}")]
    InvalidEntity { key: EntityKey, reason: String },

    /// An UPDATE was resolved against a base that has no such entity
    #[error("Update for {key} has no base entity to merge onto")]
    MissingBase { key: EntityKey },

    /// Two changes for the same key could not be merged
    #[error("Cannot merge changes for {key} on field {field}: {left} vs {right}")]
    MergeConflict {
        key: EntityKey,
        field: String,
        left: String,
        right: String,
    },

    // ===== Change set =====
    /// A change for this key is already present in the change set
    #[error("Change set already holds a change for {key}")]
    DuplicateKey { key: EntityKey },

    // ===== Identifier codec =====
    /// An operand does not fit in its allotted bit width
    #[error("{operand} {value} exceeds {bits}-bit width (max {max})")]
    Range {
        operand: &'static str,
        value: u64,
        bits: u32,
        max: u64,
    },

    // ===== Snapshot integrity =====
    /// A reference set points at an entity missing from the same snapshot
    #[error("{source_key} references missing entity {target}")]
    DanglingReference {
        source_key: EntityKey,
        target: EntityKey,
    },

    /// Ingestion supplied the same (kind, id) twice
    #[error("Duplicate identifier {key} in snapshot")]
    DuplicateIdentifier { key: EntityKey },

    // ===== Long-running operations =====
    /// The caller interrupted the operation; no partial result was produced
    #[error("Operation {op} interrupted after {processed} identifiers")]
    Interrupted { op: &'static str, processed: u64 },

    // ===== Ambient =====
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization error (JSON or TOML encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GeoAtlasError {
    pub(crate) fn validation(key: EntityKey, field: Field, reason: impl Into<String>) -> Self {
        GeoAtlasError::Validation {
            key,
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn operation_not_supported(
        key: EntityKey,
        field: Field,
        operation: FieldOperation,
    ) -> Self {
        Self::validation(
            key,
            field,
            format!("{} is not supported on scalar field {}", operation, field),
        )
    }
}

/// Conversion from GeoAtlasError to GaError
impl From<GeoAtlasError> for GaError {
    fn from(err: GeoAtlasError) -> Self {
        match err {
            GeoAtlasError::Validation { key, field, reason } => {
                GaError::new(GaErrorKind::Validation)
                    .with_entity(key)
                    .with_field(field)
                    .with_message(reason)
            }

            GeoAtlasError::InvalidEntity { key, reason } => GaError::new(GaErrorKind::Validation)
                .with_entity(key)
                .with_message(reason),

            GeoAtlasError::MissingBase { key } => GaError::new(GaErrorKind::Validation)
                .with_entity(key)
                .with_op("change_view_entity")
                .with_message("Update has no base entity"),

            GeoAtlasError::MergeConflict {
                key,
                field,
                left,
                right,
            } => GaError::new(GaErrorKind::MergeConflict)
                .with_entity(key)
                .with_op("feature_change_merge")
                .with_message(format!("{}: {} vs {}", field, left, right)),

            GeoAtlasError::DuplicateKey { key } => GaError::new(GaErrorKind::DuplicateKey)
                .with_entity(key)
                .with_op("change_set_add")
                .with_message("Change set already holds a change for this key"),

            GeoAtlasError::Range {
                operand,
                value,
                bits,
                max,
            } => GaError::new(GaErrorKind::Range)
                .with_op("identifier_encode")
                .with_message(format!(
                    "{} {} exceeds {}-bit width (max {})",
                    operand, value, bits, max
                )),

            GeoAtlasError::DanglingReference { source_key, target } => {
                GaError::new(GaErrorKind::DanglingReference)
                    .with_entity(source_key)
                    .with_field(Field::References)
                    .with_message(format!("References missing entity {}", target))
            }

            GeoAtlasError::DuplicateIdentifier { key } => {
                GaError::new(GaErrorKind::DuplicateIdentifier)
                    .with_entity(key)
                    .with_op("snapshot_build")
                    .with_message("Duplicate identifier")
            }

            GeoAtlasError::Interrupted { op, processed } => GaError::new(GaErrorKind::Interrupted)
                .with_op(op)
                .with_message(format!("Interrupted after {} identifiers", processed)),

            GeoAtlasError::Config { message } => {
                GaError::new(GaErrorKind::Config).with_message(message)
            }

            GeoAtlasError::Serialization { message } => {
                GaError::new(GaErrorKind::Serialization).with_message(message)
            }

            GeoAtlasError::Internal { message } => {
                GaError::new(GaErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to GeoAtlasError
impl From<serde_json::Error> for GeoAtlasError {
    fn from(err: serde_json::Error) -> Self {
        GeoAtlasError::Serialization {
            message: err.to_string(),
        }
    }
}
