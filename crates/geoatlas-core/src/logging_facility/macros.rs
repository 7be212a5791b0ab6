//! Canonical logging macros
//!
//! Every instrumented operation emits exactly one start event and one end
//! (or end_error) event, tagged with the schema fields from
//! `geoatlas_core_types::schema`. Callers must depend on
//! `geoatlas-core-types` and `tracing` to expand them.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use geoatlas_core::log_op_start;
/// log_op_start!("snapshot_build");
/// log_op_start!("change_set_add", entity_kind = "node", entity_id = 7);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = geoatlas_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = geoatlas_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use geoatlas_core::log_op_end;
/// log_op_end!("compute_diff", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = geoatlas_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = geoatlas_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// # Example
///
/// The error is converted into [`GaError`](crate::errors::GaError) so the
/// event carries the stable kind and code.
///
/// ```ignore
/// # use geoatlas_core::{log_op_error, errors::GeoAtlasError};
/// let err = GeoAtlasError::Internal { message: "boom".to_string() };
/// log_op_error!("compute_diff", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::GaError;
        let ga_err: GaError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = geoatlas_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ga_err.kind(),
            err_code = ga_err.code(),
            err_message = ga_err.message(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::GaError;
        let ga_err: GaError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = geoatlas_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ga_err.kind(),
            err_code = ga_err.code(),
            err_message = ga_err.message(),
            $($field)*
        );
    }};
}
