//! Core types shared across GeoAtlas facilities
//!
//! This crate provides the leaf types used by both the error facility and the
//! logging facility of `geoatlas-core`:
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TraceId};
