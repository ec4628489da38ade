//! Adapter implementations
//!
//! Adapters connect the pipeline to concrete technologies:
//! - CSV decoding into the tabular input model
//! - An axum HTTP server exposing the upload endpoint

pub mod csv_table;
pub mod http;
