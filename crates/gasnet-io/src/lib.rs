//! # gasnet-io: Configuration and Result I/O
//!
//! JSON import/export for pipeline networks (the id-keyed configuration
//! dictionary format) and for optimization results. Importing assembles the
//! `gasnet-core` model, recomputes derived drop constants, and funnels every
//! problem found, parse-level and physical, into one aggregate
//! diagnostics collection.

pub mod exporters;
pub mod importers;
pub mod schema;

pub use exporters::{
    network_to_json, network_to_string, read_result_json, save_network_to_path, write_result_json,
};
pub use importers::{load_network_from_path, load_network_from_str, ImportResult};
