//! NDJSON filesystem adapter
//!
//! This module provides the two filesystem-facing pieces of the pipeline:
//! discovery of input files by resource type, and the streaming reader that
//! turns each file into a lazy sequence of JSON objects.

pub mod discovery;
pub mod reader;

pub use discovery::{find_ndjson_files, NDJSON_EXTENSION};
pub use reader::{count_ndjson_lines, read_ndjson, NdjsonReader};
