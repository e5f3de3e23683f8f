//! Storage abstractions for the service layer
//!
//! Holds the JSON document reader/writer shared by file-backed stores.

pub mod json_record_file;
