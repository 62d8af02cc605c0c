//! # DataStore Module
//!
//! This module provides the record sink the summarizer pushes its output into.
//!
//! Records are appended to a JSON-lines dataset on the local filesystem, one
//! serialized record per line, mirroring the dataset a hosting runtime keeps
//! for each run.

mod datastore;

pub use datastore::fs::FsDataStore;
pub use datastore::DataStore;
