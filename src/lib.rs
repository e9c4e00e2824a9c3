//! # apidex - Token-Suffix Search Index for API Catalogs
//!
//! apidex catalogs the public API surface of a large platform as
//! `(displayName, id)` pairs and answers "which ids have a display name
//! containing this substring" queries against a compact, memory-mapped
//! binary file.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - Index building, serialization, and reading
//! - [`catalog`] - JSONL input boundary fed by the catalog crawler
//! - [`output`] - Result formatting for the CLI
//! - [`utils`] - Display-name tokenization
//!
//! ## Quick Start
//!
//! ```
//! use apidex::index::{IndexBuilder, IndexReader, IndexWriter};
//!
//! let mut builder = IndexBuilder::new();
//! builder.add("System.Collections.Generic.List`1", 42);
//!
//! let reader = IndexReader::from_bytes(IndexWriter::to_bytes(&builder)).unwrap();
//! let matches = reader.lookup("list");
//! assert!(matches.iter().any(|m| m.id == 42));
//! ```
//!
//! ## Design
//!
//! Every display name is tokenized into word runs and punctuation; every
//! token suffix not starting at a `"."` is inserted into a trie, so a query
//! can match anywhere a token begins. The serialized form is a header plus
//! two regions (deduplicated string table, flat node table) that the reader
//! slices in place - no pointer graph is ever rebuilt at load time, and a
//! loaded index serves concurrent lookups without locks.

pub mod catalog;
pub mod index;
pub mod output;
pub mod utils;
