//! # Memlight Core
//!
//! Shared logic for Memlight: the index data model, heading-based
//! chunking, mixed-script keyword extraction, synonym expansion, and
//! the BM25 + hot-memory ranking engine.
//!
//! This crate contains no tokio, filesystem I/O, or other native-only
//! dependencies — everything operates on in-memory values. The
//! application crate owns file enumeration, persistence, and the
//! background watcher.

pub mod chunk;
pub mod indexer;
pub mod keywords;
pub mod models;
pub mod search;
pub mod synonyms;
