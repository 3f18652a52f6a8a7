//! Core for the bulkstore project.
//!
//! Everything in this crate is pure: key derivation, chunking, the retry state
//! machine, progress accounting and the record-to-row transform. The store
//! contract lives in [`storage`]; implementations and all I/O live in the
//! `bulkstore` crate.

pub mod batch;
pub mod keys;
pub mod progress;
pub mod retry;
pub mod storage;
pub mod transform;
