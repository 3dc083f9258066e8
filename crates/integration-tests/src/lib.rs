//! Integration tests for Last Call.
//!
//! Tests live in `tests/`; this crate intentionally exports nothing.
