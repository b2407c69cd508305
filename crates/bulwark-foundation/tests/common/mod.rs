//! Common test utilities shared across all `bulwark-foundation` integration tests.
//!
//! This module is **not** a standalone test binary.  It is declared with
//! `mod common;` inside each integration test file that needs it.

pub mod scripted;
