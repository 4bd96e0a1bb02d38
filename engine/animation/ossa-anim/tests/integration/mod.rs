//! Feature integration tests
//!
//! These tests exercise the full playback pipeline through the public API.

pub mod properties;
