//! Test helpers module
//!
//! Temporary server layouts and configuration files for integration tests.

#![allow(dead_code)]

pub mod layout;

pub use layout::*;
