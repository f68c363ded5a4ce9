//! Common test utilities for scriptflow-ir
//!
//! Source-text fixtures and domain assertions shared by the integration
//! tests.

#![allow(dead_code)]

mod assertions;
mod js_fixture;

pub use assertions::*;
pub use js_fixture::*;
