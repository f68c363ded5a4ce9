//! Utility modules shared across features
//!
//! - `cancellation`: cooperative cancellation flag polled by long-running analyses

pub mod cancellation;
