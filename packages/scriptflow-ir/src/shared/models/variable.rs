//! Variable identity
//!
//! Identities are assigned by the host's symbol resolver; the core only
//! compares and orders them.

use serde::{Deserialize, Serialize};

/// Stable identity of a tracked variable within one analyzed function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableId(pub u32);

impl std::fmt::Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}
