//! Structural errors raised while building a control-flow graph
//!
//! All of these mean the syntax tree handed to the builder is malformed
//! (or the resolver upstream broke its contract). They are never recovered
//! from.

use crate::shared::models::{NodeId, SyntaxKind};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Break,
    Continue,
}

impl std::fmt::Display for JumpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JumpKind::Break => f.write_str("break"),
            JumpKind::Continue => f.write_str("continue"),
        }
    }
}

fn fmt_label(label: &Option<String>) -> String {
    match label {
        Some(label) => format!(" (label '{label}')"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CfgError {
    #[error("No '{jump}' target can be found at line {line}{}", fmt_label(.label))]
    UnresolvedJumpTarget {
        jump: JumpKind,
        label: Option<String>,
        node: NodeId,
        line: u32,
    },

    #[error("Cannot add element {node} to the end block")]
    ElementInEndBlock { node: NodeId },

    #[error("Cannot add element {node} to a forwarding block")]
    ElementInForwardingBlock { node: NodeId },

    #[error("Branching block of {node} has itself as successor")]
    SelfReferentialBranch { node: NodeId },

    #[error("Both successors of the branching block of {node} are the same block")]
    DegenerateBranch { node: NodeId },

    #[error("Forwarding block {block} was never linked to a successor")]
    DanglingForwardingBlock { block: usize },

    #[error("Cannot build CFG for {kind} statement {node}")]
    UnexpectedStatement { kind: SyntaxKind, node: NodeId },

    #[error("Malformed {kind} node {node}: {reason}")]
    MalformedNode {
        kind: SyntaxKind,
        node: NodeId,
        reason: &'static str,
    },
}

pub type CfgResult<T> = std::result::Result<T, CfgError>;
