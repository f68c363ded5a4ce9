//! Error types for scriptflow-ir
//!
//! Structural failures only: graph construction and configuration. Anything
//! that goes wrong during symbolic execution is reported through
//! `ExecutionStatus` instead.

use crate::config::ConfigError;
use crate::features::flow_graph::CfgError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptflowError {
    #[error("Flow graph error: {0}")]
    Cfg(#[from] CfgError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis error: {0}")]
    Analysis(String),
}

impl ScriptflowError {
    pub fn analysis(msg: impl Into<String>) -> Self {
        ScriptflowError::Analysis(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ScriptflowError>;
