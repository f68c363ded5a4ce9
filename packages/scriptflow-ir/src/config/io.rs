//! Configuration I/O
//!
//! YAML schema types. Loading and export live in pipeline_config.rs.

use super::pipeline_config::StageControl;
use super::stage_configs::{FlowGraphConfig, SymbolicExecutionConfig};
use serde::{Deserialize, Serialize};

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    pub preset: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stages: Option<StageControl>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_graph: Option<FlowGraphConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbolic_execution: Option<SymbolicExecutionConfig>,
}
