//! Stage-specific configuration types
//!
//! Each pipeline stage has its own configuration struct with validation.

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use super::validation::Validatable;
use crate::features::symbolic_execution::domain::PropertyResolution;
use serde::{Deserialize, Serialize};

// ============================================================================
// Flow graph construction
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowGraphConfig {
    /// Turn a branching block whose two edges reach the same block into a
    /// simple block; when off, such a block is a build error
    pub demote_degenerate_branches: bool,
}

impl Default for FlowGraphConfig {
    fn default() -> Self {
        Self {
            demote_degenerate_branches: true,
        }
    }
}

impl FlowGraphConfig {
    pub fn from_preset(_preset: Preset) -> Self {
        Self::default()
    }

    pub fn demote_degenerate_branches(mut self, v: bool) -> Self {
        self.demote_degenerate_branches = v;
        self
    }
}

impl Validatable for FlowGraphConfig {
    fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "FlowGraphConfig"
    }
}

// ============================================================================
// Symbolic execution
// ============================================================================

pub(crate) const SYMBOLIC_EXECUTION_FIELDS: &[&str] = &[
    "max_states_per_block",
    "max_block_executions",
    "prune_dead_variables",
    "property_resolution",
    "abandon_on_try",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolicExecutionConfig {
    /// Distinct states explored per block before further ones are dropped
    /// (1..=1000)
    pub max_states_per_block: usize,

    /// Block visits per run before giving up (1..=1_000_000)
    pub max_block_executions: usize,

    /// Drop constraints of dead variables before memoizing a state
    pub prune_dead_variables: bool,

    /// Whether object-literal shapes are assumed to list every property
    pub property_resolution: PropertyResolution,

    /// Return an `Abandoned` result for functions containing `try`
    pub abandon_on_try: bool,
}

impl Default for SymbolicExecutionConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl SymbolicExecutionConfig {
    pub fn from_preset(preset: Preset) -> Self {
        let (max_states_per_block, max_block_executions) = match preset {
            Preset::Fast => (5, 500),
            Preset::Balanced | Preset::Custom => (10, 1000),
            Preset::Thorough => (50, 20_000),
        };
        Self {
            max_states_per_block,
            max_block_executions,
            prune_dead_variables: true,
            property_resolution: PropertyResolution::Partial,
            abandon_on_try: true,
        }
    }

    pub fn max_states_per_block(mut self, v: usize) -> Self {
        self.max_states_per_block = v;
        self
    }

    pub fn max_block_executions(mut self, v: usize) -> Self {
        self.max_block_executions = v;
        self
    }

    pub fn prune_dead_variables(mut self, v: bool) -> Self {
        self.prune_dead_variables = v;
        self
    }

    pub fn property_resolution(mut self, v: PropertyResolution) -> Self {
        self.property_resolution = v;
        self
    }

    pub fn abandon_on_try(mut self, v: bool) -> Self {
        self.abandon_on_try = v;
        self
    }
}

impl Validatable for SymbolicExecutionConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_states_per_block == 0 || self.max_states_per_block > 1000 {
            return Err(ConfigError::range_with_hint(
                "max_states_per_block",
                self.max_states_per_block,
                1,
                1000,
                "At least one state per block must be explored",
            ));
        }

        if self.max_block_executions == 0 || self.max_block_executions > 1_000_000 {
            return Err(ConfigError::range_with_hint(
                "max_block_executions",
                self.max_block_executions,
                1,
                1_000_000,
                "The execution budget must be finite and non-zero",
            ));
        }

        if self.max_block_executions < self.max_states_per_block {
            return Err(ConfigError::Validation(format!(
                "max_block_executions ({}) is smaller than max_states_per_block ({})",
                self.max_block_executions, self.max_states_per_block
            )));
        }

        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "SymbolicExecutionConfig"
    }
}
