//! Pipeline configuration with StageControl
//!
//! Main configuration struct with preset-based defaults and override support.

use super::{
    error::{ConfigError, ConfigResult},
    io::{ConfigExportV1, ConfigOverrides},
    preset::Preset,
    stage_configs::{FlowGraphConfig, SymbolicExecutionConfig, SYMBOLIC_EXECUTION_FIELDS},
    validation::ValidatableCollection,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

const FLOW_GRAPH_FIELDS: &[&str] = &["demote_degenerate_branches"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageId {
    SymbolicExecution,
}

impl StageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::SymbolicExecution => "symbolic_execution",
        }
    }
}

/// Stage on/off switches; flow graphs are always built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageControl {
    pub symbolic_execution: bool,
}

impl Default for StageControl {
    fn default() -> Self {
        Self {
            symbolic_execution: true,
        }
    }
}

impl StageControl {
    /// Flow graphs only
    pub fn flow_graphs_only() -> Self {
        Self {
            symbolic_execution: false,
        }
    }

    pub fn enable(mut self, stage: StageId) -> Self {
        self.set(stage, true);
        self
    }

    pub fn disable(mut self, stage: StageId) -> Self {
        self.set(stage, false);
        self
    }

    pub fn set(&mut self, stage: StageId, enabled: bool) {
        match stage {
            StageId::SymbolicExecution => self.symbolic_execution = enabled,
        }
    }

    pub fn is_enabled(&self, stage: StageId) -> bool {
        match stage {
            StageId::SymbolicExecution => self.symbolic_execution,
        }
    }
}

/// Pipeline configuration (builder)
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub(crate) preset: Preset,

    pub stages: StageControl,

    /// Error instead of warning on overrides for disabled stages
    pub(crate) strict_mode: bool,

    pub(crate) flow_graph: Option<FlowGraphConfig>,
    pub(crate) symbolic_execution: Option<SymbolicExecutionConfig>,
}

impl PipelineConfig {
    /// Level 1: Create from preset
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            stages: StageControl::default(),
            strict_mode: false,
            flow_graph: None,
            symbolic_execution: None,
        }
    }

    pub fn strict_mode(mut self, enabled: bool) -> Self {
        self.strict_mode = enabled;
        self
    }

    pub fn with_stages<F>(mut self, f: F) -> Self
    where
        F: FnOnce(StageControl) -> StageControl,
    {
        self.stages = f(self.stages);
        self
    }

    /// Level 2: Override flow graph construction
    pub fn flow_graph<F>(mut self, f: F) -> Self
    where
        F: FnOnce(FlowGraphConfig) -> FlowGraphConfig,
    {
        let base = self
            .flow_graph
            .take()
            .unwrap_or_else(|| FlowGraphConfig::from_preset(self.preset));
        self.flow_graph = Some(f(base));
        self
    }

    /// Level 2: Override symbolic execution limits
    pub fn symbolic_execution<F>(mut self, f: F) -> Self
    where
        F: FnOnce(SymbolicExecutionConfig) -> SymbolicExecutionConfig,
    {
        let base = self
            .symbolic_execution
            .take()
            .unwrap_or_else(|| SymbolicExecutionConfig::from_preset(self.preset));
        self.symbolic_execution = Some(f(base));
        self
    }

    pub fn get_preset(&self) -> Preset {
        self.preset
    }

    pub fn build(self) -> ConfigResult<ValidatedConfig> {
        self.flow_graph.validate_all()?;
        self.symbolic_execution.validate_all()?;
        self.validate_stage_control()?;
        Ok(ValidatedConfig(self))
    }

    fn validate_stage_control(&self) -> ConfigResult<()> {
        if !self.stages.symbolic_execution && self.symbolic_execution.is_some() {
            if self.strict_mode {
                return Err(ConfigError::DisabledStageOverride {
                    stage: StageId::SymbolicExecution.as_str().to_string(),
                    hint: "Remove .symbolic_execution() override or enable the stage".to_string(),
                });
            }
            warn!("symbolic_execution config ignored (stage disabled); enable strict_mode to error on this");
        }
        Ok(())
    }

    /// Load from a YAML file (v1 schema)
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<ValidatedConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<ValidatedConfig> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        if value.get("version").is_none() {
            return Err(ConfigError::MissingVersion);
        }
        if let Some(overrides) = value.get("overrides") {
            check_fields(overrides, "symbolic_execution", SYMBOLIC_EXECUTION_FIELDS)?;
            check_fields(overrides, "flow_graph", FLOW_GRAPH_FIELDS)?;
        }

        let export: ConfigExportV1 = serde_yaml::from_value(value.clone())?;
        if export.version != 1 {
            return Err(ConfigError::UnsupportedVersion {
                found: export.version,
                supported: vec![1],
            });
        }

        let preset = Preset::from_str(&export.preset)?;
        let mut config = Self::preset(preset);
        if let Some(stages) = export.stages {
            config.stages = stages;
        }
        // Override sections only list the fields they change
        let section = |stage: &str| value.get("overrides").and_then(|o| o.get(stage));
        config.flow_graph = overlay(FlowGraphConfig::from_preset(preset), section("flow_graph"))?;
        config.symbolic_execution = overlay(
            SymbolicExecutionConfig::from_preset(preset),
            section("symbolic_execution"),
        )?;
        config.build()
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: 1,
            preset: self.preset.to_string(),
            stages: Some(self.stages.clone()),
            overrides: Some(ConfigOverrides {
                flow_graph: self.flow_graph.clone(),
                symbolic_execution: self.symbolic_execution.clone(),
            }),
        };
        Ok(serde_yaml::to_string(&export)?)
    }

    pub fn describe(&self) -> String {
        let stages = if self.stages.symbolic_execution {
            "FlowGraph, SymbolicExecution"
        } else {
            "FlowGraph"
        };
        format!("{} [{}]", self.preset, stages)
    }
}

/// Unknown keys of one override section, reported with the closest valid name
fn check_fields(overrides: &serde_yaml::Value, stage: &str, valid: &[&str]) -> ConfigResult<()> {
    let Some(section) = overrides.get(stage).and_then(|s| s.as_mapping()) else {
        return Ok(());
    };
    for key in section.keys().filter_map(|k| k.as_str()) {
        if !valid.contains(&key) {
            return Err(ConfigError::unknown_field_with_suggestion(
                key,
                stage,
                valid.iter().map(|f| f.to_string()).collect(),
            ));
        }
    }
    Ok(())
}

/// `base` with the fields present in `section` replaced
fn overlay<T>(base: T, section: Option<&serde_yaml::Value>) -> ConfigResult<Option<T>>
where
    T: Serialize + DeserializeOwned,
{
    let Some(fields) = section.and_then(|s| s.as_mapping()) else {
        return Ok(None);
    };
    let mut merged = serde_yaml::to_value(base)?;
    if let Some(target) = merged.as_mapping_mut() {
        for (key, field) in fields {
            target.insert(key.clone(), field.clone());
        }
    }
    Ok(Some(serde_yaml::from_value(merged)?))
}

/// Validated configuration (immutable, safe to use)
#[derive(Debug, Clone)]
pub struct ValidatedConfig(PipelineConfig);

impl Default for ValidatedConfig {
    fn default() -> Self {
        Self(PipelineConfig::preset(Preset::default()))
    }
}

impl ValidatedConfig {
    pub fn into_inner(self) -> PipelineConfig {
        self.0
    }

    pub fn as_inner(&self) -> &PipelineConfig {
        &self.0
    }

    pub fn preset(&self) -> Preset {
        self.0.preset
    }

    pub fn stages(&self) -> &StageControl {
        &self.0.stages
    }

    pub fn flow_graph(&self) -> FlowGraphConfig {
        self.0
            .flow_graph
            .clone()
            .unwrap_or_else(|| FlowGraphConfig::from_preset(self.0.preset))
    }

    /// Effective symbolic execution config (`None` if the stage is disabled)
    pub fn symbolic_execution(&self) -> Option<SymbolicExecutionConfig> {
        if !self.0.stages.symbolic_execution {
            return None;
        }
        Some(
            self.0
                .symbolic_execution
                .clone()
                .unwrap_or_else(|| SymbolicExecutionConfig::from_preset(self.0.preset)),
        )
    }

    pub fn describe(&self) -> String {
        self.0.describe()
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        self.0.to_yaml()
    }
}
