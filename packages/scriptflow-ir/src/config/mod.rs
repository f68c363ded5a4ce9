//! Configuration System
//!
//! Three levels of control:
//! - Level 1: Preset - one-liner defaults
//! - Level 2: Stage override - closure adjusting one stage
//! - Level 3: YAML v1 - complete control from a file
//!
//! # Examples
//!
//! ```rust,ignore
//! use scriptflow_ir::config::{PipelineConfig, Preset};
//!
//! // Level 1
//! let config = PipelineConfig::preset(Preset::Fast).build()?;
//!
//! // Level 2
//! let config = PipelineConfig::preset(Preset::Balanced)
//!     .symbolic_execution(|c| c.max_states_per_block(20).abandon_on_try(false))
//!     .build()?;
//!
//! // Level 3
//! let config = PipelineConfig::from_yaml("scriptflow.yaml")?;
//! ```

pub mod error;
pub mod io;
pub mod pipeline_config;
pub mod preset;
pub mod stage_configs;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use pipeline_config::{PipelineConfig, StageControl, StageId, ValidatedConfig};
pub use preset::Preset;
pub use stage_configs::{FlowGraphConfig, SymbolicExecutionConfig};
pub use validation::{Validatable, ValidatableCollection};
