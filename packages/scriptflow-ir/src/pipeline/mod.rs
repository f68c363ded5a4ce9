//! Pipeline orchestration

pub mod orchestrator;
pub mod result;

pub use orchestrator::{analyze_batch, analyze_function, Orchestrator};
pub use result::{AnalysisUnit, BatchSummary, FunctionAnalysis};
