//! Pipeline orchestrator
//!
//! Runs the enabled stages over function units: flow graph construction
//! always, symbolic execution when the stage is on.

use super::result::{AnalysisUnit, BatchSummary, FunctionAnalysis};
use crate::config::ValidatedConfig;
use crate::errors::Result;
use crate::features::flow_graph::{FlowGraphBuilder, FlowGraphSummary, ScriptFlowGraphBuilder};
use crate::features::symbolic_execution::{ExecutionListener, NoopListener, SymbolicExecutionEngine};
use crate::shared::CancellationToken;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

pub struct Orchestrator<B: FlowGraphBuilder = ScriptFlowGraphBuilder> {
    builder: B,
    config: ValidatedConfig,
}

impl Orchestrator<ScriptFlowGraphBuilder> {
    pub fn new(config: ValidatedConfig) -> Self {
        let builder = ScriptFlowGraphBuilder::new(config.flow_graph());
        Self { builder, config }
    }
}

impl<B: FlowGraphBuilder> Orchestrator<B> {
    pub fn with_builder(builder: B, config: ValidatedConfig) -> Self {
        Self { builder, config }
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn analyze(&self, unit: &AnalysisUnit<'_>, cancellation: &CancellationToken) -> Result<FunctionAnalysis> {
        self.analyze_with_listener(unit, cancellation, &mut NoopListener)
    }

    /// Build the unit's graph, then explore it if symbolic execution is
    /// enabled. `listener` only sees the exploration.
    pub fn analyze_with_listener(
        &self,
        unit: &AnalysisUnit<'_>,
        cancellation: &CancellationToken,
        listener: &mut dyn ExecutionListener,
    ) -> Result<FunctionAnalysis> {
        let cfg = self.builder.build(unit.tree, unit.root)?;
        let summary = FlowGraphSummary::of(&cfg);

        let execution = self.config.symbolic_execution().map(|config| {
            SymbolicExecutionEngine::new(&cfg, unit.tree, unit.resolver, config)
                .with_cancellation(cancellation.clone())
                .execute(unit.scope.initial_state(), listener)
        });

        debug!(
            unit = unit.name,
            blocks = summary.blocks,
            status = execution.as_ref().map(|r| r.status.as_str()).unwrap_or("skipped"),
            "Analyzed function"
        );

        Ok(FunctionAnalysis {
            name: unit.name.to_string(),
            cfg,
            summary,
            execution,
        })
    }

    /// Units are independent; results come back in input order.
    pub fn analyze_batch(
        &self,
        units: &[AnalysisUnit<'_>],
        cancellation: &CancellationToken,
    ) -> Vec<Result<FunctionAnalysis>> {
        let start = Instant::now();

        #[cfg(feature = "parallel")]
        let results: Vec<_> = units
            .par_iter()
            .map(|unit| self.analyze(unit, cancellation))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = units
            .iter()
            .map(|unit| self.analyze(unit, cancellation))
            .collect();

        let totals = BatchSummary::of(&results);
        info!(
            units = totals.units,
            failed = totals.failed,
            incomplete = totals.incomplete,
            blocks = totals.blocks,
            block_executions = totals.block_executions,
            elapsed_ms = start.elapsed().as_millis() as u64,
            config = %self.config.describe(),
            "Batch analysis complete"
        );
        results
    }
}

/// One-shot analysis of a single unit with the default builder
pub fn analyze_function(
    unit: &AnalysisUnit<'_>,
    config: &ValidatedConfig,
    cancellation: &CancellationToken,
) -> Result<FunctionAnalysis> {
    Orchestrator::new(config.clone()).analyze(unit, cancellation)
}

pub fn analyze_batch(
    units: &[AnalysisUnit<'_>],
    config: &ValidatedConfig,
    cancellation: &CancellationToken,
) -> Vec<Result<FunctionAnalysis>> {
    Orchestrator::new(config.clone()).analyze_batch(units, cancellation)
}
