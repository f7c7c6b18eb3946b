pub mod aggregation;
pub mod config;
pub mod core;
pub mod dataset;
pub mod definitions;
pub mod errors;
pub mod extrapolation;
pub mod input;
pub mod output;
pub mod records;
mod statistics;

#[cfg(test)]
mod tests;

#[macro_use]
extern crate is_close;

use crate::config::ProcessingConfig;
use crate::dataset::AbmDataset;
use crate::definitions::AbmDefinitions;
use crate::input::{ingest, AbmInput};
use crate::output::{export_tables, Output};
use std::io::Read;
use tracing::{info, instrument};

/// The derived statistics and archetype definitions of one run.
#[derive(Clone, Debug)]
pub struct PipelineResults {
    pub dataset: AbmDataset,
    pub definitions: AbmDefinitions,
}

/// Derive the statistics and archetypes from the reference buildings, extrapolating onto
/// the locations given in the configuration.
#[instrument(skip_all)]
pub fn run_pipeline(input: AbmInput, config: &ProcessingConfig) -> anyhow::Result<PipelineResults> {
    let config = config.clone().validated()?;

    let dataset = AbmDataset::from_inputs(input, &config)?
        .with_extrapolation(&config.extrapolation, &config.extrapolation_tag)?;
    let definitions = AbmDefinitions::from_dataset(&dataset, &config)?;
    info!(
        locations = dataset.locations().len(),
        building_archetypes = definitions.building_archetypes.len(),
        "Pipeline complete"
    );

    Ok(PipelineResults {
        dataset,
        definitions,
    })
}

pub fn run_project(
    input: impl Read,
    output: &impl Output,
    config: &ProcessingConfig,
) -> anyhow::Result<PipelineResults> {
    let input = ingest(input)?;
    let results = run_pipeline(input, config)?;
    export_tables(output, &results.dataset, &results.definitions)?;
    Ok(results)
}
