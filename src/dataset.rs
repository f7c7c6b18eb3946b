use crate::aggregation::{
    building_stock_statistics, structure_statistics, ventilation_and_fenestration_statistics,
    BuildingStockStatistic, StructureStatistic, VentilationFenestrationStatistic,
};
use crate::config::{ExtrapolationMapping, ProcessingConfig};
use crate::errors::AbmError;
use crate::extrapolation::{extrapolate, extrapolate_building_stocks, validate_mappings};
use crate::input::{AbmInput, Assumptions, BuildingStockDefinition};
use crate::records::{building_periods, preprocess, BuildingPeriodRow, ProcessedRecord};
use indexmap::IndexSet;
use tracing::{info, instrument};

/// The preprocessed reference buildings together with the statistics derived from them.
///
/// Every table is computed once on construction and read by the later stages.
#[derive(Clone, Debug)]
pub struct AbmDataset {
    records: Vec<ProcessedRecord>,
    assumptions: Assumptions,
    building_periods: Vec<BuildingPeriodRow>,
    building_stocks: Vec<BuildingStockDefinition>,
    building_stock_statistics: Vec<BuildingStockStatistic>,
    structure_statistics: Vec<StructureStatistic>,
    ventilation_and_fenestration_statistics: Vec<VentilationFenestrationStatistic>,
    extrapolation: Vec<ExtrapolationMapping>,
    extrapolation_tag: String,
}

impl AbmDataset {
    #[instrument(skip_all)]
    pub fn from_inputs(input: AbmInput, config: &ProcessingConfig) -> anyhow::Result<Self> {
        let assumptions = Assumptions::from_input(&input);
        let records = preprocess(input.records);
        info!(records = records.len(), "Preprocessed reference building records");

        let building_periods = building_periods(&records);
        let building_stock_statistics = building_stock_statistics(&records, &assumptions)?;
        let structure_statistics = structure_statistics(
            &records,
            &assumptions,
            config.interior_node_depth,
            config.period_of_variations_s,
        );
        let ventilation_and_fenestration_statistics =
            ventilation_and_fenestration_statistics(&records, &assumptions)?;
        info!(
            building_stock_statistics = building_stock_statistics.len(),
            structure_statistics = structure_statistics.len(),
            ventilation_and_fenestration_statistics = ventilation_and_fenestration_statistics.len(),
            "Aggregated statistics"
        );

        Ok(Self {
            records,
            building_periods,
            building_stocks: input.building_stocks,
            building_stock_statistics,
            structure_statistics,
            ventilation_and_fenestration_statistics,
            extrapolation: vec![],
            extrapolation_tag: config.extrapolation_tag.clone(),
            assumptions,
        })
    }

    /// Extend the statistics with clones of sampled locations, as given by `mappings`.
    ///
    /// Mappings are checked before anything is cloned, so a malformed mapping leaves no
    /// partial result. Only sampled locations can be cloned, and no location already present
    /// can be overwritten.
    #[instrument(skip_all)]
    pub fn with_extrapolation(
        self,
        mappings: &[ExtrapolationMapping],
        tag: &str,
    ) -> Result<Self, AbmError> {
        if mappings.is_empty() {
            return Ok(self);
        }
        validate_mappings(mappings, self.sampled_locations(), self.locations())?;
        if !self.extrapolation.is_empty() && tag != self.extrapolation_tag {
            return Err(AbmError::InvalidConfiguration(format!(
                "extrapolation tag '{tag}' differs from the tag '{}' used before",
                self.extrapolation_tag
            )));
        }

        let building_stock_statistics = extrapolate(&self.building_stock_statistics, mappings, tag);
        let building_stocks = extrapolate_building_stocks(
            &self.building_stocks,
            &building_stock_statistics[self.building_stock_statistics.len()..],
            tag,
        );
        info!(
            mappings = mappings.len(),
            building_stock_statistics = building_stock_statistics.len(),
            "Extrapolated statistics"
        );

        Ok(Self {
            building_stock_statistics,
            building_stocks,
            structure_statistics: extrapolate(&self.structure_statistics, mappings, tag),
            ventilation_and_fenestration_statistics: extrapolate(
                &self.ventilation_and_fenestration_statistics,
                mappings,
                tag,
            ),
            extrapolation: self.extrapolation.iter().chain(mappings).cloned().collect(),
            extrapolation_tag: tag.to_string(),
            ..self
        })
    }

    /// Locations present in the data, sampled ones first followed by extrapolated ones.
    pub fn locations(&self) -> IndexSet<&str> {
        self.sampled_locations()
            .chain(self.extrapolation.iter().map(|mapping| mapping.target.as_str()))
            .collect()
    }

    fn sampled_locations(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.raw.location_id.as_str())
    }

    pub fn records(&self) -> &[ProcessedRecord] {
        &self.records
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn building_periods(&self) -> &[BuildingPeriodRow] {
        &self.building_periods
    }

    pub fn building_stocks(&self) -> &[BuildingStockDefinition] {
        &self.building_stocks
    }

    pub fn building_stock_statistics(&self) -> &[BuildingStockStatistic] {
        &self.building_stock_statistics
    }

    pub fn structure_statistics(&self) -> &[StructureStatistic] {
        &self.structure_statistics
    }

    pub fn ventilation_and_fenestration_statistics(&self) -> &[VentilationFenestrationStatistic] {
        &self.ventilation_and_fenestration_statistics
    }

    /// The mappings applied so far, in the order they were applied.
    pub fn extrapolation(&self) -> &[ExtrapolationMapping] {
        &self.extrapolation
    }

    pub fn extrapolation_tag(&self) -> &str {
        &self.extrapolation_tag
    }
}
