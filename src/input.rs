use crate::core::fabric::structure_type::StructureTypeSpec;
pub use crate::core::heating_systems::HeatingSystem;
pub use crate::core::material_properties::{LayerProperties, StructureLayers};
use crate::errors::AbmError;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::io::{BufReader, Read};

/// Maximum number of heating systems recorded per reference building.
pub const MAX_HEATING_SYSTEMS: usize = 3;

pub fn ingest(json: impl Read) -> anyhow::Result<AbmInput> {
    let input: AbmInput = serde_json::from_reader(BufReader::new(json))?;
    input
        .validate()
        .map_err(|errors| anyhow::anyhow!("Input failed validation: {errors}"))?;
    Ok(input)
}

/// Read one row-per-key assumption table from CSV, using its documented column names.
pub fn read_assumption_table<T: DeserializeOwned>(csv: impl Read) -> anyhow::Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv);
    let mut rows = vec![];
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AbmInput {
    #[validate]
    pub records: Vec<RawBuildingRecord>,
    pub structure_types: Vec<StructureTypeSpec>,
    pub building_stocks: Vec<BuildingStockDefinition>,
    pub building_type_mappings: Vec<BuildingTypeMapping>,
    pub fenestration: Vec<FenestrationSpec>,
    pub ventilation: Vec<VentilationSpec>,
    pub building_fabrics: Vec<BuildingFabricTemplate>,
}

impl AbmInput {
    pub fn from_parts(records: Vec<RawBuildingRecord>, assumptions: AssumptionTables) -> Self {
        let AssumptionTables {
            structure_types,
            building_stocks,
            building_type_mappings,
            fenestration,
            ventilation,
            building_fabrics,
        } = assumptions;
        Self {
            records,
            structure_types,
            building_stocks,
            building_type_mappings,
            fenestration,
            ventilation,
            building_fabrics,
        }
    }
}

/// The assumption tables as supplied by the input collaborator, one row per key.
#[derive(Clone, Debug, Default)]
pub struct AssumptionTables {
    pub structure_types: Vec<StructureTypeSpec>,
    pub building_stocks: Vec<BuildingStockDefinition>,
    pub building_type_mappings: Vec<BuildingTypeMapping>,
    pub fenestration: Vec<FenestrationSpec>,
    pub ventilation: Vec<VentilationSpec>,
    pub building_fabrics: Vec<BuildingFabricTemplate>,
}

/// One reference building (and material combination) of the source database.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct RawBuildingRecord {
    #[serde(rename = "REFERENCE BUILDING CODE")]
    pub reference_building_code: String,
    #[serde(rename = "REFERENCE BUILDING COUNTRY CODE")]
    pub location_id: String,
    #[serde(rename = "REFERENCE BUILDING USE CODE")]
    pub building_type: String,
    #[serde(rename = "REFERENCE BUILDING CONSTRUCTION YEAR LOW")]
    pub construction_year_low: i32,
    #[serde(rename = "REFERENCE BUILDING CONSTRUCTION YEAR HIGH")]
    pub construction_year_high: i32,
    #[serde(rename = "NUMBER OF REFERENCE BUILDINGS")]
    pub number_of_buildings: f64,
    #[serde(rename = "NUMBER OF REFERENCE BUILDING STOREYS")]
    pub number_of_storeys: f64,
    #[serde(rename = "REFERENCE BUILDING HEATED FLOOR AREA (m2)")]
    pub heated_floor_area_m2: f64,
    #[serde(rename = "REFERENCE BUILDING GROUND FLOOR AREA (m2)")]
    pub ground_floor_area_m2: f64,
    #[serde(rename = "REFERENCE BUILDING WALL AREA (m2)")]
    pub wall_area_m2: f64,
    #[serde(rename = "REFERENCE BUILDING WINDOW AREA (m2)")]
    pub window_area_m2: f64,
    #[serde(rename = "REFERENCE BUILDING ROOF AREA (m2)")]
    pub roof_area_m2: f64,
    #[serde(rename = "WINDOW GLAZING TYPE")]
    pub glazing_type: String,
    #[serde(rename = "WINDOW COATING")]
    pub window_coating: String,
    #[serde(rename = "WINDOW U-VALUE (W/m2K)")]
    pub window_u_value: f64,
    #[serde(rename = "VENTILATION SYSTEM")]
    pub ventilation_system: String,
    #[serde(rename = "INFILTRATION RATE (1/h)")]
    pub infiltration_rate_1_h: f64,
    #[serde(rename = "VENTILATION RATE (1/h)")]
    pub ventilation_rate_1_h: f64,
    /// Material layers keyed by the structure column prefix of the source database.
    pub structures: IndexMap<String, StructureLayers>,
    #[validate(max_items = 3)]
    pub heating_systems: Vec<HeatingSystem>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BuildingStockDefinition {
    pub building_stock: String,
    pub building_stock_year: i32,
    #[serde(default)]
    pub notes: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BuildingTypeMapping {
    pub building_type: String,
    pub building_stock: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FenestrationSpec {
    pub glazing_type: String,
    pub window_coating: String,
    pub total_normal_solar_energy_transmittance: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VentilationSpec {
    pub ventilation_system: String,
    #[serde(rename = "HRU_efficiency")]
    pub hru_efficiency: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BuildingFabricTemplate {
    pub building_stock: String,
    pub building_fabrics: String,
    pub building_loads: String,
}

/// Immutable lookups over the assumption tables, built once per run.
#[derive(Clone, Debug)]
pub struct Assumptions {
    structure_types: IndexMap<String, StructureTypeSpec>,
    building_stocks: IndexMap<String, BuildingStockDefinition>,
    building_stock_for_type: IndexMap<String, String>,
    solar_transmittance: IndexMap<(String, String), f64>,
    hru_efficiency: IndexMap<String, f64>,
    building_fabrics: IndexMap<String, BuildingFabricTemplate>,
}

impl Assumptions {
    pub fn from_input(input: &AbmInput) -> Self {
        Self {
            structure_types: input
                .structure_types
                .iter()
                .map(|spec| (spec.structure_type.clone(), spec.clone()))
                .collect(),
            building_stocks: input
                .building_stocks
                .iter()
                .map(|stock| (stock.building_stock.clone(), stock.clone()))
                .collect(),
            building_stock_for_type: input
                .building_type_mappings
                .iter()
                .map(|mapping| (mapping.building_type.clone(), mapping.building_stock.clone()))
                .collect(),
            solar_transmittance: input
                .fenestration
                .iter()
                .map(|spec| {
                    (
                        (spec.glazing_type.clone(), spec.window_coating.clone()),
                        spec.total_normal_solar_energy_transmittance,
                    )
                })
                .collect(),
            hru_efficiency: input
                .ventilation
                .iter()
                .map(|spec| (spec.ventilation_system.clone(), spec.hru_efficiency))
                .collect(),
            building_fabrics: input
                .building_fabrics
                .iter()
                .map(|template| (template.building_stock.clone(), template.clone()))
                .collect(),
        }
    }

    pub fn structure_types(&self) -> impl Iterator<Item = &StructureTypeSpec> {
        self.structure_types.values()
    }

    pub fn structure_type(&self, structure_type: &str) -> Result<&StructureTypeSpec, AbmError> {
        self.structure_types
            .get(structure_type)
            .ok_or_else(|| AbmError::missing_assumption("structure_types", structure_type))
    }

    pub fn building_stock(&self, building_stock: &str) -> Result<&BuildingStockDefinition, AbmError> {
        self.building_stocks
            .get(building_stock)
            .ok_or_else(|| AbmError::missing_assumption("building_stocks", building_stock))
    }

    pub fn building_stock_for(&self, building_type: &str) -> Result<&str, AbmError> {
        self.building_stock_for_type
            .get(building_type)
            .map(String::as_str)
            .ok_or_else(|| AbmError::missing_assumption("building_type_mappings", building_type))
    }

    pub fn solar_transmittance(&self, glazing_type: &str, window_coating: &str) -> Result<f64, AbmError> {
        self.solar_transmittance
            .get(&(glazing_type.to_string(), window_coating.to_string()))
            .copied()
            .ok_or_else(|| {
                AbmError::missing_assumption(
                    "fenestration",
                    format!("{glazing_type} / {window_coating}"),
                )
            })
    }

    pub fn hru_efficiency(&self, ventilation_system: &str) -> Result<f64, AbmError> {
        self.hru_efficiency
            .get(ventilation_system)
            .copied()
            .ok_or_else(|| AbmError::missing_assumption("ventilation", ventilation_system))
    }

    pub fn building_fabric_template(&self, building_stock: &str) -> Result<&BuildingFabricTemplate, AbmError> {
        self.building_fabrics
            .get(building_stock)
            .ok_or_else(|| AbmError::missing_assumption("building_fabrics", building_stock))
    }
}
