use crate::core::fabric::structure_type::tests::structure_type_spec;
use crate::core::heating_systems::tests::heating_system;
use crate::input::{
    AbmInput, BuildingFabricTemplate, BuildingStockDefinition, BuildingTypeMapping,
    FenestrationSpec, HeatingSystem, LayerProperties, RawBuildingRecord, StructureLayers,
    VentilationSpec,
};
use crate::output::Output;
use indexmap::IndexMap;
use rstest::*;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::io::Write;
use std::rc::Rc;


/// An output collecting everything written, keyed by location key.
#[derive(Debug, Default)]
pub(crate) struct MemoryOutput {
    files: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryOutput {
    pub(crate) fn contents(&self, key: &str) -> String {
        String::from_utf8(self.files.borrow()[key].clone()).unwrap()
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }
}

pub(crate) struct MemoryWriter {
    key: String,
    files: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.files
            .borrow_mut()
            .entry(self.key.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Output for MemoryOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        self.files
            .borrow_mut()
            .entry(location_key.to_string())
            .or_default();
        Ok(MemoryWriter {
            key: location_key.to_string(),
            files: self.files.clone(),
        })
    }
}

fn brick() -> LayerProperties {
    LayerProperties::new(0.25, 1800., 840., 0.77)
}

fn concrete() -> LayerProperties {
    LayerProperties::new(0.2, 2300., 880., 1.6)
}

fn mineral_wool(thickness: f64) -> LayerProperties {
    LayerProperties::new(thickness, 30., 850., 0.037)
}

fn structures(wall_insulation: f64) -> IndexMap<String, StructureLayers> {
    IndexMap::from([
        (
            "WALL".to_string(),
            StructureLayers::new(brick(), Some(mineral_wool(wall_insulation))),
        ),
        (
            "ROOF".to_string(),
            StructureLayers::new(concrete(), Some(mineral_wool(0.2))),
        ),
        (
            "FLOOR".to_string(),
            StructureLayers::new(concrete(), Some(mineral_wool(0.05))),
        ),
    ])
}

fn district_heating(prevalence: f64) -> HeatingSystem {
    HeatingSystem {
        fuel: Some("Natural gas".to_string()),
        heat_source: Some("Boiler".to_string()),
        prevalence,
        dimension: Some("District".to_string()),
    }
}

#[fixture]
pub(crate) fn sample_record() -> RawBuildingRecord {
    RawBuildingRecord {
        reference_building_code: "SE-SFH-01a".to_string(),
        location_id: "SE".to_string(),
        building_type: "SFH".to_string(),
        construction_year_low: 1946,
        construction_year_high: 1969,
        number_of_buildings: 1000.,
        number_of_storeys: 2.,
        heated_floor_area_m2: 100.,
        ground_floor_area_m2: 60.,
        wall_area_m2: 120.,
        window_area_m2: 20.,
        roof_area_m2: 70.,
        glazing_type: "double".to_string(),
        window_coating: "none".to_string(),
        window_u_value: 2.8,
        ventilation_system: "natural".to_string(),
        infiltration_rate_1_h: 0.5,
        ventilation_rate_1_h: 0.4,
        structures: structures(0.05),
        heating_systems: vec![heating_system("Boiler", 3.), heating_system("Heat pump", 2.)],
    }
}

/// Reference buildings of two sampled locations, with two material combinations of the
/// same Swedish single family house archetype.
#[fixture]
pub(crate) fn sample_records(sample_record: RawBuildingRecord) -> Vec<RawBuildingRecord> {
    vec![
        sample_record.clone(),
        RawBuildingRecord {
            reference_building_code: "SE-SFH-01b".to_string(),
            number_of_buildings: 3000.,
            heated_floor_area_m2: 300.,
            ground_floor_area_m2: 150.,
            wall_area_m2: 200.,
            window_area_m2: 40.,
            roof_area_m2: 160.,
            window_coating: "low-e".to_string(),
            window_u_value: 1.2,
            ventilation_system: "mechanical HRU".to_string(),
            infiltration_rate_1_h: 0.3,
            ventilation_rate_1_h: 0.5,
            structures: structures(0.15),
            heating_systems: vec![heating_system("Boiler", 1.)],
            ..sample_record.clone()
        },
        RawBuildingRecord {
            reference_building_code: "SE-AB-02".to_string(),
            building_type: "AB".to_string(),
            construction_year_low: 1970,
            construction_year_high: 1990,
            number_of_buildings: 500.,
            number_of_storeys: 4.,
            heated_floor_area_m2: 1200.,
            ground_floor_area_m2: 300.,
            wall_area_m2: 900.,
            window_area_m2: 200.,
            roof_area_m2: 300.,
            window_coating: "low-e".to_string(),
            window_u_value: 1.6,
            ventilation_system: "mechanical HRU".to_string(),
            structures: structures(0.1),
            heating_systems: vec![district_heating(0.8), heating_system("Heat pump", 0.2)],
            ..sample_record.clone()
        },
        RawBuildingRecord {
            reference_building_code: "FI-SFH-01".to_string(),
            location_id: "FI".to_string(),
            construction_year_low: 1970,
            construction_year_high: 1990,
            number_of_buildings: 800.,
            number_of_storeys: 1.5,
            heated_floor_area_m2: 150.,
            ground_floor_area_m2: 90.,
            wall_area_m2: 140.,
            window_area_m2: 25.,
            roof_area_m2: 100.,
            window_coating: "low-e".to_string(),
            window_u_value: 1.4,
            structures: structures(0.2),
            heating_systems: vec![district_heating(1.)],
            ..sample_record
        },
    ]
}

#[fixture]
pub(crate) fn sample_input(sample_records: Vec<RawBuildingRecord>) -> AbmInput {
    AbmInput {
        records: sample_records,
        structure_types: vec![
            structure_type_spec("exterior_wall", "WALL", false, 0.13, 0.04),
            structure_type_spec("roof", "ROOF", false, 0.1, 0.04),
            structure_type_spec("base_floor", "FLOOR", false, 0.17, 0.04),
        ],
        building_stocks: vec![BuildingStockDefinition {
            building_stock: "residential".to_string(),
            building_stock_year: 2020,
            notes: "Residential building stock".to_string(),
        }],
        building_type_mappings: ["SFH", "AB"]
            .into_iter()
            .map(|building_type| BuildingTypeMapping {
                building_type: building_type.to_string(),
                building_stock: "residential".to_string(),
            })
            .collect(),
        fenestration: vec![
            FenestrationSpec {
                glazing_type: "double".to_string(),
                window_coating: "none".to_string(),
                total_normal_solar_energy_transmittance: 0.75,
            },
            FenestrationSpec {
                glazing_type: "double".to_string(),
                window_coating: "low-e".to_string(),
                total_normal_solar_energy_transmittance: 0.6,
            },
        ],
        ventilation: vec![
            VentilationSpec {
                ventilation_system: "natural".to_string(),
                hru_efficiency: 0.,
            },
            VentilationSpec {
                ventilation_system: "mechanical HRU".to_string(),
                hru_efficiency: 0.7,
            },
        ],
        building_fabrics: vec![BuildingFabricTemplate {
            building_stock: "residential".to_string(),
            building_fabrics: "residential_fabrics".to_string(),
            building_loads: "residential_loads".to_string(),
        }],
    }
}
