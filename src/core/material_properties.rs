use serde::{Deserialize, Serialize};

/// This module contains the thermal properties of the material layers making up a structure,
/// and structs to organise this data.

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LayerProperties {
    #[serde(rename = "thickness_m")]
    thickness: f64,
    #[serde(rename = "density_kg_m3")]
    density: f64,
    #[serde(rename = "specific_heat_capacity_J_kgK")]
    specific_heat_capacity: f64, // J/(kg.K)
    #[serde(rename = "thermal_conductivity_W_mK")]
    thermal_conductivity: f64, // W/(m.K)
}

impl LayerProperties {
    pub fn new(
        thickness: f64,
        density: f64,
        specific_heat_capacity: f64,
        thermal_conductivity: f64,
    ) -> Self {
        Self {
            thickness,
            density,
            specific_heat_capacity,
            thermal_conductivity,
        }
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn specific_heat_capacity(&self) -> f64 {
        self.specific_heat_capacity
    }

    pub fn thermal_conductivity(&self) -> f64 {
        self.thermal_conductivity
    }

    /// Return volumetric heat capacity of the layer, in J / (m3.K)
    pub fn volumetric_heat_capacity(&self) -> f64 {
        self.density * self.specific_heat_capacity
    }

    /// Return areal heat capacity of the layer, in J / (m2.K)
    pub fn areal_heat_capacity(&self) -> f64 {
        self.thickness * self.volumetric_heat_capacity()
    }

    /// Return thermal resistance of the layer, in m2.K / W
    ///
    /// A zero conductivity yields an infinite resistance, which is left for the
    /// aggregation to discard rather than being treated as an error here.
    pub fn thermal_resistance(&self) -> f64 {
        self.thickness / self.thermal_conductivity
    }
}

/// The load-bearing material layer of a structure, with an optional insulation layer.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StructureLayers {
    pub material: LayerProperties,
    #[serde(default)]
    pub insulation: Option<LayerProperties>,
}

impl StructureLayers {
    pub fn new(material: LayerProperties, insulation: Option<LayerProperties>) -> Self {
        Self {
            material,
            insulation,
        }
    }

    pub fn material_resistance(&self) -> f64 {
        self.material.thermal_resistance()
    }

    pub fn insulation_resistance(&self) -> f64 {
        self.insulation
            .as_ref()
            .map_or(0., LayerProperties::thermal_resistance)
    }

    pub fn insulation_areal_heat_capacity(&self) -> f64 {
        self.insulation
            .as_ref()
            .map_or(0., LayerProperties::areal_heat_capacity)
    }
}
