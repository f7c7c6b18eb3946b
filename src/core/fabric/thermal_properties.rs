// Steady-state U-values and periodic effective thermal mass of structures, based on the
// EN ISO 13786:2017 Annex C.2.4 effective thickness method.

use crate::core::fabric::structure_type::{HeatCoupling, StructureTypeSpec};
use crate::core::material_properties::StructureLayers;
use crate::core::units::angular_frequency;
use serde::Serialize;

// Coefficients of the two-term approximation of periodic ground heat transfer,
// U_ground = A / (B + R_floor) + C / (D + R_floor)
const GROUND_COEFF_A: f64 = 0.114;
const GROUND_COEFF_B: f64 = 0.7044;
const GROUND_COEFF_C: f64 = 0.8768;
const GROUND_COEFF_D: f64 = 2.818;

/// Share of the insulation heat capacity counted towards the structure.
const INSULATION_HEAT_CAPACITY_SHARE: f64 = 0.5;

/// Heat transfer coefficients of a structure, in W / (m2.K).
///
/// Exactly one of `exterior_air` and `exterior_ground` is non-zero for any structure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct UValues {
    pub exterior_air: f64,
    pub exterior_ground: f64,
    pub interior: f64,
    pub total: f64,
}

impl UValues {
    fn from_resistances(exterior_r: f64, interior_r: f64, coupling: HeatCoupling) -> Self {
        let (exterior_air, exterior_ground) = match coupling {
            HeatCoupling::GroundCoupled => (0., 1. / exterior_r),
            HeatCoupling::Internal | HeatCoupling::ExteriorOther => (1. / exterior_r, 0.),
        };
        Self {
            exterior_air,
            exterior_ground,
            interior: 1. / interior_r,
            total: 1. / (exterior_r + interior_r),
        }
    }

    /// Return the exterior component that is in use, either towards the air or the ground.
    pub fn exterior(&self) -> f64 {
        self.exterior_air + self.exterior_ground
    }

    pub fn is_finite(&self) -> bool {
        [
            self.exterior_air,
            self.exterior_ground,
            self.interior,
            self.total,
        ]
        .iter()
        .all(|u| u.is_finite())
    }
}

/// Areal heat capacity of the structure before periodic attenuation, in J / (m2.K)
///
/// Internal structures are modelled without insulation, other structures count half of
/// the insulation layer towards their thermal mass.
pub fn areal_heat_capacity(layers: &StructureLayers, spec: &StructureTypeSpec) -> f64 {
    let material = layers.material.areal_heat_capacity();
    match spec.coupling() {
        HeatCoupling::Internal => material,
        HeatCoupling::GroundCoupled | HeatCoupling::ExteriorOther => {
            material + INSULATION_HEAT_CAPACITY_SHARE * layers.insulation_areal_heat_capacity()
        }
    }
}

/// Calculate the effective thermal mass of a structure, in J / (m2.K)
///
/// Arguments:
/// * `layers` - material and insulation layers of the structure
/// * `spec` - structure type properties, for the interior surface resistance
/// * `period_of_variations` - period of the temperature oscillation, in seconds
pub fn effective_thermal_mass(
    layers: &StructureLayers,
    spec: &StructureTypeSpec,
    period_of_variations: f64,
) -> f64 {
    let raw_mass = areal_heat_capacity(layers, spec);
    let omega = angular_frequency(period_of_variations);
    raw_mass / (1. + (omega * raw_mass * spec.interior_resistance).powi(2)).sqrt()
}

/// Total thermal resistance between the interior and the ground, in m2.K / W, for a floor
/// with the given resistance (including the interior surface resistance).
pub fn ground_resistance(floor_resistance: f64) -> f64 {
    1. / (GROUND_COEFF_A / (GROUND_COEFF_B + floor_resistance)
        + GROUND_COEFF_C / (GROUND_COEFF_D + floor_resistance))
}

/// Resistance from the interior surface up to the middle of the insulation, or up to the
/// middle of the structure itself when there is no insulation.
fn node_reference_resistance(material_r: f64, insulation_r: f64) -> f64 {
    if insulation_r > 0. {
        material_r + insulation_r / 2.
    } else {
        material_r / 2.
    }
}

/// Calculate the U-values of a structure.
///
/// The structural temperature node is placed at `interior_node_depth` times the
/// resistance from the interior surface to the middle of the insulation. The interior
/// U-value covers the interior surface up to the node, and the exterior U-value covers
/// the rest of the structure up to the ambient air or the ground.
pub fn u_values(
    layers: &StructureLayers,
    spec: &StructureTypeSpec,
    interior_node_depth: f64,
) -> UValues {
    let coupling = spec.coupling();
    let material_r = layers.material_resistance();
    match coupling {
        HeatCoupling::Internal => {
            let node_r = interior_node_depth * node_reference_resistance(material_r, 0.);
            let interior_r = spec.interior_resistance + node_r;
            let exterior_r = spec.exterior_resistance + material_r - node_r;
            UValues::from_resistances(exterior_r, interior_r, coupling)
        }
        HeatCoupling::GroundCoupled => {
            let insulation_r = layers.insulation_resistance();
            let node_r = interior_node_depth * node_reference_resistance(material_r, insulation_r);
            let interior_r = spec.interior_resistance + node_r;
            let floor_r = spec.interior_resistance + material_r + insulation_r;
            let ground_r = ground_resistance(floor_r) - interior_r;
            UValues::from_resistances(ground_r, interior_r, coupling)
        }
        HeatCoupling::ExteriorOther => {
            let insulation_r = layers.insulation_resistance();
            let node_r = interior_node_depth * node_reference_resistance(material_r, insulation_r);
            let interior_r = spec.interior_resistance + node_r;
            let exterior_r = spec.exterior_resistance + material_r + insulation_r - node_r;
            UValues::from_resistances(exterior_r, interior_r, coupling)
        }
    }
}
