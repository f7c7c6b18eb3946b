use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Name of the structure type that is coupled to the ground rather than the ambient air.
pub const BASE_FLOOR: &str = "base_floor";

/// How a structure exchanges heat with its surroundings.
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, Hash, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum HeatCoupling {
    /// Separates two interior spaces, no insulation assumed.
    Internal,
    /// Base floor resting on the ground.
    GroundCoupled,
    /// Walls, roofs and other structures facing the ambient air.
    ExteriorOther,
}

/// A row of the structure type assumptions, mapping an abstract structure type to the
/// column prefix used for its layers in the raw records.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StructureTypeSpec {
    pub structure_type: String,
    #[serde(rename = "ambience_structure_prefix")]
    pub record_prefix: String,
    pub is_internal: bool,
    #[serde(rename = "interior_resistance_m2K_W")]
    pub interior_resistance: f64,
    #[serde(rename = "exterior_resistance_m2K_W")]
    pub exterior_resistance: f64,
    #[serde(rename = "linear_thermal_bridges_W_mK")]
    pub linear_thermal_bridges: f64,
}

impl StructureTypeSpec {
    pub fn coupling(&self) -> HeatCoupling {
        if self.is_internal {
            HeatCoupling::Internal
        } else if self.structure_type == BASE_FLOOR {
            HeatCoupling::GroundCoupled
        } else {
            HeatCoupling::ExteriorOther
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    pub(crate) fn structure_type_spec(
        structure_type: &str,
        record_prefix: &str,
        is_internal: bool,
        interior_resistance: f64,
        exterior_resistance: f64,
    ) -> StructureTypeSpec {
        StructureTypeSpec {
            structure_type: structure_type.to_string(),
            record_prefix: record_prefix.to_string(),
            is_internal,
            interior_resistance,
            exterior_resistance,
            linear_thermal_bridges: 0.1,
        }
    }

    #[rstest]
    #[case(structure_type_spec("exterior_wall", "WALL", false, 0.13, 0.04), HeatCoupling::ExteriorOther)]
    #[case(structure_type_spec("roof", "ROOF", false, 0.1, 0.04), HeatCoupling::ExteriorOther)]
    #[case(structure_type_spec(BASE_FLOOR, "GROUND FLOOR", false, 0.17, 0.0), HeatCoupling::GroundCoupled)]
    #[case(structure_type_spec("light_partition_wall", "INTERNAL WALL", true, 0.13, 0.13), HeatCoupling::Internal)]
    fn should_select_coupling_regime(
        #[case] spec: StructureTypeSpec,
        #[case] expected: HeatCoupling,
    ) {
        assert_eq!(spec.coupling(), expected);
    }

    #[rstest]
    fn should_prefer_internal_flag_over_base_floor_name() {
        assert_eq!(
            structure_type_spec(BASE_FLOOR, "GROUND FLOOR", true, 0.17, 0.17).coupling(),
            HeatCoupling::Internal
        );
    }

    #[rstest]
    fn should_display_coupling_in_snake_case() {
        assert_eq!(HeatCoupling::GroundCoupled.to_string(), "ground_coupled");
        assert_eq!(
            "exterior_other".parse::<HeatCoupling>().unwrap(),
            HeatCoupling::ExteriorOther
        );
    }

    #[rstest]
    fn should_read_spec_from_csv_columns() {
        let csv = "structure_type,ambience_structure_prefix,is_internal,interior_resistance_m2K_W,exterior_resistance_m2K_W,linear_thermal_bridges_W_mK\n\
                   exterior_wall,WALL,false,0.13,0.04,0.1\n";
        let rows: Vec<StructureTypeSpec> = csv::Reader::from_reader(csv.as_bytes())
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows, vec![structure_type_spec("exterior_wall", "WALL", false, 0.13, 0.04)]);
    }
}
