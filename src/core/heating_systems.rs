use serde::{Deserialize, Serialize};

/// Dimension (and heat source) of heating systems served by a district heating network.
pub const DISTRICT: &str = "District";

/// One of the heating systems of a reference building, with the fraction of the building
/// stock segment it serves.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeatingSystem {
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default)]
    pub heat_source: Option<String>,
    pub prevalence: f64,
    #[serde(default)]
    pub dimension: Option<String>,
}

impl HeatingSystem {
    /// Return the heat source the system is reported under.
    ///
    /// Any system with a "District" dimension is reported under the "District" heat source,
    /// regardless of its stated heat source or fuel.
    pub fn heat_source(&self) -> Option<&str> {
        match self.dimension.as_deref() {
            Some(DISTRICT) => Some(DISTRICT),
            _ => self.heat_source.as_deref(),
        }
    }
}

/// Rescale the prevalences of a building's heating systems so that they sum to one.
///
/// A zero total leaves every prevalence as NaN, and such systems are dropped during
/// aggregation.
pub fn normalize_prevalences(heating_systems: &[HeatingSystem]) -> Vec<HeatingSystem> {
    let total: f64 = heating_systems.iter().map(|system| system.prevalence).sum();
    heating_systems
        .iter()
        .map(|system| HeatingSystem {
            prevalence: system.prevalence / total,
            ..system.clone()
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    pub(crate) fn heating_system(heat_source: &str, prevalence: f64) -> HeatingSystem {
        HeatingSystem {
            fuel: Some("Natural gas".to_string()),
            heat_source: Some(heat_source.to_string()),
            prevalence,
            dimension: Some("Individual".to_string()),
        }
    }

    #[rstest]
    #[case(vec![0.5, 0.3, 0.1])]
    #[case(vec![60., 30., 10.])]
    #[case(vec![1.2])]
    #[case(vec![0.25, 0.25])]
    fn should_normalize_prevalences_to_one(#[case] prevalences: Vec<f64>) {
        let systems: Vec<HeatingSystem> = prevalences
            .iter()
            .map(|prevalence| heating_system("Boiler", *prevalence))
            .collect();
        let normalized = normalize_prevalences(&systems);
        let total: f64 = normalized.iter().map(|system| system.prevalence).sum();
        assert_relative_eq!(total, 1., max_relative = 1e-12);
    }

    #[rstest]
    fn should_keep_relative_shares_when_normalizing() {
        let normalized = normalize_prevalences(&[
            heating_system("Boiler", 0.6),
            heating_system("Heat pump", 0.2),
        ]);
        assert_relative_eq!(normalized[0].prevalence, 0.75);
        assert_relative_eq!(normalized[1].prevalence, 0.25);
        assert_eq!(normalized[1].heat_source(), Some("Heat pump"));
    }

    #[rstest]
    fn should_propagate_nan_for_zero_total() {
        let normalized = normalize_prevalences(&[
            heating_system("Boiler", 0.),
            heating_system("Heat pump", 0.),
        ]);
        assert!(normalized.iter().all(|system| system.prevalence.is_nan()));
    }

    #[rstest]
    fn should_report_district_dimension_as_district_heat_source() {
        let system = HeatingSystem {
            dimension: Some(DISTRICT.to_string()),
            ..heating_system("Boiler", 1.)
        };
        assert_eq!(system.heat_source(), Some(DISTRICT));
    }

    #[rstest]
    fn should_have_no_heat_source_when_missing() {
        let system = HeatingSystem {
            heat_source: None,
            ..heating_system("Boiler", 1.)
        };
        assert_eq!(system.heat_source(), None);
    }
}
