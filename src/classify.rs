use crate::types::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Bands match when `value > threshold`, highest threshold first.
    Descending,
    /// Bands match when `value <= threshold`, lowest threshold first.
    Ascending,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub threshold: f64,
    pub label: &'static str,
}

const fn band(threshold: f64, label: &'static str) -> Band {
    Band { threshold, label }
}

/// Ordered threshold bands plus a catch-all. Evaluation stops at the first
/// matching band, so every value gets exactly one label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleTable {
    pub direction: Direction,
    pub bands: &'static [Band],
    pub fallback: &'static str,
}

impl RuleTable {
    pub fn classify(&self, value: f64) -> &'static str {
        let matches = |b: &&Band| match self.direction {
            Direction::Descending => value > b.threshold,
            Direction::Ascending => value <= b.threshold,
        };
        self.bands.iter()
            .find(matches)
            .map(|b| b.label)
            .unwrap_or(self.fallback)
    }

    /// All labels in evaluation order, catch-all last.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.bands.iter().map(|b| b.label).chain(std::iter::once(self.fallback))
    }
}

pub const URBAN_PLANNING: RuleTable = RuleTable {
    direction: Direction::Descending,
    bands: &[
        band(60.0, "Focus on sustainable urbanization in high urban density areas"),
        band(54.1, "Enhance infrastructure resilience and promote mixed-use development"),
        band(48.2, "Encourage eco-friendly transportation and smart city initiatives"),
        band(42.3, "Strengthen public transport systems and pedestrian-friendly spaces"),
        band(36.4, "Promote green building practices and energy-efficient policies"),
        band(30.5, "Support community-driven urban projects and housing affordability"),
        band(24.6, "Develop sustainable industrial zones and manage urban sprawl"),
        band(18.7, "Improve basic infrastructure and access to essential services"),
        band(11.0, "Encourage planned urban growth and reduce informal settlements"),
    ],
    fallback: "Promote urban development in underdeveloped areas",
};

pub const INFRASTRUCTURE: RuleTable = RuleTable {
    direction: Direction::Descending,
    bands: &[
        band(10000.0, "Expand infrastructure projects significantly in states with highly extensive agricultural land"),
        band(8000.0, "Encourage large-scale infrastructure expansion to support agriculture and rural growth"),
        band(6000.0, "Promote balanced infrastructure development to complement agricultural production"),
        band(4000.0, "Focus on enhancing infrastructure to support medium-scale agricultural activities"),
        band(2000.0, "Optimize infrastructure for better utilization in moderately agricultural areas"),
    ],
    fallback: "Prioritize infrastructure development in regions with limited agricultural land",
};

pub const CONSERVATION: RuleTable = RuleTable {
    direction: Direction::Descending,
    bands: &[
        band(5000.0, "Implement extensive reforestation and conservation programs to preserve ecosystems"),
        band(4500.0, "Focus on large-scale afforestation and forest preservation projects"),
        band(4000.0, "Strengthen community-driven conservation efforts and reforestation plans"),
        band(3500.0, "Enhance forest management practices and sustainable land use strategies"),
        band(3000.0, "Increase funding for conservation programs and biodiversity initiatives"),
        band(2500.0, "Promote sustainable forestry and eco-friendly policies in high-impact areas"),
        band(2000.0, "Support moderate-scale afforestation projects and community participation"),
        band(1500.0, "Focus on targeted afforestation efforts in underutilized regions"),
        band(1000.0, "Encourage community involvement and local conservation initiatives"),
        band(500.0, "Promote small-scale afforestation and awareness programs"),
    ],
    fallback: "Initiate basic conservation and afforestation efforts in critical regions",
};

// Density is banded bottom-up, unlike the other three.
pub const SOCIO_ECONOMIC_DENSITY: RuleTable = RuleTable {
    direction: Direction::Ascending,
    bands: &[
        band(60.0, "Focus on rural development and connectivity in sparsely populated areas"),
        band(120.0, "Support sparsely populated regions with roadways and basic facilities"),
        band(180.0, "Enhance rural infrastructure and agricultural support"),
        band(240.0, "Improve access to education and healthcare in moderately populated areas"),
        band(300.0, "Invest in medium-density regions with industrial hubs"),
        band(360.0, "Promote urbanization in emerging towns and cities"),
        band(420.0, "Develop infrastructure and job opportunities in densely populated regions"),
        band(480.0, "Implement smart city projects for high-density urban areas"),
        band(540.0, "Enhance public transportation and housing in urban centers"),
        band(600.0, "Expand utilities and green spaces in highly urbanized areas"),
        band(660.0, "Focus on reducing congestion and pollution in urban hotspots"),
        band(720.0, "Prioritize high-density urban centers with smart city initiatives"),
        band(780.0, "Develop advanced infrastructure for mega-cities and metropolitan regions"),
    ],
    fallback: "Address overpopulation challenges with sustainable city planning",
};

pub fn rule_table(indicator: Indicator) -> &'static RuleTable {
    match indicator {
        Indicator::UrbanPlanning => &URBAN_PLANNING,
        Indicator::Infrastructure => &INFRASTRUCTURE,
        Indicator::Conservation => &CONSERVATION,
        Indicator::SocioEconomicDensity => &SOCIO_ECONOMIC_DENSITY,
    }
}

pub fn classify(indicator: Indicator, value: f64) -> &'static str {
    rule_table(indicator).classify(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-4;

    fn label_index(table: &RuleTable, label: &str) -> usize {
        table.labels().position(|l| l == label).unwrap()
    }

    #[test]
    fn test_tables_have_expected_band_counts() {
        assert_eq!(URBAN_PLANNING.labels().count(), 10);
        assert_eq!(INFRASTRUCTURE.labels().count(), 6);
        assert_eq!(CONSERVATION.labels().count(), 11);
        assert_eq!(SOCIO_ECONOMIC_DENSITY.labels().count(), 14);
    }

    #[test]
    fn test_labels_are_distinct() {
        for indicator in Indicator::ALL {
            let labels: Vec<_> = rule_table(indicator).labels().collect();
            let mut deduped = labels.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(labels.len(), deduped.len(), "{:?}", indicator);
        }
    }

    #[test]
    fn test_thresholds_are_monotonic_in_evaluation_order() {
        for indicator in Indicator::ALL {
            let table = rule_table(indicator);
            for pair in table.bands.windows(2) {
                match table.direction {
                    Direction::Descending => assert!(pair[0].threshold > pair[1].threshold),
                    Direction::Ascending => assert!(pair[0].threshold < pair[1].threshold),
                }
            }
        }
    }

    #[test]
    fn test_every_band_boundary_descending() {
        for table in [&URBAN_PLANNING, &INFRASTRUCTURE, &CONSERVATION] {
            for (i, b) in table.bands.iter().enumerate() {
                // Strict `>`: the threshold itself belongs to the next band down.
                assert_eq!(table.classify(b.threshold + EPS), b.label);
                assert_eq!(label_index(table, table.classify(b.threshold)), i + 1);
            }
            assert_eq!(table.classify(0.0), table.fallback);
        }
    }

    #[test]
    fn test_every_band_boundary_ascending() {
        let table = &SOCIO_ECONOMIC_DENSITY;
        for (i, b) in table.bands.iter().enumerate() {
            assert_eq!(table.classify(b.threshold), b.label);
            assert_eq!(label_index(table, table.classify(b.threshold + EPS)), i + 1);
        }
        assert_eq!(table.classify(0.0), table.bands[0].label);
        assert_eq!(table.classify(1_000_000.0), table.fallback);
    }

    #[test]
    fn test_urban_planning_boundary_exactness() {
        assert_eq!(
            classify(Indicator::UrbanPlanning, 60.0),
            "Enhance infrastructure resilience and promote mixed-use development"
        );
        assert_eq!(
            classify(Indicator::UrbanPlanning, 60.0001),
            "Focus on sustainable urbanization in high urban density areas"
        );
        assert_eq!(
            classify(Indicator::UrbanPlanning, 11.0),
            "Promote urban development in underdeveloped areas"
        );
    }

    #[test]
    fn test_density_boundary_exactness() {
        assert_eq!(
            classify(Indicator::SocioEconomicDensity, 60.0),
            "Focus on rural development and connectivity in sparsely populated areas"
        );
        assert_eq!(
            classify(Indicator::SocioEconomicDensity, 60.0001),
            "Support sparsely populated regions with roadways and basic facilities"
        );
        assert_eq!(
            classify(Indicator::SocioEconomicDensity, 780.5),
            "Address overpopulation challenges with sustainable city planning"
        );
    }

    #[test]
    fn test_classification_is_total_over_samples() {
        for indicator in Indicator::ALL {
            let table = rule_table(indicator);
            let labels: Vec<_> = table.labels().collect();
            let mut value = 0.0;
            while value < 12000.0 {
                let label = classify(indicator, value);
                assert_eq!(labels.iter().filter(|&&l| l == label).count(), 1);
                value += 0.37;
            }
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        for indicator in Indicator::ALL {
            for value in [0.0, 59.9, 3200.0, 9000.0, 150.0] {
                assert_eq!(classify(indicator, value), classify(indicator, value));
            }
        }
    }
}
