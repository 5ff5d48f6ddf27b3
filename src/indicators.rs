use crate::config::{LandConfig, PopulationConfig};
use crate::error::PipelineError;
use crate::types::{AttributeTable, Dataset, Indicator, IndicatorValues, JoinedRegion};
use tracing::debug;

/// How a raw cell is turned into a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Trailing `%` is stripped.
    Percentage,
    Plain,
    /// `,` thousands separators are stripped.
    Grouped,
}

impl Normalization {
    pub fn parse(self, raw: &str) -> Option<f64> {
        match self {
            Normalization::Percentage => parse_percentage(raw),
            Normalization::Plain => parse_plain(raw),
            Normalization::Grouped => parse_grouped(raw),
        }
    }
}

fn valid(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}

pub fn parse_plain(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().and_then(valid)
}

pub fn parse_percentage(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    parse_plain(trimmed.strip_suffix('%').unwrap_or(trimmed))
}

/// Parses `1,234,567.5`. Commas must sit between well-formed groups of three
/// digits, so `150,5` is rejected rather than read as 1505.
pub fn parse_grouped(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if !trimmed.contains(',') {
        return parse_plain(trimmed);
    }

    let (integer_part, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if fraction.contains(',') {
        return None;
    }
    let mut groups = integer_part.split(',');
    let leading = groups.next().unwrap_or_default();
    let leading_digits = leading.strip_prefix('+').unwrap_or(leading);

    let leading_ok = (1..=3).contains(&leading_digits.len())
        && leading_digits.bytes().all(|b| b.is_ascii_digit());
    let rest_ok = groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()));

    if !(leading_ok && rest_ok) {
        return None;
    }
    parse_plain(&trimmed.replace(',', ""))
}

/// Where an indicator's value comes from in the joined data.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSource {
    pub dataset: Dataset,
    pub column: String,
    pub normalization: Normalization,
}

/// Source columns for all four indicators, taken from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorColumns {
    pub urban_planning: IndicatorSource,
    pub infrastructure: IndicatorSource,
    pub conservation: IndicatorSource,
    pub socio_economic_density: IndicatorSource,
}

impl IndicatorColumns {
    pub fn from_config(population: &PopulationConfig, land: &LandConfig) -> Self {
        IndicatorColumns {
            urban_planning: IndicatorSource {
                dataset: Dataset::Population,
                column: population.urban_percentage_column.clone(),
                normalization: Normalization::Percentage,
            },
            infrastructure: IndicatorSource {
                dataset: Dataset::Land,
                column: land.net_sown_area_column.clone(),
                normalization: Normalization::Plain,
            },
            conservation: IndicatorSource {
                dataset: Dataset::Land,
                column: land.forest_column.clone(),
                normalization: Normalization::Plain,
            },
            socio_economic_density: IndicatorSource {
                dataset: Dataset::Population,
                column: population.density_column.clone(),
                normalization: Normalization::Grouped,
            },
        }
    }

    pub fn source(&self, indicator: Indicator) -> &IndicatorSource {
        match indicator {
            Indicator::UrbanPlanning => &self.urban_planning,
            Indicator::Infrastructure => &self.infrastructure,
            Indicator::Conservation => &self.conservation,
            Indicator::SocioEconomicDensity => &self.socio_economic_density,
        }
    }

    /// Columns that must exist in the given dataset's header.
    pub fn required(&self, dataset: Dataset) -> Vec<&str> {
        Indicator::ALL.iter()
            .map(|&i| self.source(i))
            .filter(|s| s.dataset == dataset)
            .map(|s| s.column.as_str())
            .collect()
    }

    /// A source column absent from its table is a structural error: it
    /// would silently zero every region.
    pub fn validate(&self, population: &AttributeTable, land: &AttributeTable) -> Result<(), PipelineError> {
        for indicator in Indicator::ALL {
            let source = self.source(indicator);
            let table = match source.dataset {
                Dataset::Population => population,
                Dataset::Land => land,
            };
            if !table.has_column(&source.column) {
                return Err(PipelineError::MissingColumn {
                    dataset: table.name.clone(),
                    column: source.column.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Derives one indicator; unmatched rows and unparseable cells become `0.0`.
pub fn derive_indicator(joined: &JoinedRegion, source: &IndicatorSource) -> f64 {
    let Some(raw) = joined.value(source.dataset, &source.column) else {
        return 0.0;
    };
    source.normalization.parse(raw).unwrap_or_else(|| {
        if !raw.trim().is_empty() {
            debug!("Region '{}': could not parse {:?} from '{}', using 0",
                joined.region.name, source.column, raw);
        }
        0.0
    })
}

pub fn derive_indicators(joined: &JoinedRegion, columns: &IndicatorColumns) -> IndicatorValues {
    IndicatorValues {
        urban_planning: derive_indicator(joined, &columns.urban_planning),
        infrastructure: derive_indicator(joined, &columns.infrastructure),
        conservation: derive_indicator(joined, &columns.conservation),
        socio_economic_density: derive_indicator(joined, &columns.socio_economic_density),
    }
}
