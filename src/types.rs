use geo::MultiPolygon;
use serde_json::Value;
use std::collections::BTreeMap;

/// A boundary feature as read from the shapefile or GeoJSON.
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    // Every other boundary attribute, passed through untouched.
    pub attributes: BTreeMap<String, Value>,
}

/// One row of a delimited attribute table, keyed by its region name.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRecord {
    pub key: String,
    pub values: BTreeMap<String, String>,
}

impl AttributeRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct AttributeTable {
    /// Dataset label used in diagnostics ("population", "land").
    pub name: String,
    pub headers: Vec<String>,
    pub records: Vec<AttributeRecord>,
}

impl AttributeTable {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Population,
    Land,
}

/// A region with the matching row (if any) of each attribute table.
#[derive(Debug, Clone)]
pub struct JoinedRegion {
    pub region: Region,
    pub population: Option<AttributeRecord>,
    pub land: Option<AttributeRecord>,
}

impl JoinedRegion {
    pub fn value(&self, dataset: Dataset, column: &str) -> Option<&str> {
        let record = match dataset {
            Dataset::Population => self.population.as_ref(),
            Dataset::Land => self.land.as_ref(),
        };
        record.and_then(|r| r.get(column))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    UrbanPlanning,
    Infrastructure,
    Conservation,
    SocioEconomicDensity,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::UrbanPlanning,
        Indicator::Infrastructure,
        Indicator::Conservation,
        Indicator::SocioEconomicDensity,
    ];

    /// Position in `ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Map title for this indicator's theme.
    pub fn theme(self) -> &'static str {
        match self {
            Indicator::UrbanPlanning => "Urban Planning",
            Indicator::Infrastructure => "Infrastructure Development",
            Indicator::Conservation => "Environmental Conservation",
            Indicator::SocioEconomicDensity => "Socio-Economics Analysis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndicatorValues {
    pub urban_planning: f64,
    pub infrastructure: f64,
    pub conservation: f64,
    pub socio_economic_density: f64,
}

impl IndicatorValues {
    pub fn get(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::UrbanPlanning => self.urban_planning,
            Indicator::Infrastructure => self.infrastructure,
            Indicator::Conservation => self.conservation,
            Indicator::SocioEconomicDensity => self.socio_economic_density,
        }
    }
}

/// Final stage of the pipeline: indicators plus their recommendation labels.
#[derive(Debug, Clone)]
pub struct AssessedRegion {
    pub region: Region,
    pub indicators: IndicatorValues,
    pub recommendations: [&'static str; 4],
}

impl AssessedRegion {
    pub fn recommendation(&self, indicator: Indicator) -> &'static str {
        self.recommendations[indicator.index()]
    }
}
