use crate::classify::classify;
use crate::error::PipelineError;
use crate::indicators::{derive_indicators, IndicatorColumns};
use crate::join::join;
use crate::types::{AssessedRegion, AttributeTable, Indicator, Region};
use tracing::info;

/// Join, derive and classify. Fails only on structural problems; bad rows
/// degrade to neutral values.
pub fn evaluate(
    regions: Vec<Region>,
    population: &AttributeTable,
    land: &AttributeTable,
    columns: &IndicatorColumns,
) -> Result<Vec<AssessedRegion>, PipelineError> {
    columns.validate(population, land)?;

    info!("Evaluating {} regions...", regions.len());

    let assessed = join(regions, population, land)
        .into_iter()
        .map(|joined| {
            let indicators = derive_indicators(&joined, columns);
            let recommendations = Indicator::ALL.map(|i| classify(i, indicators.get(i)));
            AssessedRegion {
                region: joined.region,
                indicators,
                recommendations,
            }
        })
        .collect();

    Ok(assessed)
}
