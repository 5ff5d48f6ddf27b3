use crate::types::{AssessedRegion, Indicator};
use anyhow::{Context, Result};
use std::io::Write;

/// One CSV row per region: name, then value and recommendation per theme.
pub fn write_report<W: Write>(writer: W, assessed: &[AssessedRegion]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Region".to_string()];
    for indicator in Indicator::ALL {
        header.push(indicator.theme().to_string());
        header.push(format!("{} Recommendation", indicator.theme()));
    }
    wtr.write_record(&header)?;

    for region in assessed {
        let mut row = vec![region.region.name.clone()];
        for indicator in Indicator::ALL {
            row.push(region.indicators.get(indicator).to_string());
            row.push(region.recommendation(indicator).to_string());
        }
        wtr.write_record(&row)?;
    }

    wtr.flush().context("Failed to write report")?;
    Ok(())
}
