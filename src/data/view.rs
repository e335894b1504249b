//! Read-only projections handed to the map and table.
//!
//! Numbers stay raw `f64` here; percent signs and currency formatting are
//! applied by the UI.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::model::{DatasetKind, Institution, InstitutionTable, InstitutionType};
use super::normalize::{
    ADMISSION_RATE, CITY, EARNINGS_RATIO, FIT_RATING, FOUR_YEAR_COST, GRADUATION_RATE,
    INSTITUTION_TYPE, LATITUDE, LONGITUDE, NAME, STATE, YIELD_RATE,
};

/// Table columns of the Hidden Gems dashboard, in display order.
pub const GEMS_COLUMNS: [&str; 9] = [
    NAME,
    CITY,
    STATE,
    INSTITUTION_TYPE,
    ADMISSION_RATE,
    EARNINGS_RATIO,
    GRADUATION_RATE,
    FOUR_YEAR_COST,
    YIELD_RATE,
];

/// Table columns of the Accessible Excellence dashboard, in display order.
pub const EXCELLENCE_COLUMNS: [&str; 7] = [
    NAME,
    CITY,
    STATE,
    INSTITUTION_TYPE,
    FIT_RATING,
    LATITUDE,
    LONGITUDE,
];

pub fn columns_for(kind: DatasetKind) -> &'static [&'static str] {
    match kind {
        DatasetKind::HiddenGems => &GEMS_COLUMNS,
        DatasetKind::AccessibleExcellence => &EXCELLENCE_COLUMNS,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GemsRow<'a> {
    #[serde(rename = "Name")]
    pub name: Option<&'a str>,
    #[serde(rename = "City")]
    pub city: Option<&'a str>,
    #[serde(rename = "State")]
    pub state: Option<&'a str>,
    #[serde(rename = "Institution Type")]
    pub institution_type: Option<InstitutionType>,
    #[serde(rename = "Admission Rate")]
    pub admission_rate: Option<f64>,
    #[serde(rename = "Earnings to Price Ratio")]
    pub earnings_to_price: Option<f64>,
    #[serde(rename = "Graduation Rate")]
    pub graduation_rate: Option<f64>,
    #[serde(rename = "Four Year Cost")]
    pub four_year_cost: Option<f64>,
    #[serde(rename = "Yield Rate")]
    pub yield_rate: Option<f64>,
}

impl<'a> From<&'a Institution> for GemsRow<'a> {
    fn from(rec: &'a Institution) -> Self {
        Self {
            name: rec.name.as_deref(),
            city: rec.city.as_deref(),
            state: rec.state.as_deref(),
            institution_type: rec.institution_type,
            admission_rate: rec.admission_rate,
            earnings_to_price: rec.earnings_to_price,
            graduation_rate: rec.graduation_rate,
            four_year_cost: rec.four_year_cost,
            yield_rate: rec.yield_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcellenceRow<'a> {
    #[serde(rename = "Name")]
    pub name: Option<&'a str>,
    #[serde(rename = "City")]
    pub city: Option<&'a str>,
    #[serde(rename = "State")]
    pub state: Option<&'a str>,
    #[serde(rename = "Institution Type")]
    pub institution_type: Option<InstitutionType>,
    #[serde(rename = "Fit Rating")]
    pub fit_rating: Option<&'a str>,
    #[serde(rename = "Latitude")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<f64>,
}

impl<'a> From<&'a Institution> for ExcellenceRow<'a> {
    fn from(rec: &'a Institution) -> Self {
        Self {
            name: rec.name.as_deref(),
            city: rec.city.as_deref(),
            state: rec.state.as_deref(),
            institution_type: rec.institution_type,
            fit_rating: rec.fit_rating.as_deref(),
            latitude: rec.latitude,
            longitude: rec.longitude,
        }
    }
}

/// The rows among `indices` that can be placed on the map.
pub fn geo_subset(table: &InstitutionTable, indices: &[usize]) -> Vec<usize> {
    indices
        .iter()
        .copied()
        .filter(|&i| table.records[i].coordinates().is_some())
        .collect()
}

/// Write the given rows as CSV with the dashboard's display columns.
/// Returns the number of rows written.
pub fn export_csv(table: &InstitutionTable, indices: &[usize], path: &Path) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer
        .write_record(columns_for(table.kind))
        .context("writing CSV header")?;

    for &i in indices {
        let rec = &table.records[i];
        match table.kind {
            DatasetKind::HiddenGems => writer.serialize(GemsRow::from(rec)),
            DatasetKind::AccessibleExcellence => writer.serialize(ExcellenceRow::from(rec)),
        }
        .with_context(|| format!("writing row {i}"))?;
    }

    writer.flush().context("flushing CSV")?;
    log::info!("Exported {} rows to {}", indices.len(), path.display());
    Ok(indices.len())
}
