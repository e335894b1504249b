use std::collections::BTreeMap;

use super::model::{
    CellValue, DatasetKind, Institution, InstitutionTable, InstitutionType, RawRow, RawTable,
};
use super::stats::ColumnSummary;

// ---------------------------------------------------------------------------
// Source column names (header contract of the input files)
// ---------------------------------------------------------------------------

pub const SRC_NAME: &str = "Institution Name";
pub const SRC_ADMISSION_RATE: &str = "Acceptance Rate 2022 (IPEDS)";
pub const SRC_GRADUATION_RATE: &str = "6 Year Grad Rate 2022 (IPEDS)";
pub const SRC_COHORT_GRADUATION_RATE: &str = "FTFT Grad Rate (6 Years) 2015-2016 Cohort (Bain)";
pub const SRC_YIELD_RATE: &str = "Yield Rate 2022 (IPEDS)";
pub const SRC_EARNINGS_RATIO: &str = "Earnings-to-Price Ratio (Itzkowitz)";
pub const SRC_CONTROL: &str = "Control of institution (IPEDS)";
pub const SRC_CITY: &str = "City location of institution (HD2022)";
pub const SRC_STATE: &str = "State abbreviation (HD2022)";
pub const SRC_FOUR_YEAR_COST: &str = "Average net price over four years (Itkowitz)";
pub const SRC_FIT_RATING: &str = "Fit Rating for Accessible Excellence List";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";

// ---------------------------------------------------------------------------
// Display column names
// ---------------------------------------------------------------------------

pub const NAME: &str = "Name";
pub const CITY: &str = "City";
pub const STATE: &str = "State";
pub const CONTROL: &str = "Control";
pub const INSTITUTION_TYPE: &str = "Institution Type";
pub const ADMISSION_RATE: &str = "Admission Rate";
pub const GRADUATION_RATE: &str = "Graduation Rate";
pub const YIELD_RATE: &str = "Yield Rate";
pub const EARNINGS_RATIO: &str = "Earnings to Price Ratio";
pub const FOUR_YEAR_COST: &str = "Four Year Cost";
pub const FIT_RATING: &str = "Fit Rating";

const HIDDEN_GEMS_MAPPING: &[(&str, &str)] = &[
    (SRC_NAME, NAME),
    (SRC_ADMISSION_RATE, ADMISSION_RATE),
    (SRC_EARNINGS_RATIO, EARNINGS_RATIO),
    (SRC_GRADUATION_RATE, GRADUATION_RATE),
    (SRC_CONTROL, CONTROL),
    (SRC_CITY, CITY),
    (SRC_STATE, STATE),
    (SRC_FOUR_YEAR_COST, FOUR_YEAR_COST),
    (SRC_YIELD_RATE, YIELD_RATE),
];

const ACCESSIBLE_EXCELLENCE_MAPPING: &[(&str, &str)] = &[
    (SRC_NAME, NAME),
    (SRC_CITY, CITY),
    (SRC_STATE, STATE),
    (SRC_CONTROL, CONTROL),
    (SRC_FIT_RATING, FIT_RATING),
];

impl DatasetKind {
    /// Source → display column names. Sources not present in a file are skipped.
    pub fn column_mapping(self) -> &'static [(&'static str, &'static str)] {
        match self {
            DatasetKind::HiddenGems => HIDDEN_GEMS_MAPPING,
            DatasetKind::AccessibleExcellence => ACCESSIBLE_EXCELLENCE_MAPPING,
        }
    }

    /// Columns holding `"85%"`-style strings.
    pub fn percentage_columns(self) -> &'static [&'static str] {
        match self {
            DatasetKind::HiddenGems => &[
                SRC_ADMISSION_RATE,
                SRC_GRADUATION_RATE,
                SRC_COHORT_GRADUATION_RATE,
                SRC_YIELD_RATE,
            ],
            DatasetKind::AccessibleExcellence => &[],
        }
    }

    /// Columns holding `"$12,345"`-style strings.
    pub fn currency_columns(self) -> &'static [&'static str] {
        match self {
            DatasetKind::HiddenGems => &[SRC_FOUR_YEAR_COST],
            DatasetKind::AccessibleExcellence => &[],
        }
    }

    /// Columns coerced straight to floating point.
    pub fn numeric_columns(self) -> &'static [&'static str] {
        match self {
            DatasetKind::HiddenGems => &[SRC_EARNINGS_RATIO, LATITUDE, LONGITUDE],
            DatasetKind::AccessibleExcellence => &[LATITUDE, LONGITUDE],
        }
    }
}

// ---------------------------------------------------------------------------
// Cell coercions – never fail, unparseable becomes missing
// ---------------------------------------------------------------------------

/// Text is a percentage with or without the sign: `"85%"` and `"85"` are
/// both `0.85`. Numeric cells pass through unchanged.
pub fn parse_percentage(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::String(s) => {
            let trimmed = s.trim();
            let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
            parse_finite(number).map(|v| v / 100.0)
        }
        other => other.as_f64(),
    }
}

/// `"$12,345"` → `12345.0`. Numeric cells pass through unchanged.
pub fn parse_currency(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
            parse_finite(&cleaned)
        }
        other => other.as_f64(),
    }
}

/// Plain float coercion, keeping sign and scale.
pub fn parse_numeric(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::String(s) => parse_finite(s),
        other => other.as_f64(),
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Institution type from the coded control cell; unmapped codes are missing.
pub fn derive_institution_type(control: &CellValue) -> Option<InstitutionType> {
    control.as_f64().and_then(InstitutionType::from_code)
}

fn coerce_column(row: &mut RawRow, column: &str, parse: fn(&CellValue) -> Option<f64>) {
    if let Some(cell) = row.get_mut(column) {
        *cell = parse(cell).map_or(CellValue::Null, CellValue::Float);
    }
}

/// Apply a rename table to one row. Keys absent from the row are ignored and
/// unmapped keys keep their name.
pub fn rename_columns(row: RawRow, mapping: &[(&str, &str)]) -> RawRow {
    row.into_iter()
        .map(|(key, value)| {
            let renamed = mapping
                .iter()
                .find(|(old, _)| *old == key)
                .map_or(key, |(_, new)| new.to_string());
            (renamed, value)
        })
        .collect()
}

fn take_text(row: &mut RawRow, column: &str) -> Option<String> {
    row.remove(column).and_then(|c| c.as_text())
}

fn take_f64(row: &mut RawRow, column: &str) -> Option<f64> {
    row.remove(column).and_then(|c| c.as_f64())
}

/// Build the record from a coerced, renamed row. Whatever is left over is
/// kept in `extra`.
fn institution_from_row(mut row: RawRow) -> Institution {
    let control_cell = row.remove(CONTROL).unwrap_or(CellValue::Null);
    Institution {
        name: take_text(&mut row, NAME),
        city: take_text(&mut row, CITY),
        state: take_text(&mut row, STATE),
        control: control_cell.as_f64(),
        institution_type: derive_institution_type(&control_cell),
        admission_rate: take_f64(&mut row, ADMISSION_RATE),
        graduation_rate: take_f64(&mut row, GRADUATION_RATE),
        yield_rate: take_f64(&mut row, YIELD_RATE),
        earnings_to_price: take_f64(&mut row, EARNINGS_RATIO),
        four_year_cost: take_f64(&mut row, FOUR_YEAR_COST),
        fit_rating: take_text(&mut row, FIT_RATING),
        latitude: take_f64(&mut row, LATITUDE),
        longitude: take_f64(&mut row, LONGITUDE),
        extra: row,
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Coerce, rename and derive columns for the given dashboard.
pub fn normalize(raw: RawTable, kind: DatasetKind) -> InstitutionTable {
    let mapping = kind.column_mapping();

    let absent: Vec<&str> = mapping
        .iter()
        .map(|(old, _)| *old)
        .filter(|col| !raw.has_column(col))
        .collect();
    if !absent.is_empty() {
        log::debug!("Source columns not present, skipped: {absent:?}");
    }

    let records: Vec<Institution> = raw
        .rows
        .into_iter()
        .map(|mut row| {
            for col in kind.percentage_columns() {
                coerce_column(&mut row, col, parse_percentage);
            }
            for col in kind.currency_columns() {
                coerce_column(&mut row, col, parse_currency);
            }
            for col in kind.numeric_columns() {
                coerce_column(&mut row, col, parse_numeric);
            }
            institution_from_row(rename_columns(row, mapping))
        })
        .collect();

    let mut column_names: Vec<String> = raw
        .column_names
        .iter()
        .map(|col| {
            mapping
                .iter()
                .find(|(old, _)| old == col)
                .map_or_else(|| col.clone(), |(_, new)| new.to_string())
        })
        .collect();
    column_names.push(INSTITUTION_TYPE.to_string());

    let table = InstitutionTable::from_records(kind, records, column_names);
    log_diagnostics(&table);
    table
}

/// Operator diagnostics only; nothing downstream depends on these.
fn log_diagnostics(table: &InstitutionTable) {
    log::info!(
        "Normalised {} institutions for {}",
        table.len(),
        table.kind.title()
    );
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }

    let numeric: BTreeMap<&str, ColumnSummary> = [
        (ADMISSION_RATE, table.records.iter().map(|r| r.admission_rate).collect::<Vec<_>>()),
        (GRADUATION_RATE, table.records.iter().map(|r| r.graduation_rate).collect()),
        (YIELD_RATE, table.records.iter().map(|r| r.yield_rate).collect()),
        (EARNINGS_RATIO, table.records.iter().map(|r| r.earnings_to_price).collect()),
        (FOUR_YEAR_COST, table.records.iter().map(|r| r.four_year_cost).collect()),
        (LATITUDE, table.records.iter().map(|r| r.latitude).collect()),
        (LONGITUDE, table.records.iter().map(|r| r.longitude).collect()),
    ]
    .into_iter()
    .map(|(name, values)| (name, ColumnSummary::describe(values)))
    .collect();

    log::debug!("Columns: {:?}", table.column_names);
    for (name, summary) in &numeric {
        if summary.count > 0 {
            log::debug!("{name}: {summary}");
        }
    }
    let untyped = table
        .records
        .iter()
        .filter(|r| r.control.is_some() && r.institution_type.is_none())
        .count();
    if untyped > 0 {
        log::debug!("{untyped} records have an unmapped control code");
    }
}
