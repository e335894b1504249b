use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataLoadError;
use super::model::{CellValue, RawRow, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one row per institution (the usual export)
/// * `.json`    – `[{ "Institution Name": "...", ... }, ...]`
/// * `.parquet` – flat scalar columns, as written by `df.to_parquet()`
pub fn load_file(path: &Path) -> Result<RawTable, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Read {} rows x {} columns from {}",
        table.rows.len(),
        table.column_names.len(),
        path.display()
    );
    Ok(table)
}

fn open(path: &Path) -> Result<File, DataLoadError> {
    File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with the source column names, one record per line.
///
/// Short rows are padded with missing cells; a row longer than the header is
/// malformed. Cells are typed per column (see [`ColumnType::infer`]).
fn load_csv(path: &Path) -> Result<RawTable, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(open(path)?);
    let column_names: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    if column_names.is_empty() {
        return Err(DataLoadError::EmptyFile);
    }

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > column_names.len() {
            return Err(DataLoadError::Malformed(format!(
                "row {} has {} fields, header has {}",
                i + 1,
                record.len(),
                column_names.len()
            )));
        }
        records.push(record);
    }

    let column_types: Vec<ColumnType> = (0..column_names.len())
        .map(|col| ColumnType::infer(records.iter().filter_map(|r| r.get(col))))
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            column_names
                .iter()
                .zip(&column_types)
                .enumerate()
                .map(|(col, (name, ty))| {
                    let cell = record.get(col).map_or(CellValue::Null, |v| ty.parse(v));
                    (name.clone(), cell)
                })
                .collect::<RawRow>()
        })
        .collect();

    Ok(RawTable { column_names, rows })
}

/// Tokens read as a missing value in any column.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#NA", "<NA>", "N/A", "n/a", "NA", "NULL", "null", "NaN", "nan", "-NaN", "-nan",
    "None",
];

fn is_na(s: &str) -> bool {
    NA_TOKENS.contains(&s.trim())
}

/// The type shared by every non-missing cell of a CSV column. One text cell
/// makes the whole column text, so `"85"` next to `"85%"` stays `"85"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnType {
    /// Narrowest type that fits all non-missing values; an all-missing
    /// column is text.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ints = true;
        let mut floats = true;
        let mut bools = true;
        let mut seen = false;

        for raw in values.into_iter().filter(|v| !is_na(v)) {
            let v = raw.trim();
            seen = true;
            ints &= v.parse::<i64>().is_ok();
            floats &= v.parse::<f64>().is_ok();
            bools &= v == "true" || v == "false";
            if !(ints || floats || bools) {
                return ColumnType::Text;
            }
        }

        match (seen, ints, floats, bools) {
            (false, ..) => ColumnType::Text,
            (_, true, ..) => ColumnType::Integer,
            (_, _, true, _) => ColumnType::Float,
            (_, _, _, true) => ColumnType::Bool,
            _ => ColumnType::Text,
        }
    }

    /// Type one cell. Missing tokens and non-finite floats become null.
    pub fn parse(self, raw: &str) -> CellValue {
        if is_na(raw) {
            return CellValue::Null;
        }
        let v = raw.trim();
        match self {
            ColumnType::Integer => v.parse::<i64>().map_or(CellValue::Null, CellValue::Integer),
            ColumnType::Float => v
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map_or(CellValue::Null, CellValue::Float),
            ColumnType::Bool => CellValue::Bool(v == "true"),
            ColumnType::Text => CellValue::String(raw.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`).
/// Column order is first-seen order across all records.
fn load_json(path: &Path) -> Result<RawTable, DataLoadError> {
    let root: JsonValue = serde_json::from_reader(std::io::BufReader::new(open(path)?))?;

    let records = root
        .as_array()
        .ok_or_else(|| DataLoadError::Malformed("expected a top-level JSON array".into()))?;

    let mut column_names: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataLoadError::Malformed(format!("row {i} is not a JSON object")))?;

        let mut row = RawRow::new();
        for (key, val) in obj {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(RawTable { column_names, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat scalar columns (strings, ints, floats, bools).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable, DataLoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    if column_names.is_empty() {
        return Err(DataLoadError::EmptyFile);
    }

    let reader = builder.build()?;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        for row in 0..batch.num_rows() {
            let mut cells = RawRow::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                cells.insert(field.name().clone(), extract_cell(batch.column(col_idx), row));
            }
            rows.push(cells);
        }
    }

    Ok(RawTable { column_names, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => {
            log::debug!("Unsupported parquet column type {other:?}, reading as missing");
            CellValue::Null
        }
    }
}
