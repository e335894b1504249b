use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the source file, before normalisation
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from CSV / JSON / Parquet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell. Strings are *not* parsed here; `NaN` and infinities count as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Text view of the cell: strings as-is, numbers rendered, null as `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Float(v) if v.is_nan() => None,
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – the file contents, column names untouched
// ---------------------------------------------------------------------------

/// A row is a map of column name → cell. Columns absent from a row are missing.
pub type RawRow = BTreeMap<String, CellValue>;

/// The unnormalised table exactly as it came out of the loader.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Header order of the source file.
    pub column_names: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.column_names.iter().any(|c| c == name)
    }
}

// ---------------------------------------------------------------------------
// Institution – one normalised row
// ---------------------------------------------------------------------------

/// Public / private control, derived from the coded `Control` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum InstitutionType {
    Public,
    Private,
}

impl InstitutionType {
    /// Map an IPEDS control code. Anything other than 1 or 2 is unmapped.
    pub fn from_code(code: f64) -> Option<Self> {
        if code == 1.0 {
            Some(InstitutionType::Public)
        } else if code == 2.0 {
            Some(InstitutionType::Private)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InstitutionType::Public => "Public",
            InstitutionType::Private => "Private",
        }
    }
}

impl fmt::Display for InstitutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single institution after normalisation. Never mutated once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Institution {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    /// Raw IPEDS control code.
    pub control: Option<f64>,
    pub institution_type: Option<InstitutionType>,
    /// Fractions in [0, 1].
    pub admission_rate: Option<f64>,
    pub graduation_rate: Option<f64>,
    pub yield_rate: Option<f64>,
    pub earnings_to_price: Option<f64>,
    /// Average net price over four years, in dollars.
    pub four_year_cost: Option<f64>,
    pub fit_rating: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Columns with no display name, kept under their source name
    /// (already coerced if they are a designated percentage column).
    pub extra: BTreeMap<String, CellValue>,
}

impl Institution {
    /// `(latitude, longitude)` when both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

// ---------------------------------------------------------------------------
// DatasetKind – which of the two dashboards a file feeds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum DatasetKind {
    /// Numeric thresholds: admission, graduation, earnings-to-price.
    HiddenGems,
    /// Categorical filters: fit rating, institution type, state.
    AccessibleExcellence,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 2] = [DatasetKind::HiddenGems, DatasetKind::AccessibleExcellence];

    pub fn title(self) -> &'static str {
        match self {
            DatasetKind::HiddenGems => "Hidden Gems Finder",
            DatasetKind::AccessibleExcellence => "Accessible Excellence Explorer",
        }
    }

    pub fn tagline(self) -> &'static str {
        match self {
            DatasetKind::HiddenGems => "Discover potential gem colleges across the United States.",
            DatasetKind::AccessibleExcellence => {
                "Explore institutions based on their Fit Rating for Accessible Excellence"
            }
        }
    }
}

// ---------------------------------------------------------------------------
// InstitutionTable – the complete normalised dataset
// ---------------------------------------------------------------------------

/// The normalised dataset with pre-computed category indices.
#[derive(Debug, Clone)]
pub struct InstitutionTable {
    pub kind: DatasetKind,
    pub records: Vec<Institution>,
    /// Column names after renaming, in source order (derived columns appended).
    pub column_names: Vec<String>,
    /// Sorted distinct non-missing states.
    pub states: BTreeSet<String>,
    /// Distinct fit ratings; `None` present if any record lacks one.
    pub fit_ratings: BTreeSet<Option<String>>,
    /// Distinct institution types; `None` present if any record is unmapped.
    pub institution_types: BTreeSet<Option<InstitutionType>>,
}

impl InstitutionTable {
    /// Build category indices from the normalised records.
    pub fn from_records(kind: DatasetKind, records: Vec<Institution>, column_names: Vec<String>) -> Self {
        let mut states = BTreeSet::new();
        let mut fit_ratings = BTreeSet::new();
        let mut institution_types = BTreeSet::new();

        for rec in &records {
            if let Some(state) = &rec.state {
                states.insert(state.clone());
            }
            fit_ratings.insert(rec.fit_rating.clone());
            institution_types.insert(rec.institution_type);
        }

        InstitutionTable {
            kind,
            records,
            column_names,
            states,
            fit_ratings,
            institution_types,
        }
    }

    /// Number of institutions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
