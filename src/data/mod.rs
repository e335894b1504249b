/// Data layer: core types, loading, normalising and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (source column names, typed cells)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  % / $ / numeric coercion, rename, derive Institution Type
///   └───────────┘
///        │            (memoised per file by `cache`)
///        ▼
///   ┌─────────────────┐
///   │ InstitutionTable │  Vec<Institution>, category indices
///   └─────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  Constraints → matched / unmatched indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   view    │  display-column rows, geo subset, CSV export
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod stats;
pub mod view;
