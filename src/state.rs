use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::cache::TableCache;
use crate::data::filter::{
    default_constraints, earnings_ratio_bounds, filter_institutions, Constraints, FilterOutcome,
    RatioBounds,
};
use crate::data::model::{DatasetKind, InstitutionTable};
use crate::data::view;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Which dashboard the loaded file feeds.
    pub kind: DatasetKind,

    /// Upper cap of the earnings-to-price slider.
    pub ratio_cap: f64,

    /// Normalised tables by file, so filter changes never re-parse.
    cache: TableCache,

    /// Last file the user asked for.
    pub source: Option<PathBuf>,

    /// Loaded table (None until a file loads successfully).
    pub table: Option<Arc<InstitutionTable>>,

    /// Current filter inputs.
    pub constraints: Constraints,

    /// Earnings-to-price slider bounds (Hidden Gems only).
    pub ratio_bounds: Option<RatioBounds>,

    /// Matched / unmatched rows for the current constraints (cached).
    pub outcome: FilterOutcome,

    /// Marker colours for the loaded table.
    pub color_map: Option<ColorMap>,

    pub show_map: bool,

    /// Error message shown in the top bar.
    pub status_message: Option<String>,

    /// Non-fatal warning shown in the side panel.
    pub warning: Option<String>,
}

impl AppState {
    pub fn new(kind: DatasetKind, ratio_cap: f64) -> Self {
        Self {
            kind,
            ratio_cap,
            cache: TableCache::new(),
            source: None,
            table: None,
            constraints: Constraints::default(),
            ratio_bounds: None,
            outcome: FilterOutcome::default(),
            color_map: None,
            show_map: true,
            status_message: None,
            warning: None,
        }
    }

    /// Load (or fetch from cache) `path` for the current dashboard.
    /// A failure leaves no table loaded.
    pub fn load(&mut self, path: &Path) {
        self.source = Some(path.to_path_buf());
        match self.cache.get_or_load(path, self.kind) {
            Ok(table) => {
                log::info!("Loaded {} institutions from {}", table.len(), path.display());
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.clear_table();
                self.status_message = Some(format!("Error loading data: {e}"));
            }
        }
    }

    /// Switch dashboard, reloading the current file under the new schema.
    pub fn set_kind(&mut self, kind: DatasetKind) {
        if kind == self.kind {
            return;
        }
        self.kind = kind;
        match self.source.clone() {
            Some(path) => self.load(&path),
            None => self.clear_table(),
        }
    }

    /// Ingest a newly loaded table, initialise filters and colours.
    pub fn set_table(&mut self, table: Arc<InstitutionTable>) {
        let bounds = earnings_ratio_bounds(&table, self.ratio_cap);
        self.ratio_bounds = match table.kind {
            DatasetKind::HiddenGems => Some(bounds),
            DatasetKind::AccessibleExcellence => None,
        };
        self.warning = match self.ratio_bounds {
            Some(b) if !b.enabled => Some("No valid Earnings to Price Ratio data available.".into()),
            _ => None,
        };
        self.constraints = default_constraints(&table, bounds);
        self.color_map = Some(ColorMap::for_table(&table));
        self.table = Some(table);
        self.status_message = None;
        self.refilter();
    }

    fn clear_table(&mut self) {
        self.table = None;
        self.constraints = Constraints::default();
        self.ratio_bounds = None;
        self.outcome = FilterOutcome::default();
        self.color_map = None;
        self.warning = None;
    }

    /// Recompute `outcome` after a constraint change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.outcome = filter_institutions(table, &self.constraints);
        }
    }

    /// Back to the show-everything constraints of the loaded table.
    pub fn reset_filters(&mut self) {
        if let Some(table) = self.table.clone() {
            let bounds = self
                .ratio_bounds
                .unwrap_or_else(|| earnings_ratio_bounds(&table, self.ratio_cap));
            self.constraints = default_constraints(&table, bounds);
            self.refilter();
        }
    }

    /// Indices of matched rows that have coordinates.
    pub fn map_indices(&self) -> Vec<usize> {
        match &self.table {
            Some(table) => view::geo_subset(table, &self.outcome.matched),
            None => Vec::new(),
        }
    }

    /// Write the matched rows to `path`, reporting failure in the status bar.
    pub fn export_matched(&mut self, path: &Path) {
        let Some(table) = &self.table else {
            return;
        };
        if let Err(e) = view::export_csv(table, &self.outcome.matched, path) {
            log::error!("Export failed: {e:#}");
            self.status_message = Some(format!("Export failed: {e:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::filter::{NumericRange, DEFAULT_RATIO_CAP};
    use crate::data::model::InstitutionType;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const GEMS: &str = "\
Institution Name,Acceptance Rate 2022 (IPEDS),6 Year Grad Rate 2022 (IPEDS),Earnings-to-Price Ratio (Itzkowitz),Control of institution (IPEDS),Latitude,Longitude
Alpha College,30%,80%,,1,40.0,-75.0
Beta University,60%,70%,1.5,2,,
Gamma Institute,90%,60%,3.0,2,35.0,-80.0
";

    #[test]
    fn loading_shows_everything_then_filters() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "gems.csv", GEMS);
        let mut state = AppState::new(DatasetKind::HiddenGems, DEFAULT_RATIO_CAP);

        state.load(&path);
        assert!(state.table.is_some());
        assert!(state.status_message.is_none());
        assert_eq!(state.outcome.matched, vec![0, 1, 2]);
        assert_eq!(state.map_indices(), vec![0, 2]);
        assert_eq!(
            state.ratio_bounds.map(|b| b.range),
            Some(NumericRange::new(1.5, 3.0))
        );

        state.constraints.admission_rate = Some(NumericRange::new(0.0, 0.7));
        state.constraints.earnings_ratio = Some(NumericRange::new(1.0, 2.0));
        state.refilter();
        assert_eq!(state.outcome.matched, vec![0, 1]);
        assert_eq!(state.outcome.unmatched, vec![2]);
        assert_eq!(state.map_indices(), vec![0]);

        state.reset_filters();
        assert_eq!(state.outcome.matched.len(), 3);
    }

    #[test]
    fn mixed_percentage_column_uses_one_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "gems.csv",
            "Institution Name,Acceptance Rate 2022 (IPEDS),6 Year Grad Rate 2022 (IPEDS)\n\
             A,85%,70%\n\
             B,85,70%\n\
             C,0.5,70%\n",
        );
        let mut state = AppState::new(DatasetKind::HiddenGems, DEFAULT_RATIO_CAP);
        state.load(&path);

        let table = state.table.as_ref().unwrap();
        let rates: Vec<_> = table.records.iter().map(|r| r.admission_rate).collect();
        assert_eq!(rates, vec![Some(0.85), Some(0.85), Some(0.005)]);
        assert_eq!(state.outcome.matched, vec![0, 1, 2]);
    }

    #[test]
    fn infinite_ratios_do_not_stretch_the_slider() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "gems.csv",
            "Institution Name,Earnings-to-Price Ratio (Itzkowitz)\nA,-inf\nB,1.5\nC,inf\nD,3.0\n",
        );
        let mut state = AppState::new(DatasetKind::HiddenGems, DEFAULT_RATIO_CAP);
        state.load(&path);

        assert_eq!(
            state.ratio_bounds.map(|b| b.range),
            Some(NumericRange::new(1.5, 3.0))
        );
        let ratios: Vec<_> = state
            .table
            .as_ref()
            .unwrap()
            .records
            .iter()
            .map(|r| r.earnings_to_price)
            .collect();
        assert_eq!(ratios, vec![None, Some(1.5), None, Some(3.0)]);
    }

    #[test]
    fn short_rows_load_with_missing_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "gems.csv",
            "Institution Name,6 Year Grad Rate 2022 (IPEDS),Acceptance Rate 2022 (IPEDS),Latitude,Longitude\n\
             A,70%,55%,40.0,-75.0\n\
             B,70%,60%\n",
        );
        let mut state = AppState::new(DatasetKind::HiddenGems, DEFAULT_RATIO_CAP);
        state.load(&path);

        assert!(state.status_message.is_none());
        assert_eq!(state.outcome.matched, vec![0, 1]);
        assert_eq!(state.map_indices(), vec![0]);
    }

    #[test]
    fn load_failure_leaves_no_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "gems.csv", GEMS);
        let mut state = AppState::new(DatasetKind::HiddenGems, DEFAULT_RATIO_CAP);
        state.load(&path);

        state.load(&dir.path().join("missing.csv"));
        assert!(state.table.is_none());
        assert!(state.outcome.matched.is_empty());
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Error loading data")));
    }

    #[test]
    fn no_ratio_data_raises_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "gems.csv",
            "Institution Name,Acceptance Rate 2022 (IPEDS)\nAlpha,10%\n",
        );
        let mut state = AppState::new(DatasetKind::HiddenGems, DEFAULT_RATIO_CAP);
        state.load(&path);

        assert!(state.warning.is_some());
        assert_eq!(state.ratio_bounds.map(|b| b.enabled), Some(false));
    }

    #[test]
    fn excellence_category_selections() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "excellence.csv",
            "\
Institution Name,State abbreviation (HD2022),Control of institution (IPEDS),Fit Rating for Accessible Excellence List
North,PA,1,★★★
South,TX,2,★★☆
West,CA,2,★★★
",
        );
        let mut state = AppState::new(DatasetKind::AccessibleExcellence, DEFAULT_RATIO_CAP);
        state.load(&path);
        assert_eq!(state.outcome.matched, vec![0, 1, 2]);
        assert!(state.ratio_bounds.is_none());

        state.constraints.states.insert("TX".to_string());
        state.refilter();
        assert_eq!(state.outcome.matched, vec![1]);
        state.constraints.states.clear();
        state.refilter();
        assert_eq!(state.outcome.matched, vec![0, 1, 2]);

        if let Some(types) = state.constraints.institution_types.as_mut() {
            types.remove(&Some(InstitutionType::Private));
        }
        state.refilter();
        assert_eq!(state.outcome.matched, vec![0]);

        if let Some(ratings) = state.constraints.fit_ratings.as_mut() {
            ratings.remove(&Some("★★★".to_string()));
        }
        state.refilter();
        assert!(state.outcome.matched.is_empty());
        assert_eq!(state.outcome.unmatched, vec![0, 1, 2]);
    }

    #[test]
    fn switching_dashboard_reloads_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "gems.csv", GEMS);
        let mut state = AppState::new(DatasetKind::HiddenGems, DEFAULT_RATIO_CAP);
        state.load(&path);

        state.set_kind(DatasetKind::AccessibleExcellence);
        let table = state.table.as_ref().unwrap();
        assert_eq!(table.kind, DatasetKind::AccessibleExcellence);
        assert!(state.constraints.admission_rate.is_none());
        assert!(state.constraints.fit_ratings.is_some());
    }

    #[test]
    fn export_writes_matched_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "gems.csv", GEMS);
        let mut state = AppState::new(DatasetKind::HiddenGems, DEFAULT_RATIO_CAP);
        state.load(&path);
        state.constraints.name_substring = "beta".into();
        state.refilter();

        let out = dir.path().join("out.csv");
        state.export_matched(&out);
        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Beta University"));
    }
}
