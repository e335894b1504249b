use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{DatasetKind, Institution, InstitutionTable};
use crate::data::view::{columns_for, ExcellenceRow, GemsRow};

// ---------------------------------------------------------------------------
// Display formatting
// ---------------------------------------------------------------------------

/// `0.85` → `"85%"`; missing → empty.
pub fn format_percent(v: Option<f64>) -> String {
    v.map(|v| format!("{:.0}%", v * 100.0)).unwrap_or_default()
}

/// Two decimals; missing → empty.
pub fn format_ratio(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_default()
}

/// `12345.4` → `"$12,345"`; missing → empty.
pub fn format_currency(v: Option<f64>) -> String {
    let Some(v) = v else {
        return String::new();
    };
    let digits = format!("{:.0}", v.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if v < 0.0 && digits != "0" { "-" } else { "" };
    format!("{sign}${grouped}")
}

fn text(v: Option<&str>) -> String {
    v.unwrap_or_default().to_string()
}

/// Formatted cells of one record, in `columns_for(kind)` order.
pub fn row_cells(kind: DatasetKind, rec: &Institution) -> Vec<String> {
    match kind {
        DatasetKind::HiddenGems => {
            let row = GemsRow::from(rec);
            vec![
                text(row.name),
                text(row.city),
                text(row.state),
                row.institution_type.map(|t| t.to_string()).unwrap_or_default(),
                format_percent(row.admission_rate),
                format_ratio(row.earnings_to_price),
                format_percent(row.graduation_rate),
                format_currency(row.four_year_cost),
                format_percent(row.yield_rate),
            ]
        }
        DatasetKind::AccessibleExcellence => {
            let row = ExcellenceRow::from(rec);
            vec![
                text(row.name),
                text(row.city),
                text(row.state),
                row.institution_type.map(|t| t.to_string()).unwrap_or_default(),
                text(row.fit_rating),
                row.latitude.map(|v| format!("{v:.4}")).unwrap_or_default(),
                row.longitude.map(|v| format!("{v:.4}")).unwrap_or_default(),
            ]
        }
    }
}

// ---------------------------------------------------------------------------
// Table widget
// ---------------------------------------------------------------------------

/// Render the rows at `indices` with the dashboard's display columns.
pub fn institution_table(ui: &mut Ui, id_salt: &str, table: &InstitutionTable, indices: &[usize]) {
    if indices.is_empty() {
        ui.label("No rows.");
        return;
    }

    let columns = columns_for(table.kind);
    ui.push_id(id_salt, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::initial(240.0).at_least(80.0).clip(true))
            .columns(Column::auto().at_least(60.0), columns.len() - 1)
            .min_scrolled_height(0.0)
            .max_scroll_height(400.0)
            .header(20.0, |mut header| {
                for col in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*col);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, indices.len(), |mut row| {
                    let rec = &table.records[indices[row.index()]];
                    for cell in row_cells(table.kind, rec) {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::InstitutionType;

    #[test]
    fn formats_percentages_ratios_and_currency() {
        assert_eq!(format_percent(Some(0.85)), "85%");
        assert_eq!(format_percent(None), "");
        assert_eq!(format_ratio(Some(1.456)), "1.46");
        assert_eq!(format_currency(Some(12345.0)), "$12,345");
        assert_eq!(format_currency(Some(999.0)), "$999");
        assert_eq!(format_currency(Some(1_234_567.4)), "$1,234,567");
        assert_eq!(format_currency(Some(0.0)), "$0");
        assert_eq!(format_currency(Some(-1500.0)), "-$1,500");
        assert_eq!(format_currency(None), "");
    }

    #[test]
    fn cells_follow_column_order() {
        let rec = Institution {
            name: Some("Penn State University".into()),
            state: Some("PA".into()),
            institution_type: Some(InstitutionType::Public),
            admission_rate: Some(0.55),
            four_year_cost: Some(98120.0),
            fit_rating: Some("★★★".into()),
            ..Default::default()
        };

        let gems = row_cells(DatasetKind::HiddenGems, &rec);
        assert_eq!(gems.len(), columns_for(DatasetKind::HiddenGems).len());
        assert_eq!(gems[3], "Public");
        assert_eq!(gems[4], "55%");
        assert_eq!(gems[7], "$98,120");

        let excellence = row_cells(DatasetKind::AccessibleExcellence, &rec);
        assert_eq!(excellence.len(), columns_for(DatasetKind::AccessibleExcellence).len());
        assert_eq!(excellence[4], "★★★");
        assert_eq!(excellence[5], "");
    }
}
