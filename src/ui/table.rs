use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

/// Height of a body row; tables are laid out at full height inside the
/// page's own scroll area.
const ROW_HEIGHT: f32 = 22.0;

/// Draw a striped table. `cell` renders column `col` of `row`.
pub fn show<R>(
    ui: &mut Ui,
    id: &str,
    headers: &[&str],
    rows: &[R],
    mut cell: impl FnMut(&mut Ui, &R, usize),
) {
    let n = headers.len();
    if n == 0 {
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(56.0).clip(true), n - 1)
            .column(Column::remainder().at_least(80.0))
            .header(ROW_HEIGHT, |mut header| {
                for h in headers {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*h);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let r = &rows[row.index()];
                    for col in 0..n {
                        row.col(|ui: &mut Ui| cell(ui, r, col));
                    }
                });
            });
    });
}

/// Text for an optional number; blank when missing.
pub fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

/// Averages print without a trailing `.0`.
pub fn opt_score(v: Option<f64>) -> String {
    match v {
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v:.1}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_formatting() {
        assert_eq!(opt(Some(12u32)), "12");
        assert_eq!(opt::<u32>(None), "");
        assert_eq!(opt_score(Some(601.0)), "601");
        assert_eq!(opt_score(Some(601.34)), "601.3");
        assert_eq!(opt_score(None), "");
    }
}
