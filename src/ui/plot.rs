use eframe::egui::{RichText, Ui};
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::GroupColors;
use crate::data::trend::{GroupedSeries, TrendPoint};

// ---------------------------------------------------------------------------
// Trend charts (score and rank by year)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    Score,
    Rank,
}

impl Metric {
    fn title(self) -> &'static str {
        match self {
            Metric::Score => "投档分数线变化趋势",
            Metric::Rank => "投档排位变化趋势",
        }
    }

    fn axis_label(self) -> &'static str {
        match self {
            Metric::Score => "投档分数",
            Metric::Rank => "投档排位 (越低越靠前)",
        }
    }

    /// Plotted y value. Ranks are negated so better ranks sit higher.
    fn y(self, p: &TrendPoint) -> f64 {
        match self {
            Metric::Score => f64::from(p.score),
            Metric::Rank => -f64::from(p.rank),
        }
    }

    /// Axis / hover text for a plotted y value.
    fn display(self, y: f64) -> String {
        match self {
            Metric::Score => format!("{y:.0}"),
            Metric::Rank => format!("{:.0}", -y),
        }
    }
}

/// Two side-by-side charts, one line per group, same colour in both.
pub fn trend_charts(ui: &mut Ui, series: &GroupedSeries) {
    let colors = GroupColors::new(series.keys());
    ui.columns(2, |cols: &mut [Ui]| {
        metric_plot(&mut cols[0], series, &colors, Metric::Score);
        metric_plot(&mut cols[1], series, &colors, Metric::Rank);
    });
}

fn metric_plot(ui: &mut Ui, series: &GroupedSeries, colors: &GroupColors, metric: Metric) {
    ui.label(RichText::new(metric.title()).strong());

    let id = match metric {
        Metric::Score => "score_plot",
        Metric::Rank => "rank_plot",
    };

    let hover_series = series.clone();
    Plot::new(id)
        .legend(Legend::default())
        .height(320.0)
        .y_axis_label(metric.axis_label())
        .x_axis_formatter(|mark: GridMark, _range| year_tick(mark.value))
        .y_axis_formatter(move |mark: GridMark, _range| metric.display(mark.value))
        .label_formatter(move |name, value| {
            if let Some(text) = hover_text(&hover_series, name, value.x) {
                return text;
            }
            let year = year_tick(value.x);
            if name.is_empty() {
                format!("{year}\n{}", metric.display(value.y))
            } else {
                format!("{name}\n{year}: {}", metric.display(value.y))
            }
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (group, points) in series {
                let color = colors.color_for(group);
                let xy: Vec<[f64; 2]> = points
                    .iter()
                    .map(|p| [f64::from(p.year), metric.y(p)])
                    .collect();

                plot_ui.line(
                    Line::new(PlotPoints::from(xy.clone()))
                        .name(group)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(xy))
                        .name(group)
                        .color(color)
                        .radius(4.0),
                );
            }
        });
}

/// Everything known about the point of `group` at year `x`; `None` when the
/// pointer is not on one of the group's points.
fn hover_text(series: &GroupedSeries, group: &str, x: f64) -> Option<String> {
    let year = x.round();
    if (x - year).abs() > 1e-6 {
        return None;
    }
    let p = series
        .get(group)?
        .iter()
        .find(|p| f64::from(p.year) == year)?;
    Some(format!(
        "{group}\n年份: {}\n投档分数: {}\n投档排位: {}\n专业组代码: {}",
        p.year, p.score, p.rank, p.group_code
    ))
}

/// Only whole years get a tick label.
fn year_tick(x: f64) -> String {
    if (x - x.round()).abs() < 1e-6 {
        format!("{:.0}", x.round())
    } else {
        String::new()
    }
}
