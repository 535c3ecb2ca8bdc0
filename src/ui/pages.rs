use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use super::{plot, table};
use crate::data::model::{AdmissionRecord, AssessmentRecord};
use crate::data::store::DataStore;
use crate::error::LoadError;
use crate::nav::{link, Route};
use crate::state::{
    detail_view, group_detail_view, rank_view, trend_view, AppState, Rows, Selection,
};

// ---------------------------------------------------------------------------
// Central panel – one function per page
// ---------------------------------------------------------------------------

/// Render the current page. A link clicked in a table is followed after
/// the page is drawn.
pub fn central_panel(ui: &mut Ui, state: &mut AppState, store: &DataStore) {
    let mut clicked: Option<String> = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.route {
            Route::Home => home(ui, &mut clicked),
            Route::GeneralRank => general_rank(ui, state, store, &mut clicked),
            Route::AssessmentRank => assessment_rank(ui, state, store, &mut clicked),
            Route::AssessmentDetail => assessment_detail(ui, state, store),
            Route::GeneralTrend => general_trend(ui, state, store),
        });

    if let Some(l) = clicked {
        state.navigate(&l);
    }
}

/// Fatal for the page: say which file is missing and draw nothing else.
fn missing_source(ui: &mut Ui, e: &LoadError) {
    let text = if e.is_not_found() {
        format!("错误：{e}")
    } else {
        format!("错误：数据文件无法读取。{e}")
    };
    ui.label(RichText::new(text).color(Color32::RED).strong());
}

fn no_match(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(Color32::from_rgb(200, 140, 0)));
}

/// `unresolved` is the university a link named but the data lacks.
fn notice(ui: &mut Ui, unresolved: &Option<String>) {
    if let Some(name) = unresolved {
        ui.label(
            RichText::new(format!("未找到链接中的院校“{name}”，已使用默认选择。"))
                .small()
                .weak(),
        );
    }
}

// ---------------------------------------------------------------------------
// Landing page
// ---------------------------------------------------------------------------

fn home(ui: &mut Ui, clicked: &mut Option<String>) {
    ui.heading("上海高考数据分析平台");
    ui.separator();
    ui.label("欢迎使用本平台！请通过左侧的导航栏选择您需要的功能。");
    ui.add_space(8.0);

    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].group(|ui: &mut Ui| {
            ui.strong("普通本科批次分析");
            ui.label("投档排名查询：根据您的预估排位，查找近三年普通批次中分数线相近的院校专业组。");
            ui.label("投档趋势分析：查看指定院校在近三年普通批次的投档分数和排位变化趋势。");
            for route in [Route::GeneralRank, Route::GeneralTrend] {
                if ui.link(route.title()).clicked() {
                    *clicked = Some(route.slug().to_string());
                }
            }
        });
        cols[1].group(|ui: &mut Ui| {
            ui.strong("综合评价批次分析");
            ui.label("综评排名查询：根据您的预估排位，查找综合评价批次中排位相近的专业。");
            ui.label("综评录取详情：查看指定院校在综合评价批次中，各专业的详细录取情况。");
            for route in [Route::AssessmentRank, Route::AssessmentDetail] {
                if ui.link(route.title()).clicked() {
                    *clicked = Some(route.slug().to_string());
                }
            }
        });
    });

    ui.add_space(8.0);
    ui.label(RichText::new("所有数据和分析仅供参考，请以官方发布为准。").weak());
}

// ---------------------------------------------------------------------------
// Rank search pages
// ---------------------------------------------------------------------------

fn general_rank(ui: &mut Ui, state: &AppState, store: &DataStore, clicked: &mut Option<String>) {
    let ds = match store.trend.get() {
        Ok(ds) => ds,
        Err(e) => return missing_source(ui, &e),
    };
    let Some(view) = rank_view(&ds, &state.general_rank) else {
        return no_match(ui, "数据中没有任何年份。");
    };

    let (lo, hi) = view.window;
    ui.heading(format!("{}年 排位 {lo} - {hi} 的院校专业组", view.year));

    let Rows::Found(matches) = &view.rows else {
        return no_match(ui, "在指定范围内未找到任何匹配的专业组。");
    };

    table::show(
        ui,
        "general_rank_table",
        &["院校名称", "专业组代码", "专业组名称", "投档分数", "投档排位", "排位差"],
        matches,
        |ui, m, col| {
            let r: &AdmissionRecord = m.row;
            match col {
                0 => {
                    if ui.link(&r.university).clicked() {
                        *clicked = Some(link(Route::GeneralTrend, &r.university));
                    }
                }
                1 => {
                    ui.label(&r.group_code);
                }
                2 => {
                    ui.label(&r.group_name);
                }
                3 => {
                    ui.label(r.score.to_string());
                }
                4 => {
                    ui.label(r.rank.to_string());
                }
                _ => {
                    ui.label(m.distance.to_string());
                }
            }
        },
    );

    ui.add_space(8.0);
    egui::CollapsingHeader::new("点击查看上述结果包含的专业列表")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            table::show(
                ui,
                "general_rank_majors",
                &["院校名称", "专业组名称", "专业列表"],
                matches,
                |ui, m, col| {
                    let text = match col {
                        0 => &m.row.university,
                        1 => &m.row.group_name,
                        _ => &m.row.major_list,
                    };
                    ui.label(text);
                },
            );
        });
}

fn assessment_rank(
    ui: &mut Ui,
    state: &AppState,
    store: &DataStore,
    clicked: &mut Option<String>,
) {
    let ds = match store.assessment.get() {
        Ok(ds) => ds,
        Err(e) => return missing_source(ui, &e),
    };
    let Some(view) = rank_view(&ds, &state.assessment_rank) else {
        return no_match(ui, "数据中没有任何年份。");
    };

    let (lo, hi) = view.window;
    ui.heading(format!("{}年综合评价排位 {lo} - {hi} 的院校专业", view.year));

    let Rows::Found(matches) = &view.rows else {
        return no_match(ui, "在指定范围内未找到任何匹配的专业。");
    };

    table::show(
        ui,
        "assessment_rank_table",
        &[
            "院校名称", "专业组代码", "专业组名称", "专业名称", "最低分", "最低分排位", "平均分",
            "平均分排位",
        ],
        matches,
        |ui, m, col| {
            let r: &AssessmentRecord = m.row;
            if col == 0 {
                if ui.link(&r.university).clicked() {
                    *clicked = Some(link(Route::AssessmentDetail, &r.university));
                }
                return;
            }
            let text = match col {
                1 => r.group_code.clone(),
                2 => r.group_name.clone(),
                3 => r.major_name.clone(),
                4 => table::opt(r.lowest_score),
                5 => table::opt(r.lowest_rank),
                6 => table::opt_score(r.average_score),
                _ => table::opt(r.average_rank),
            };
            ui.label(text);
        },
    );
}

// ---------------------------------------------------------------------------
// Assessment detail page
// ---------------------------------------------------------------------------

fn assessment_detail(ui: &mut Ui, state: &mut AppState, store: &DataStore) {
    let ds = match store.assessment.get() {
        Ok(ds) => ds,
        Err(e) => return missing_source(ui, &e),
    };
    if ds.is_empty() {
        return no_match(ui, "综合评价数据为空。");
    }

    let page = &mut state.assessment_detail;
    page.sync(&ds.universities);
    notice(ui, &page.notice);

    let Some(university) = page.selected.as_deref() else {
        return;
    };
    let year = ds.years.first().map(|y| format!("{y}年")).unwrap_or_default();
    ui.heading(format!("{university} {year}综合评价录取详情"));

    let Rows::Found(rows) = detail_view(&ds, university, None) else {
        ui.label(RichText::new("未找到该院校的综合评价数据。").color(Color32::RED));
        return;
    };

    table::show(
        ui,
        "assessment_detail_table",
        &[
            "专业组名称", "专业名称", "录取人数", "最高分", "最低分", "平均分", "最低分排位",
            "平均分排位",
        ],
        &rows,
        |ui, r, col| {
            let text = match col {
                0 => r.group_name.clone(),
                1 => r.major_name.clone(),
                2 => table::opt(r.enrollment),
                3 => table::opt(r.highest_score),
                4 => table::opt(r.lowest_score),
                5 => table::opt_score(r.average_score),
                6 => table::opt(r.lowest_rank),
                _ => table::opt(r.average_rank),
            };
            ui.label(text);
        },
    );
}

// ---------------------------------------------------------------------------
// General-track trend page
// ---------------------------------------------------------------------------

fn general_trend(ui: &mut Ui, state: &mut AppState, store: &DataStore) {
    let ds = match store.trend.get() {
        Ok(ds) => ds,
        Err(e) => return missing_source(ui, &e),
    };

    let page = &mut state.general_trend;
    page.sync(&ds.universities);
    notice(ui, &page.notice);

    let university = match page.selection(&ds.universities) {
        Selection::NoMatch => {
            ui.label(
                RichText::new(format!("未找到与 '{}' 相关的院校。", page.search_term))
                    .color(Color32::RED),
            );
            return;
        }
        Selection::NeedsChoice(c) => {
            ui.label(format!("找到 {} 个匹配项，请在左侧选择一所院校。", c.len()));
            return;
        }
        s => match s.university() {
            Some(u) => u,
            None => return,
        },
    };

    let view = trend_view(&ds, university);
    let year = view.latest_year.map(|y| y.to_string()).unwrap_or_default();

    ui.heading(format!("{university} 在{year}年的专业组列表"));
    let majors_header = format!("包含专业 ({year}年)");
    match &view.summary {
        Rows::Found(groups) => table::show(
            ui,
            "trend_groups",
            &["专业组名称", "专业组代码", majors_header.as_str()],
            groups,
            |ui, r, col| {
                let text = match col {
                    0 => &r.group_name,
                    1 => &r.group_code,
                    _ => &r.major_list,
                };
                ui.add(egui::Label::new(text.as_str()).wrap());
            },
        ),
        Rows::NoMatch => {
            ui.label(format!("未找到该校{year}年的专业组概览数据。"));
        }
    }

    ui.add_space(8.0);
    ui.heading(format!("{university} 投档趋势图表"));
    plot::trend_charts(ui, &view.series);

    // The per-major file is optional: without it the page still works.
    let details = match store.detail.get() {
        Ok(d) => d,
        Err(e) => {
            ui.separator();
            ui.label(
                RichText::new(format!("警告：{e}。将无法显示详细专业录取数据。"))
                    .color(Color32::from_rgb(200, 140, 0)),
            );
            return;
        }
    };

    ui.separator();
    ui.heading(format!("{year}年各专业录取详情 ({})", state.general_batch));

    let detail = group_detail_view(
        &details,
        university,
        &state.general_batch,
        page.group.as_deref(),
    );
    let Rows::Found(rows) = &detail.rows else {
        ui.label(format!(
            "该院校在{year}年{}批次下暂无详细专业录取数据。",
            state.general_batch
        ));
        return;
    };

    let mut group = detail.group.map(str::to_string);
    ui.horizontal(|ui: &mut Ui| {
        ui.label("请选择要查看的专业组：");
        egui::ComboBox::from_id_salt("trend_detail_group")
            .selected_text(group.clone().unwrap_or_default())
            .show_ui(ui, |ui: &mut Ui| {
                for g in &detail.groups {
                    if ui.selectable_label(group.as_deref() == Some(*g), *g).clicked() {
                        group = Some(g.to_string());
                    }
                }
            });
    });
    let changed = group.as_deref() != detail.group;

    table::show(
        ui,
        "trend_detail_table",
        &["专业名称", "招生人数", "最高分", "最低分", "平均分", "最低分排位", "平均分排位"],
        rows,
        |ui, r, col| {
            let text = match col {
                0 => r.major_name.clone(),
                1 => table::opt(r.enrollment),
                2 => table::opt(r.highest_score),
                3 => table::opt(r.lowest_score),
                4 => table::opt_score(r.average_score),
                5 => table::opt(r.lowest_rank),
                _ => table::opt(r.average_rank),
            };
            ui.label(text);
        },
    );

    if changed {
        page.group = group;
    }
}
