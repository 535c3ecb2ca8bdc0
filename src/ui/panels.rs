use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, Ui};

use crate::config::{RANK_STEP, TOLERANCE_MAX, TOLERANCE_MIN};
use crate::data::store::DataStore;
use crate::nav::Route;
use crate::state::{AppState, RankQuery, Selection};

/// Data actions requested from the top bar; the app owns the store.
pub enum DataAction {
    OpenFolder(PathBuf),
    Reload,
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &AppState, store: &DataStore) -> Option<DataAction> {
    let mut action = None;

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("数据", |ui: &mut Ui| {
            if ui.button("打开数据目录…").clicked() {
                action = pick_data_folder().map(DataAction::OpenFolder);
                ui.close_menu();
            }
            if ui.button("重新加载").clicked() {
                action = Some(DataAction::Reload);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.monospace(state.address());
        ui.separator();
        ui.label(format!("数据目录: {}", store.data_dir().display()));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    action
}

fn pick_data_folder() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("选择数据目录")
        .pick_folder()
}

// ---------------------------------------------------------------------------
// Left side panel – navigation and query controls
// ---------------------------------------------------------------------------

/// Render the page list followed by the current page's controls.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, store: &DataStore) {
    ui.heading("上海高考数据分析");
    ui.separator();

    for route in Route::ALL {
        if ui
            .selectable_label(state.route == route, route.title())
            .clicked()
        {
            state.route = route;
        }
    }

    ui.add_space(8.0);
    ui.heading("查询条件");
    ui.separator();

    match state.route {
        Route::Home => {
            ui.label("请选择上方的功能页面。");
        }
        Route::GeneralRank => {
            if let Ok(ds) = store.trend.get() {
                rank_controls(ui, "general_year", &mut state.general_rank, &ds.years);
                link_hint(ui);
            }
        }
        Route::AssessmentRank => {
            if let Ok(ds) = store.assessment.get() {
                rank_controls(ui, "assessment_year", &mut state.assessment_rank, &ds.years);
                link_hint(ui);
            }
        }
        Route::AssessmentDetail => {
            if let Ok(ds) = store.assessment.get() {
                let page = &mut state.assessment_detail;
                page.sync(&ds.universities);
                let mut selected = page.selected.clone();
                university_combo(ui, "assessment_university", "选择院校", &ds.universities, &mut selected);
                if selected != page.selected {
                    if let Some(u) = selected {
                        page.select(u);
                    }
                }
            }
        }
        Route::GeneralTrend => {
            if let Ok(ds) = store.trend.get() {
                trend_controls(ui, state, &ds.universities);
            }
        }
    }
}

fn link_hint(ui: &mut Ui) {
    ui.add_space(6.0);
    ui.label(
        RichText::new("在结果表格中点击院校名称，可跳转至该校的详细分析页面。")
            .small()
            .weak(),
    );
}

fn rank_controls(ui: &mut Ui, id: &str, query: &mut RankQuery, years: &[u16]) {
    let current = query.effective_year(years);

    ui.label("选择年份");
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.map(|y| y.to_string()).unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for &y in years {
                if ui.selectable_label(current == Some(y), y.to_string()).clicked() {
                    query.year = Some(y);
                }
            }
        });

    ui.add_space(4.0);
    ui.label("输入你的目标排位");
    ui.add(
        egui::DragValue::new(&mut query.target)
            .range(1..=u32::MAX)
            .speed(RANK_STEP as f64),
    );

    ui.add_space(4.0);
    ui.label("设置排位浮动范围 (±)");
    ui.add(
        egui::Slider::new(&mut query.tolerance, TOLERANCE_MIN..=TOLERANCE_MAX)
            .step_by(RANK_STEP as f64),
    );
}

fn university_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    options: &[impl AsRef<str>],
    selected: &mut Option<String>,
) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected.clone().unwrap_or_default())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for opt in options {
                let opt = opt.as_ref();
                if ui
                    .selectable_label(selected.as_deref() == Some(opt), opt)
                    .clicked()
                {
                    *selected = Some(opt.to_string());
                }
            }
        });
}

fn trend_controls(ui: &mut Ui, state: &mut AppState, universities: &[String]) {
    let page = &mut state.general_trend;
    page.sync(universities);

    ui.label("输入院校名称进行模糊查询");
    let mut term = page.search_term.clone();
    if ui
        .add(egui::TextEdit::singleline(&mut term).hint_text("部分或完整院校名称"))
        .changed()
    {
        page.set_search_term(term);
    }

    let selection = page.selection(universities);
    if let Selection::NeedsChoice(c) | Selection::Picked { candidates: c, .. } = &selection {
        ui.add_space(4.0);
        let mut picked = page.picked.clone();
        university_combo(
            ui,
            "trend_candidates",
            &format!("找到 {} 个匹配项，请选择一个查看：", c.len()),
            c,
            &mut picked,
        );
        page.pick(picked);
    }
}
