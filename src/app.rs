use eframe::egui;

use crate::config::AppConfig;
use crate::data::store::DataStore;
use crate::state::AppState;
use crate::ui::panels::{self, DataAction};
use crate::ui::pages;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GaokaoLensApp {
    pub config: AppConfig,
    pub store: DataStore,
    pub state: AppState,
}

impl GaokaoLensApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            store: DataStore::new(&config),
            state: AppState::new(&config),
            config,
        }
    }

    fn apply(&mut self, action: DataAction) {
        match action {
            DataAction::OpenFolder(dir) => {
                log::info!("Switching data directory to {}", dir.display());
                self.config.data_dir = dir;
                self.store = DataStore::new(&self.config);
            }
            DataAction::Reload => self.store.reload(),
        }
        self.state.status_message = None;
    }

    /// Surface a failed load of the current page's main source in the top bar.
    fn refresh_status(&mut self) {
        use crate::nav::Route;

        let err = match self.state.route {
            Route::GeneralRank | Route::GeneralTrend => self.store.trend.get().err(),
            Route::AssessmentRank | Route::AssessmentDetail => self.store.assessment.get().err(),
            Route::Home => None,
        };
        self.state.status_message = err.map(|e| e.to_string());
    }
}

impl eframe::App for GaokaoLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_status();

        // ---- Top panel: menu bar ----
        let action = egui::TopBottomPanel::top("top_bar")
            .show(ctx, |ui| panels::top_bar(ui, &self.state, &self.store))
            .inner;
        if let Some(action) = action {
            self.apply(action);
        }

        // ---- Left side panel: pages and query controls ----
        egui::SidePanel::left("query_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &self.store);
            });

        // ---- Central panel: tables and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            pages::central_panel(ui, &mut self.state, &self.store);
        });
    }
}
