//! Dashboard application entry point

use eframe::egui;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

use crate::app::{self as coordinator, ServiceCoordinator};
use crate::dashboard::components::{render_banners, render_sidebar};
use crate::dashboard::state::{DashboardState, DashboardView};
use crate::dashboard::theme;
use crate::dashboard::views::{
    render_details_view, render_history_view, render_scan_view, render_settings_view,
};
use crate::shared::{ServiceCommand, SharedAppState};

/// The main dashboard application
pub struct DashboardApp {
    /// Shared application state
    shared_state: Arc<RwLock<SharedAppState>>,
    /// Dashboard-specific state
    dashboard_state: DashboardState,
    /// Runs service requests off the UI thread
    coordinator: ServiceCoordinator,
    /// Whether theme has been applied
    theme_applied: bool,
    /// Whether the startup health check was sent
    started: bool,
    /// Window focus at the previous frame
    was_focused: bool,
}

impl DashboardApp {
    /// Create a new dashboard application
    pub fn new(shared_state: Arc<RwLock<SharedAppState>>, coordinator: ServiceCoordinator) -> Self {
        Self {
            shared_state,
            dashboard_state: DashboardState::default(),
            coordinator,
            theme_applied: false,
            started: false,
            was_focused: true,
        }
    }

    /// Create eframe options for the dashboard window
    pub fn options() -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1000.0, 720.0])
                .with_min_inner_size([720.0, 520.0])
                .with_title("GlyphScan")
                .with_drag_and_drop(true),
            ..Default::default()
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme once
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        if !self.started {
            self.coordinator.set_repaint_context(ctx.clone());
            self.shared_state.write().runtime.request(ServiceCommand::CheckHealth);
            self.started = true;
        }

        self.handle_focus_change(ctx);

        // Process commands from UI and results from the service
        self.process_service_events();
        coordinator::process_commands(&mut self.shared_state.write(), &self.coordinator);

        self.save_settings_if_changed();

        let history_len = self.shared_state.read().history.len();

        // Sidebar panel
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .default_width(180.0)
            .show(ctx, |ui| {
                render_sidebar(ui, &mut self.dashboard_state.current_view, history_len);
            });

        // Main content panel
        egui::CentralPanel::default().show(ctx, |ui| {
            // Add padding around content
            egui::Frame::none()
                .inner_margin(24.0)
                .show(ui, |ui| {
                    render_banners(ui, &mut self.shared_state.write().runtime);

                    let navigate = match self.dashboard_state.current_view {
                        DashboardView::Scan => {
                            render_scan_view(ui, &mut self.dashboard_state.scan, &self.shared_state);
                            None
                        }
                        DashboardView::History => render_history_view(
                            ui,
                            &mut self.dashboard_state.history,
                            &self.shared_state,
                        ),
                        DashboardView::Details => render_details_view(ui, &self.shared_state),
                        DashboardView::Settings => {
                            render_settings_view(
                                ui,
                                &mut self.dashboard_state.settings,
                                &self.shared_state,
                            );
                            None
                        }
                    };

                    if let Some(view) = navigate {
                        self.dashboard_state.current_view = view;
                    }
                });
        });
    }
}

impl DashboardApp {
    /// Apply finished service work to the shared state
    fn process_service_events(&mut self) {
        let events = self.coordinator.try_events();
        if events.is_empty() {
            return;
        }

        let mut state = self.shared_state.write();
        for event in events {
            coordinator::apply_event(&mut state, event, coordinator::now_millis());
        }

        // Show the new result on the scan view
        if let Some(result) = state.runtime.last_recognition.take() {
            let scan_id = result.scan_id.clone();
            if !self.dashboard_state.scan.accept_result(result) {
                debug!("Scan {} finished after its image left the scan view", scan_id);
            }
        }
    }

    /// Re-read settings and service health when the window comes back
    fn handle_focus_change(&mut self, ctx: &egui::Context) {
        let focused = ctx.input(|i| i.viewport().focused).unwrap_or(true);
        if focused && !self.was_focused {
            info!("Window focused, refreshing settings and service status");
            let mut state = self.shared_state.write();
            if state.reload_config() {
                self.dashboard_state.settings.server_url_input = None;
            }
            state.runtime.request(ServiceCommand::CheckHealth);
        }
        self.was_focused = focused;
    }

    /// Write the config file after an edit in the settings view
    fn save_settings_if_changed(&mut self) {
        if self.dashboard_state.settings.has_unsaved_changes {
            self.shared_state.read().save_config();
            self.dashboard_state.settings.has_unsaved_changes = false;
        }
    }
}

/// Run the dashboard application
pub fn run_dashboard(
    shared_state: Arc<RwLock<SharedAppState>>,
    coordinator: ServiceCoordinator,
) -> Result<(), eframe::Error> {
    let app = DashboardApp::new(shared_state, coordinator);
    eframe::run_native(
        "GlyphScan",
        DashboardApp::options(),
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
}
