//! Status card component for the recognition service

use egui::{Color32, RichText, Vec2};
use crate::dashboard::theme::{card_frame, ThemeColors};
use crate::shared::{Readiness, RuntimeState};

/// A card displaying status information
pub struct StatusCard {
    pub title: String,
    pub value: String,
    pub status: CardStatus,
}

/// Status types for cards
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardStatus {
    Ready,
    Busy,
    NotLoaded,
    Offline,
}

impl CardStatus {
    /// Status of the service as last reported
    pub fn from_runtime(runtime: &RuntimeState, readiness: Readiness) -> Self {
        match readiness {
            Readiness::Ready(_) => CardStatus::Ready,
            Readiness::Loading(_) => CardStatus::Busy,
            Readiness::NotLoaded(_) if runtime.service.reachable => CardStatus::NotLoaded,
            Readiness::NotLoaded(_) => CardStatus::Offline,
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            CardStatus::Ready => ThemeColors::STATUS_RUNNING,
            CardStatus::Busy => ThemeColors::ACCENT_WARNING,
            CardStatus::NotLoaded => ThemeColors::STATUS_STOPPED,
            CardStatus::Offline => ThemeColors::STATUS_ERROR,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardStatus::Ready => "Ready",
            CardStatus::Busy => "Loading",
            CardStatus::NotLoaded => "No model",
            CardStatus::Offline => "Unreachable",
        }
    }
}

impl StatusCard {
    pub fn new(title: impl Into<String>, value: impl Into<String>, status: CardStatus) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            status,
        }
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        card_frame().show(ui, |ui| {
            ui.set_min_width(180.0);

            ui.horizontal(|ui| {
                // Status indicator dot
                let dot_center = ui.cursor().left_top() + Vec2::new(6.0, 10.0);
                ui.painter().circle_filled(dot_center, 4.0, self.status.color());
                ui.add_space(16.0);

                ui.vertical(|ui| {
                    ui.label(
                        RichText::new(&self.title)
                            .size(12.0)
                            .color(ThemeColors::TEXT_MUTED)
                    );
                    ui.add_space(4.0);
                    ui.label(
                        RichText::new(&self.value)
                            .size(18.0)
                            .color(ThemeColors::TEXT_PRIMARY)
                            .strong()
                    );
                    ui.add_space(4.0);
                    ui.label(
                        RichText::new(self.status.label())
                            .size(11.0)
                            .color(self.status.color())
                    );
                });
            });
        });
    }
}
