//! Dashboard view state management

use std::path::{Path, PathBuf};

use crate::canvas::{CanvasRenderer, DrawingSession};
use crate::recognition::ImageSource;
use crate::shared::RecognizedText;

/// Current view in the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardView {
    #[default]
    Scan,
    History,
    Details,
    Settings,
}

impl DashboardView {
    /// Views reachable from the sidebar
    pub const NAVIGATION: [DashboardView; 3] =
        [DashboardView::Scan, DashboardView::History, DashboardView::Settings];

    /// Get the display name for this view
    pub fn name(&self) -> &'static str {
        match self {
            DashboardView::Scan => "Scan",
            DashboardView::History => "History",
            DashboardView::Details => "Details",
            DashboardView::Settings => "Settings",
        }
    }

    /// Get the icon character for this view
    pub fn icon(&self) -> &'static str {
        match self {
            DashboardView::Scan => "S",
            DashboardView::History => "H",
            DashboardView::Details => "D",
            DashboardView::Settings => "C",
        }
    }

    /// Sidebar entry highlighted while this view is shown
    pub fn nav_parent(&self) -> DashboardView {
        match self {
            DashboardView::Details => DashboardView::History,
            other => *other,
        }
    }
}

/// Overall dashboard state
#[derive(Debug, Default)]
pub struct DashboardState {
    /// Current active view
    pub current_view: DashboardView,
    pub scan: ScanViewState,
    pub history: HistoryViewState,
    pub settings: SettingsViewState,
}

/// Input tab on the scan view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanTab {
    #[default]
    Camera,
    Drawing,
}

impl ScanTab {
    pub fn name(&self) -> &'static str {
        match self {
            ScanTab::Camera => "Camera",
            ScanTab::Drawing => "Drawing",
        }
    }

    /// Tab that submits images with `source`
    pub fn for_source(source: ImageSource) -> Self {
        match source {
            ImageSource::Camera => ScanTab::Camera,
            ImageSource::Drawing => ScanTab::Drawing,
        }
    }
}

/// Scan view state
#[derive(Debug)]
pub struct ScanViewState {
    pub tab: ScanTab,
    /// Path typed into the image field
    pub path_input: String,
    /// Image chosen on the camera tab
    pub selected_image: Option<PathBuf>,
    /// Strokes on the drawing tab
    pub drawing: DrawingSession,
    pub renderer: CanvasRenderer,
    /// Canvas size at the last frame, used for export
    pub canvas_size: (f32, f32),
    /// Snapshot exported from the drawing tab
    pub drawing_image: Option<PathBuf>,
    /// Text shown in the result panel
    pub result: Option<RecognizedText>,
}

impl Default for ScanViewState {
    fn default() -> Self {
        Self {
            tab: ScanTab::Camera,
            path_input: String::new(),
            selected_image: None,
            drawing: DrawingSession::new(),
            renderer: CanvasRenderer::default(),
            canvas_size: (0.0, 0.0),
            drawing_image: None,
            result: None,
        }
    }
}

impl ScanViewState {
    /// Switch input tab, dropping the other tab's image and the result
    pub fn switch_tab(&mut self, tab: ScanTab) {
        if self.tab == tab {
            return;
        }
        match self.tab {
            ScanTab::Camera => {
                self.selected_image = None;
                self.path_input.clear();
            }
            ScanTab::Drawing => {
                self.drawing.clear();
                self.drawing_image = None;
            }
        }
        self.result = None;
        self.tab = tab;
    }

    /// Use the image at `input` for the camera tab
    pub fn choose_image(&mut self, input: &str) -> Result<&Path, &'static str> {
        let path = PathBuf::from(input.trim());
        if input.trim().is_empty() || !path.is_file() {
            return Err("Invalid image path");
        }
        self.path_input = path.to_string_lossy().into_owned();
        self.result = None;
        let chosen = self.selected_image.insert(path);
        Ok(chosen.as_path())
    }

    /// Image the current tab would show
    pub fn current_image(&self) -> Option<&Path> {
        match self.tab {
            ScanTab::Camera => self.selected_image.as_deref(),
            ScanTab::Drawing => self.drawing_image.as_deref(),
        }
    }

    /// Show `result` if it belongs to the image still on screen
    ///
    /// A result that arrives after a tab switch or a new scan is dropped; it
    /// is already in the history. Returns true when the result is shown.
    pub fn accept_result(&mut self, result: RecognizedText) -> bool {
        if ScanTab::for_source(result.source) != self.tab
            || self.current_image() != Some(result.image_path.as_path())
        {
            return false;
        }
        self.result = Some(result);
        true
    }

    /// Start over on the current tab
    pub fn new_scan(&mut self) {
        self.result = None;
        match self.tab {
            ScanTab::Camera => {
                self.selected_image = None;
                self.path_input.clear();
            }
            ScanTab::Drawing => {
                self.drawing.clear();
                self.drawing_image = None;
            }
        }
    }
}

/// History view state
#[derive(Debug, Default)]
pub struct HistoryViewState {
    /// "Clear all" was pressed and awaits confirmation
    pub confirm_clear: bool,
}

/// Settings view state
#[derive(Debug, Default)]
pub struct SettingsViewState {
    /// Server URL being edited
    pub server_url_input: Option<String>,
    /// Whether there are unsaved changes
    pub has_unsaved_changes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Point;
    use tempfile::NamedTempFile;

    fn result(text: &str) -> RecognizedText {
        recognized(text, ImageSource::Camera, Path::new("/tmp/letter.png"))
    }

    fn recognized(text: &str, source: ImageSource, image: &Path) -> RecognizedText {
        RecognizedText {
            scan_id: "1".to_string(),
            text: text.to_string(),
            source,
            image_path: image.to_path_buf(),
        }
    }

    #[test]
    fn test_choose_image_rejects_missing_path() {
        let mut state = ScanViewState::default();
        assert_eq!(state.choose_image("/definitely/not/here.png"), Err("Invalid image path"));
        assert_eq!(state.choose_image("   "), Err("Invalid image path"));
        assert!(state.selected_image.is_none());
    }

    #[test]
    fn test_choose_image_accepts_file() {
        let file = NamedTempFile::new().unwrap();
        let mut state = ScanViewState::default();
        state.result = Some(result("old"));

        let chosen = state.choose_image(&file.path().to_string_lossy()).unwrap().to_path_buf();
        assert_eq!(chosen, file.path());
        assert_eq!(state.current_image(), Some(file.path()));
        assert!(state.result.is_none());
    }

    #[test]
    fn test_switch_tab_clears_other_tab() {
        let file = NamedTempFile::new().unwrap();
        let mut state = ScanViewState::default();
        state.choose_image(&file.path().to_string_lossy()).unwrap();
        state.result = Some(result("A"));

        state.switch_tab(ScanTab::Drawing);
        assert!(state.selected_image.is_none());
        assert!(state.result.is_none());

        state.drawing.begin_stroke(Point::new(1.0, 1.0));
        state.drawing.extend_stroke(Point::new(5.0, 5.0));
        state.drawing.end_stroke();
        state.drawing_image = Some(PathBuf::from("/tmp/snapshot.png"));

        state.switch_tab(ScanTab::Camera);
        assert!(state.drawing.is_empty());
        assert!(state.drawing_image.is_none());
    }

    #[test]
    fn test_switch_to_same_tab_keeps_state() {
        let mut state = ScanViewState::default();
        state.result = Some(result("A"));
        state.switch_tab(ScanTab::Camera);
        assert!(state.result.is_some());
    }

    #[test]
    fn test_result_shown_for_current_image() {
        let file = NamedTempFile::new().unwrap();
        let mut state = ScanViewState::default();
        state.choose_image(&file.path().to_string_lossy()).unwrap();

        assert!(state.accept_result(recognized("A", ImageSource::Camera, file.path())));
        assert_eq!(state.result.as_ref().map(|r| r.text.as_str()), Some("A"));
    }

    #[test]
    fn test_late_result_dropped_after_tab_switch() {
        let file = NamedTempFile::new().unwrap();
        let mut state = ScanViewState::default();
        state.choose_image(&file.path().to_string_lossy()).unwrap();
        state.switch_tab(ScanTab::Drawing);

        assert!(!state.accept_result(recognized("A", ImageSource::Camera, file.path())));
        assert!(state.result.is_none());
    }

    #[test]
    fn test_late_result_dropped_after_new_scan() {
        let snapshot = PathBuf::from("/tmp/snapshot_1.png");
        let mut state = ScanViewState::default();
        state.switch_tab(ScanTab::Drawing);
        state.drawing_image = Some(snapshot.clone());
        state.new_scan();

        assert!(!state.accept_result(recognized("7", ImageSource::Drawing, &snapshot)));
        assert!(state.result.is_none());
    }

    #[test]
    fn test_result_for_replaced_image_dropped() {
        let first = NamedTempFile::new().unwrap();
        let second = NamedTempFile::new().unwrap();
        let mut state = ScanViewState::default();
        state.choose_image(&first.path().to_string_lossy()).unwrap();
        state.choose_image(&second.path().to_string_lossy()).unwrap();

        assert!(!state.accept_result(recognized("A", ImageSource::Camera, first.path())));
        assert!(state.accept_result(recognized("B", ImageSource::Camera, second.path())));
    }

    #[test]
    fn test_details_highlights_history() {
        assert_eq!(DashboardView::Details.nav_parent(), DashboardView::History);
        assert_eq!(DashboardView::Settings.nav_parent(), DashboardView::Settings);
    }
}
