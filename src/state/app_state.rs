use bevy::prelude::*;
use bevy_egui::egui;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use super::config::AppConfig;
use super::types::{ExportStatus, InspectorTab, PendingAction, Popup, ZOOM_LEVELS};
use crate::events::StudioEvent;
use crate::export::{ExportError, ExportNotice, ExportQueue, Submission};
use crate::grid::HitBoxId;
use crate::imaging::{decode_source, load_source_file, validate_files_length, ImageError};
use crate::model::ViewportState;
use crate::persist::{JsonFileStore, MemoryStore, PersistEvent, PersistRequest, PersistenceBridge, RecordStore, Section};
use crate::studio::{ClearOutcome, GridApply, Studio, StudioError};
use crate::watch::{SourceWatcher, WatchEvent};

#[derive(Resource)]
pub struct AppState {
    pub studio: Studio,
    pub config: AppConfig,
    pub persistence: PersistenceBridge,
    pub exports: ExportQueue,
    pub export_status: ExportStatus,

    // Live reload of the opened file
    pub source_path: Option<PathBuf>,
    pub watcher: Option<SourceWatcher>,

    // Dialogs
    pub popups: VecDeque<Popup>,
    pub pending_action: Option<PendingAction>,
    pub show_preview: bool,
    pub show_help: bool,
    pub inspector_tab: InspectorTab,

    // Text inputs (used where no native dialog exists)
    pub import_path: String,
    pub export_dir: String,

    // Status message
    pub status_message: Option<(String, std::time::Instant)>, // (message, when set)
    pub last_loaded_time: Option<std::time::Instant>,

    // Canvas interaction
    pub is_panning: bool, // True while the middle mouse is held
    pub pan_started_in_canvas: bool, // True if panning was initiated with mouse inside canvas
    pub needs_zoom_fit: bool, // True when zoom should auto-fit to the image

    // Loaded textures, rebuilt when the underlying pixels change
    pub source_texture: Option<egui::TextureHandle>,
    pub frame_textures: HashMap<HitBoxId, egui::TextureHandle>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let config = AppConfig::load();
        let store = open_store(&config);
        Self::with_store(config, store)
    }

    /// Build the state over an explicit record store and queue every load
    pub fn with_store(config: AppConfig, store: Box<dyn RecordStore>) -> Self {
        let mut persistence = PersistenceBridge::new(store);
        persistence.request_load_all();
        Self {
            studio: Studio::new(),
            config,
            persistence,
            exports: ExportQueue::new(),
            export_status: ExportStatus::Idle,
            source_path: None,
            watcher: None,
            popups: VecDeque::new(),
            pending_action: None,
            show_preview: true,
            show_help: false,
            inspector_tab: InspectorTab::Grid,
            import_path: String::new(),
            export_dir: String::new(),
            status_message: None,
            last_loaded_time: None,
            is_panning: false,
            pan_started_in_canvas: false,
            needs_zoom_fit: false,
            source_texture: None,
            frame_textures: HashMap::new(),
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), std::time::Instant::now()));
    }

    pub fn popup(&mut self, popup: Popup) {
        // Identical messages are not stacked
        if !self.popups.contains(&popup) {
            self.popups.push_back(popup);
        }
    }

    fn report(&mut self, error: StudioError) {
        let popup = match &error {
            StudioError::ViewportEmpty
            | StudioError::EmptyFrames
            | StudioError::TileSize(_)
            | StudioError::Timing(_) => Popup::warning(error.to_string()),
            StudioError::Image(image_error) => image_popup(image_error),
            StudioError::Export(export_error) => export_popup(export_error),
        };
        tracing::warn!("{error}");
        self.popup(popup);
    }

    // Image

    /// Files dropped or picked in one go; only a single image is accepted
    pub fn open_dropped(&mut self, paths: Vec<PathBuf>) {
        if let Err(e) = validate_files_length(paths.len()) {
            self.report(e.into());
            return;
        }
        if let Some(path) = paths.into_iter().next() {
            self.open_image(&path);
        }
    }

    pub fn open_image(&mut self, path: &Path) {
        let source = match load_source_file(path) {
            Ok(source) => source,
            Err(e) => {
                self.report(e.into());
                return;
            }
        };
        let name = source.name.clone();
        self.studio.load_image(source);
        self.source_path = Some(path.to_path_buf());
        self.last_loaded_time = Some(std::time::Instant::now());
        self.config.add_recent(&path.to_string_lossy());
        self.watch(path);
        self.set_status(format!("Opened {name}"));
    }

    fn watch(&mut self, path: &Path) {
        self.watcher = match SourceWatcher::watch(path) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(path = %path.display(), "live reload unavailable: {e}");
                None
            }
        };
    }

    /// Re-run the load flow with fresh bytes, keeping the file name
    pub fn reload_from_bytes(&mut self, bytes: &[u8]) {
        let name = self.studio.image().current_file_name.clone();
        match decode_source(&name, bytes) {
            Ok(source) => {
                self.studio.load_image(source);
                self.last_loaded_time = Some(std::time::Instant::now());
                self.set_status(format!("Reloaded {name}"));
            }
            Err(e) => self.report(e.into()),
        }
    }

    pub fn poll_watcher(&mut self) {
        let events = match &self.watcher {
            Some(watcher) => watcher.poll(),
            None => return,
        };
        for event in events {
            match event {
                WatchEvent::Reloaded { bytes, .. } => self.reload_from_bytes(&bytes),
                WatchEvent::Failed { error, .. } => self.report(error.into()),
            }
        }
    }

    // Grid

    pub fn apply_grid(&mut self, confirmed: bool) {
        match self.studio.apply_grid(confirmed) {
            Ok(GridApply::Applied) => self.request_save(Section::GridLayout),
            Ok(GridApply::NeedsConfirmation) => self.pending_action = Some(PendingAction::RecreateGrid),
            Err(e) => self.report(e),
        }
    }

    pub fn clear(&mut self) {
        match self.studio.clear() {
            Ok(ClearOutcome::Cleared) => {
                if self.studio.clear_options().viewport {
                    self.source_path = None;
                    self.watcher = None;
                }
                self.set_status("Cleared");
            }
            Ok(ClearOutcome::NothingToClear) => self.popup(Popup::info("Nothing to clear!")),
            Err(e) => self.report(e),
        }
    }

    // Export

    /// Directory exports go to: the typed one, else beside the source image
    pub fn export_target_dir(&self) -> PathBuf {
        let typed = self.export_dir.trim();
        if !typed.is_empty() {
            return PathBuf::from(typed);
        }
        self.source_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn export(&mut self) {
        let job = match self
            .studio
            .export_job(self.export_target_dir(), PathBuf::from(&self.config.ffmpeg_path))
        {
            Ok(job) => job,
            Err(e) => {
                self.report(e);
                return;
            }
        };
        match self.exports.submit(job) {
            Ok(Submission::Started) => self.export_status = ExportStatus::Running("Starting".to_string()),
            Ok(Submission::AwaitingConfirmation(paths)) => {
                self.pending_action = Some(PendingAction::OverwriteExport { paths });
            }
            Err(e) => self.report(e.into()),
        }
    }

    /// Answer the overwrite question for the waiting export
    pub fn confirm_overwrite(&mut self, overwrite: bool) {
        match self.exports.reply(overwrite) {
            Ok(true) => self.export_status = ExportStatus::Running("Starting".to_string()),
            Ok(false) => self.set_status("Export cancelled"),
            Err(e) => self.report(e.into()),
        }
    }

    pub fn poll_exports(&mut self) {
        for notice in self.exports.poll() {
            match notice {
                ExportNotice::Progress(stage) => self.export_status = ExportStatus::Running(stage),
                ExportNotice::Completed(summary) => {
                    self.set_status(summary.clone());
                    self.export_status = ExportStatus::Done(summary);
                }
                ExportNotice::Failed(e) => {
                    self.export_status = ExportStatus::Idle;
                    self.report(e.into());
                }
            }
        }
    }

    // Persistence

    /// Save a section once its stored value has been read
    pub fn request_save(&mut self, section: Section) {
        if self.persistence.is_loaded(section) {
            self.persistence.request(PersistRequest::Save(section));
        }
    }

    pub fn process_persistence(&mut self) {
        if !self.persistence.has_pending() {
            return;
        }
        for event in self.persistence.process(&mut self.studio) {
            match event {
                PersistEvent::Failed { section, message } => {
                    self.popup(Popup::error(format!("Could not access {} record: {message}", section.key())));
                }
                PersistEvent::Updated(section) => tracing::debug!(key = section.key(), "record applied"),
                _ => {}
            }
        }
    }

    /// React to what the studio did since the last frame
    pub fn drain_studio_events(&mut self) {
        for event in self.studio.drain_events() {
            match event {
                StudioEvent::ImageLoaded => {
                    self.source_texture = None;
                    self.frame_textures.clear();
                    if self.studio.viewport() == &ViewportState::default() {
                        self.needs_zoom_fit = true;
                    }
                }
                StudioEvent::ImageCleared => {
                    self.source_texture = None;
                    self.frame_textures.clear();
                }
                StudioEvent::FrameRemoved { id, .. } => {
                    self.frame_textures.remove(&id);
                }
                StudioEvent::FramesCleared => self.frame_textures.clear(),
                StudioEvent::SettingsUpdated => {
                    // Texture filtering follows the pixelated setting
                    self.source_texture = None;
                    self.frame_textures.clear();
                    self.request_save(Section::Settings);
                }
                StudioEvent::GridSettingsUpdated => {
                    self.request_save(Section::GridLayout);
                    self.request_save(Section::GridAppearance);
                }
                StudioEvent::PreviewSettingsUpdated => self.request_save(Section::Preview),
                StudioEvent::AnimationControlsUpdated => self.request_save(Section::AnimationControls),
                StudioEvent::MenuAlignmentUpdated => self.request_save(Section::MenuAlignment),
                StudioEvent::Warning(warning) => self.popup(Popup::warning(warning.message())),
                StudioEvent::GridCreated
                | StudioEvent::GridDestroyed
                | StudioEvent::AreaSelected { .. }
                | StudioEvent::AreaDeselected { .. }
                | StudioEvent::AreaClicked { .. }
                | StudioEvent::FrameCreated { .. }
                | StudioEvent::FrameClicked { .. } => {}
            }
        }
    }

    // Viewport camera

    pub fn zoom_level(&self) -> f32 {
        self.studio.viewport().zoom
    }

    pub fn set_zoom_level(&mut self, zoom: f32) {
        let mut viewport = self.studio.viewport().clone();
        viewport.zoom = zoom;
        self.studio.set_viewport_camera(viewport);
    }

    pub fn canvas_offset(&self) -> (f32, f32) {
        let pan = self.studio.viewport().pan;
        (pan.x, pan.y)
    }

    pub fn set_canvas_offset(&mut self, offset: (f32, f32)) {
        let mut viewport = self.studio.viewport().clone();
        viewport.pan.x = offset.0;
        viewport.pan.y = offset.1;
        self.studio.set_viewport_camera(viewport);
    }

    pub fn zoom_in(&mut self) {
        // Find next higher zoom level
        let current = self.zoom_level();
        if let Some(level) = ZOOM_LEVELS.iter().copied().find(|level| *level > current) {
            self.set_zoom_level(level);
        }
    }

    pub fn zoom_out(&mut self) {
        // Find next lower zoom level
        let current = self.zoom_level();
        if let Some(level) = ZOOM_LEVELS.iter().rev().copied().find(|level| *level < current) {
            self.set_zoom_level(level);
        }
    }

    pub fn time_since_load(&self) -> Option<std::time::Duration> {
        self.last_loaded_time.map(|t| t.elapsed())
    }
}

fn open_store(config: &AppConfig) -> Box<dyn RecordStore> {
    let Some(path) = config.records_path() else {
        tracing::warn!("no config directory, settings will not persist");
        return Box::new(MemoryStore::new());
    };
    match JsonFileStore::open(&path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(path = %path.display(), "record store unavailable, settings will not persist: {e}");
            Box::new(MemoryStore::new())
        }
    }
}

fn image_popup(error: &ImageError) -> Popup {
    match error {
        ImageError::UnsupportedFileType(_) | ImageError::MultipleFiles(_) => Popup::warning(error.to_string()),
        _ => Popup::error(error.to_string()),
    }
}

fn export_popup(error: &ExportError) -> Popup {
    match error {
        ExportError::ToolMissing | ExportError::EmptyFrames | ExportError::Busy => Popup::warning(error.to_string()),
        _ => Popup::error(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Pan;
    use crate::state::types::PopupKind;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn state() -> AppState {
        let mut state = AppState::with_store(AppConfig::default(), Box::new(MemoryStore::new()));
        state.process_persistence();
        state
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_multiple_dropped_files_warn() {
        let mut state = state();
        state.open_dropped(vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
        assert_eq!(state.popups.len(), 1);
        assert_eq!(state.popups[0].kind, PopupKind::Warning);
        assert!(!state.studio.image().is_loaded());
    }

    #[test]
    fn test_unsupported_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let mut state = state();
        state.open_dropped(vec![path]);
        assert_eq!(state.popups.len(), 1);
        assert_eq!(state.popups[0].kind, PopupKind::Warning);
    }

    #[test]
    fn test_reload_keeps_file_name() {
        let mut state = state();
        state.studio.load_image(decode_source("walk.png", &png_bytes(32, 32)).unwrap());
        state.reload_from_bytes(&png_bytes(32, 32));

        let image = state.studio.image();
        assert_eq!(image.current_file_name, "walk.png");
        assert!(image.is_same_image_reloaded());
    }

    #[test]
    fn test_grid_recreate_asks_when_frames_exist() {
        let mut state = state();
        state.studio.load_image(decode_source("walk.png", &png_bytes(32, 32)).unwrap());
        state.apply_grid(false);
        state.studio.select_all();
        state.apply_grid(false);
        assert_eq!(state.pending_action, Some(PendingAction::RecreateGrid));

        state.apply_grid(true);
        assert!(state.studio.frames().is_empty());
    }

    #[test]
    fn test_export_without_frames_warns() {
        let mut state = state();
        state.studio.load_image(decode_source("walk.png", &png_bytes(16, 16)).unwrap());
        state.export();
        assert_eq!(state.popups.len(), 1);
        assert_eq!(state.popups[0].kind, PopupKind::Warning);
    }

    #[test]
    fn test_nothing_to_clear_is_info() {
        let mut state = state();
        state.clear();
        assert_eq!(state.popups[0], Popup::info("Nothing to clear!"));
    }

    #[test]
    fn test_settings_change_is_saved_after_load() {
        let mut state = state();
        state.studio.set_menu_alignment(crate::model::MenuAlignment::Left);
        state.drain_studio_events();
        assert!(state.persistence.has_pending());
        state.process_persistence();
        assert!(!state.persistence.has_pending());
    }

    #[test]
    fn test_no_save_before_load() {
        let mut state = AppState::with_store(AppConfig::default(), Box::new(MemoryStore::new()));
        state.request_save(Section::Settings);
        // Only the queued loads are pending
        let events = state.persistence.process(&mut state.studio);
        assert!(events.iter().all(|e| !matches!(e, PersistEvent::Saved(_))));
    }

    #[test]
    fn test_zoom_steps_through_levels() {
        let mut state = state();
        state.set_zoom_level(4.0);
        state.zoom_in();
        assert_eq!(state.zoom_level(), 6.0);
        state.zoom_out();
        state.zoom_out();
        assert_eq!(state.zoom_level(), 3.0);
        state.set_canvas_offset((5.0, -2.0));
        assert_eq!(state.studio.viewport().pan, Pan { x: 5.0, y: -2.0 });
    }

    #[test]
    fn test_duplicate_popups_collapse() {
        let mut state = state();
        state.popup(Popup::warning("same"));
        state.popup(Popup::warning("same"));
        assert_eq!(state.popups.len(), 1);
    }
}
