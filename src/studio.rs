//! The owning controller: every piece of slicer state and the routing
//! between grid selection, frames and playback.

use std::path::PathBuf;

use image::RgbaImage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::events::{StudioEvent, Warning};
use crate::export::naming::resolve_name_tags;
use crate::export::{ExportError, ExportJob};
use crate::frames::{FrameCollection, FrameEvent};
use crate::grid::{
    build_hit_boxes, grid_lines, GridLines, HitBox, HitBoxId, HitBoxSelector, InvalidTileSize, SelectionModifiers,
    SelectorEvent,
};
use crate::imaging::{ImageError, SourceImage};
use crate::model::{
    AnimationControls, ClearOptions, ExportConfig, ExportKind, Grid, GridAppearance, ImageInfo, InvalidTiming,
    MenuAlignment, MenuWindowAlignment, Pan, PreviewState, Remember, Settings, StateKind, ViewportState,
    DEFAULT_EXPORT_FILE_NAME,
};
use crate::persist::{merge_known_keys, Section, SectionState};
use crate::preview::Animator;

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error("The viewport is empty!")]
    ViewportEmpty,

    #[error("At least one frame is required. The frame list is empty!")]
    EmptyFrames,

    #[error(transparent)]
    TileSize(#[from] InvalidTileSize),

    #[error(transparent)]
    Timing(#[from] InvalidTiming),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridApply {
    Applied,
    /// Frames exist and would be lost; call again with `confirmed`
    NeedsConfirmation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    NothingToClear,
}

#[derive(Debug, Default)]
pub struct Studio {
    image: ImageInfo,
    source: Option<RgbaImage>,
    grid: Grid,
    selector: HitBoxSelector,
    frames: FrameCollection,
    controls: AnimationControls,
    animator: Animator,
    preview: PreviewState,
    viewport: ViewportState,
    export: ExportConfig,
    settings: Settings,
    remember: Remember,
    clear: ClearOptions,
    menu_alignment: MenuWindowAlignment,
    events: Vec<StudioEvent>,
}

impl Studio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> &ImageInfo {
        &self.image
    }

    pub fn source(&self) -> Option<&RgbaImage> {
        self.source.as_ref()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn selector(&self) -> &HitBoxSelector {
        &self.selector
    }

    pub fn frames(&self) -> &FrameCollection {
        &self.frames
    }

    pub fn controls(&self) -> &AnimationControls {
        &self.controls
    }

    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn export_config(&self) -> &ExportConfig {
        &self.export
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn remember(&self) -> &Remember {
        &self.remember
    }

    pub fn clear_options(&self) -> &ClearOptions {
        &self.clear
    }

    pub fn menu_alignment(&self) -> MenuAlignment {
        self.menu_alignment.align
    }

    pub fn active_hit_box(&self) -> Option<HitBoxId> {
        self.selector.active()
    }

    /// Overlay lines of the grid as it was last built
    pub fn grid_lines(&self) -> GridLines {
        if !self.selector.has_grid() {
            return GridLines::default();
        }
        let layout = &self.grid.layout;
        grid_lines(layout.prev_width, layout.prev_height, self.image.width, self.image.height)
    }

    /// Events since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<StudioEvent> {
        std::mem::take(&mut self.events)
    }

    // Presentational state

    pub fn set_grid_appearance(&mut self, appearance: GridAppearance) {
        self.grid.appearance = appearance;
        self.events.push(StudioEvent::GridSettingsUpdated);
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.events.push(StudioEvent::SettingsUpdated);
    }

    pub fn set_export_config(&mut self, export: ExportConfig) {
        self.export = export;
    }

    pub fn set_remember(&mut self, remember: Remember) {
        self.remember = remember;
    }

    pub fn set_clear_options(&mut self, clear: ClearOptions) {
        self.clear = clear;
    }

    pub fn set_menu_alignment(&mut self, align: MenuAlignment) {
        self.menu_alignment.align = align;
        self.events.push(StudioEvent::MenuAlignmentUpdated);
    }

    pub fn set_preview_camera(&mut self, zoom: f32, pan: Pan) {
        self.preview.zoom = zoom;
        self.preview.pan = pan;
        self.events.push(StudioEvent::PreviewSettingsUpdated);
    }

    pub fn set_viewport_camera(&mut self, viewport: ViewportState) {
        self.viewport = viewport;
    }

    // Grid layout

    pub fn set_tile_width(&mut self, width: u32) -> Result<(), StudioError> {
        self.grid.layout.set_width(width)?;
        self.events.push(StudioEvent::GridSettingsUpdated);
        Ok(())
    }

    pub fn set_tile_height(&mut self, height: u32) -> Result<(), StudioError> {
        self.grid.layout.set_height(height)?;
        self.events.push(StudioEvent::GridSettingsUpdated);
        Ok(())
    }

    pub fn set_link(&mut self, link: bool) {
        self.grid.layout.link = link;
        self.events.push(StudioEvent::GridSettingsUpdated);
    }

    /// Rebuild the grid from the current tile size. Recreating while frames
    /// exist is destructive and needs `confirmed`.
    pub fn apply_grid(&mut self, confirmed: bool) -> Result<GridApply, StudioError> {
        if !self.image.is_loaded() {
            return Err(StudioError::ViewportEmpty);
        }
        if !self.frames.is_empty() && !confirmed {
            return Ok(GridApply::NeedsConfirmation);
        }
        self.clear_frames();
        self.destroy_grid();
        self.create_grid(Vec::new());
        Ok(GridApply::Applied)
    }

    fn create_grid(&mut self, previous: Vec<HitBox>) {
        let retain = !previous.is_empty() && self.can_retain_frames(&previous);
        let (width, height) = (self.image.width, self.image.height);
        let layout = &mut self.grid.layout;
        layout.commit(width, height);
        self.selector
            .rebuild(build_hit_boxes(layout.width, layout.height, width, height));
        tracing::debug!(
            tile_width = layout.width,
            tile_height = layout.height,
            hit_boxes = self.selector.hit_boxes().len(),
            "grid created"
        );
        self.events.push(StudioEvent::GridCreated);

        if retain {
            for hit_box in previous {
                self.toggle_hit_box(hit_box.id);
            }
        }
    }

    fn can_retain_frames(&mut self, previous: &[HitBox]) -> bool {
        if self.grid.layout.dimensions_changed() || !self.remember.frames {
            return false;
        }
        if self.remember.same_file_name_only && !self.image.is_same_image_reloaded() {
            return false;
        }
        let (width, height) = (self.image.width, self.image.height);
        let fits = previous.iter().all(|hit_box| hit_box.bounds.fits_within(width, height));
        if !fits {
            tracing::warn!("previous frames do not fit the new image");
            self.events.push(StudioEvent::Warning(Warning::CantRetainFrames));
        }
        fits
    }

    fn destroy_grid(&mut self) {
        if self.selector.has_grid() {
            self.selector.clear();
            self.events.push(StudioEvent::GridDestroyed);
        }
    }

    fn clear_frames(&mut self) {
        self.frames.clear();
        self.selector.clear_selection();
        self.animator.reset();
        self.preview.active_frame_index = 0;
        self.preview.total_frames = 0;
        self.events.push(StudioEvent::FramesCleared);
    }

    // Image

    /// Show a new image. Frames are rebuilt, cameras and selections survive
    /// as far as the remember options allow.
    pub fn load_image(&mut self, source: SourceImage) {
        let previous = self.selector.selected_hit_boxes();
        let had_visible_grid = self.selector.has_grid() && self.grid.appearance.visible;

        let SourceImage {
            name, pixels, data_uri, ..
        } = source;
        self.image.rename(name);
        self.image.width = pixels.width();
        self.image.height = pixels.height();
        self.image.src = data_uri;
        self.source = Some(pixels);
        tracing::info!(
            name = %self.image.current_file_name,
            width = self.image.width,
            height = self.image.height,
            "image loaded"
        );

        self.clear_frames();
        if !self.remember.preview {
            self.preview = PreviewState::default();
        }
        if !(self.remember.viewport && self.image.is_same_image_reloaded()) {
            self.viewport = ViewportState::default();
        }
        self.events.push(StudioEvent::ImageLoaded);

        if had_visible_grid || self.remember.grid {
            self.selector.clear();
            self.create_grid(previous);
        } else {
            self.destroy_grid();
        }
    }

    /// Reset the targets ticked in the clear options
    pub fn clear(&mut self) -> Result<ClearOutcome, StudioError> {
        let options = self.clear.clone();
        if !options.viewport && !options.frames {
            return Ok(ClearOutcome::NothingToClear);
        }
        if !self.image.is_loaded() {
            return Err(StudioError::ViewportEmpty);
        }
        if options.viewport {
            self.clear_image();
            self.preview = PreviewState::default();
            self.viewport = ViewportState::default();
        } else {
            self.clear_frames();
        }
        Ok(ClearOutcome::Cleared)
    }

    fn clear_image(&mut self) {
        self.clear_frames();
        self.destroy_grid();
        self.image = ImageInfo::default();
        self.source = None;
        self.events.push(StudioEvent::ImageCleared);
    }

    pub fn reset(&mut self, kind: StateKind) {
        match kind {
            StateKind::Grid => {
                let built = self.grid.layout.clone();
                self.grid = Grid::default();
                // A built grid keeps its tile size until it is applied again
                if self.selector.has_grid() {
                    self.grid.layout.keep_built(&built);
                }
                self.events.push(StudioEvent::GridSettingsUpdated);
            }
            StateKind::Image => self.clear_image(),
            StateKind::AnimationControls => {
                self.controls = AnimationControls::default();
                self.animator.stop();
                self.events.push(StudioEvent::AnimationControlsUpdated);
            }
            StateKind::Preview => {
                let defaults = PreviewState::default();
                self.set_preview_camera(defaults.zoom, defaults.pan);
            }
            StateKind::Viewport => self.viewport = ViewportState::default(),
            StateKind::Settings => self.set_settings(Settings::default()),
            StateKind::Clear => self.clear = ClearOptions::default(),
            StateKind::Remember => self.remember = Remember::default(),
        }
    }

    // Selection

    pub fn pointer_down(&mut self, point: (f32, f32), modifiers: SelectionModifiers) {
        let events = self.selector.pointer_down(point, modifiers);
        self.route_selector_events(events);
    }

    pub fn pointer_move(&mut self, point: (f32, f32), modifiers: SelectionModifiers) {
        self.selector.pointer_move(point, modifiers);
    }

    pub fn pointer_up(&mut self, modifiers: SelectionModifiers) {
        let events = self.selector.pointer_up(modifiers);
        self.route_selector_events(events);
    }

    pub fn toggle_hit_box(&mut self, id: HitBoxId) {
        let events = self.selector.toggle(id).into_iter().collect();
        self.route_selector_events(events);
    }

    /// Select every unselected hit box in raster order
    pub fn select_all(&mut self) {
        let ids: Vec<HitBoxId> = self
            .selector
            .hit_boxes()
            .iter()
            .map(|hit_box| hit_box.id)
            .filter(|id| !self.selector.is_selected(*id))
            .collect();
        for id in ids {
            self.toggle_hit_box(id);
        }
    }

    /// Deselect from the newest selection back
    pub fn deselect_all(&mut self) {
        for id in self.selector.selected().iter().rev().copied().collect::<Vec<_>>() {
            self.toggle_hit_box(id);
        }
    }

    pub fn click_frame(&mut self, index: usize) {
        let events = self.frames.click(index).into_iter().collect();
        self.route_frame_events(events);
    }

    fn route_selector_events(&mut self, events: Vec<SelectorEvent>) {
        for event in events {
            let frame_events = match event {
                SelectorEvent::Selected(hit_box) => {
                    self.events.push(StudioEvent::AreaSelected {
                        id: hit_box.id,
                        bounds: hit_box.bounds,
                    });
                    match self.source.as_ref() {
                        Some(source) => self.frames.push(source, &hit_box),
                        None => Vec::new(),
                    }
                }
                SelectorEvent::Deselected(id) => {
                    self.events.push(StudioEvent::AreaDeselected { id });
                    self.frames.remove(id)
                }
                SelectorEvent::Activated(id) => {
                    self.events.push(StudioEvent::AreaClicked { id });
                    self.frames.click_id(id).into_iter().collect()
                }
            };
            self.route_frame_events(frame_events);
        }
    }

    fn route_frame_events(&mut self, events: Vec<FrameEvent>) {
        for event in events {
            match event {
                FrameEvent::Created { id, index } => {
                    self.preview.total_frames = self.frames.len();
                    self.events.push(StudioEvent::FrameCreated { id, index });
                }
                FrameEvent::Removed { id, index } => {
                    let count = self.frames.len();
                    self.preview.total_frames = count;
                    self.animator.clamp_to(count);
                    self.preview.active_frame_index = self.animator.current_frame_index();
                    if count == 0 {
                        self.selector.set_active(None);
                    }
                    self.events.push(StudioEvent::FrameRemoved { id, index });
                }
                FrameEvent::Clicked { id, index } => {
                    self.animator.jump_to(index);
                    self.preview.active_frame_index = index;
                    self.selector.set_active(Some(id));
                    self.events.push(StudioEvent::FrameClicked { id, index });
                }
            }
        }
    }

    // Playback

    /// Advance playback by `dt` seconds
    pub fn tick(&mut self, dt: f64) {
        let was_playing = self.controls.play;
        if self.animator.update(dt, self.frames.len(), &mut self.controls) {
            self.sync_active_frame();
        }
        if was_playing != self.controls.play {
            self.events.push(StudioEvent::AnimationControlsUpdated);
        }
    }

    fn sync_active_frame(&mut self) {
        let index = self.animator.current_frame_index();
        self.preview.active_frame_index = index;
        self.frames.set_active_index(index);
        self.selector.set_active(self.frames.active_id());
    }

    pub fn is_playing(&self) -> bool {
        self.controls.play
    }

    /// Start playback, from the first frame when sitting on the last one
    pub fn play(&mut self) {
        if self.animator.is_at_last_frame(self.frames.len()) {
            self.restart();
        }
        self.controls.play = true;
        self.events.push(StudioEvent::AnimationControlsUpdated);
    }

    pub fn stop(&mut self) {
        self.controls.play = false;
        self.animator.stop();
        self.events.push(StudioEvent::AnimationControlsUpdated);
    }

    pub fn toggle_play(&mut self) {
        if self.controls.play {
            self.stop();
        } else {
            self.play();
        }
    }

    pub fn restart(&mut self) {
        self.animator.restart();
        self.sync_active_frame();
    }

    /// Step one frame while paused
    pub fn step_frame(&mut self, forward: bool) -> bool {
        let stepped = self.animator.step(forward, self.frames.len(), &self.controls);
        if stepped {
            self.sync_active_frame();
        }
        stepped
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.controls.looping = looping;
        self.events.push(StudioEvent::AnimationControlsUpdated);
    }

    pub fn set_duration_ms(&mut self, duration_ms: f64) -> Result<(), StudioError> {
        self.controls.set_duration_ms(duration_ms)?;
        self.halt_for_timing_change();
        Ok(())
    }

    pub fn set_frame_rate(&mut self, fps: f64) -> Result<(), StudioError> {
        self.controls.set_frame_rate(fps)?;
        self.halt_for_timing_change();
        Ok(())
    }

    fn halt_for_timing_change(&mut self) {
        if self.controls.play {
            self.controls.play = false;
            self.animator.stop();
        }
        self.events.push(StudioEvent::AnimationControlsUpdated);
    }

    // Export

    /// Snapshot the frames into a job writing to `dir`
    pub fn export_job(&self, dir: PathBuf, tool: PathBuf) -> Result<ExportJob, StudioError> {
        if self.frames.is_empty() {
            return Err(StudioError::EmptyFrames);
        }
        let layout = &self.grid.layout;
        let tags = match self.export.kind {
            ExportKind::PngSequence => String::new(),
            ExportKind::Gif | ExportKind::SpriteSheet => resolve_name_tags(
                &self.export.name_tags,
                layout.prev_width,
                layout.prev_height,
                self.controls.frame_rate,
            ),
        };
        let name = match self.export.file_name.trim() {
            "" => DEFAULT_EXPORT_FILE_NAME.to_string(),
            name => name.to_string(),
        };
        Ok(ExportJob {
            kind: self.export.kind,
            dir,
            name,
            tags,
            frame_rate: self.controls.frame_rate,
            sprite_sheet: self.export.sprite_sheet.clone(),
            frames: self.frames.images(),
            tool,
        })
    }
}

fn merged<T: Serialize + DeserializeOwned>(current: &T, incoming: &Value) -> Result<T, serde_json::Error> {
    let mut value = serde_json::to_value(current)?;
    merge_known_keys(&mut value, incoming);
    serde_json::from_value(value)
}

impl SectionState for Studio {
    fn section_value(&self, section: Section) -> Result<Value, serde_json::Error> {
        match section {
            Section::Settings => serde_json::to_value(&self.settings),
            Section::GridLayout => serde_json::to_value(&self.grid.layout),
            Section::GridAppearance => serde_json::to_value(&self.grid.appearance),
            Section::AnimationControls => serde_json::to_value(&self.controls),
            // Only the camera is worth keeping
            Section::Preview => Ok(serde_json::json!({
                "zoom": self.preview.zoom,
                "pan": self.preview.pan,
            })),
            Section::MenuAlignment => serde_json::to_value(&self.menu_alignment),
        }
    }

    fn merge_section(&mut self, section: Section, value: &Value) -> Result<(), serde_json::Error> {
        match section {
            Section::Settings => {
                self.settings = merged(&self.settings, value)?;
                self.events.push(StudioEvent::SettingsUpdated);
            }
            Section::GridLayout => {
                self.grid.layout = merged(&self.grid.layout, value)?;
                self.events.push(StudioEvent::GridSettingsUpdated);
            }
            Section::GridAppearance => {
                self.grid.appearance = merged(&self.grid.appearance, value)?;
                self.events.push(StudioEvent::GridSettingsUpdated);
            }
            Section::AnimationControls => {
                self.controls = merged(&self.controls, value)?;
                self.events.push(StudioEvent::AnimationControlsUpdated);
            }
            Section::Preview => {
                self.preview = merged(&self.preview, value)?;
                self.events.push(StudioEvent::PreviewSettingsUpdated);
            }
            Section::MenuAlignment => {
                self.menu_alignment = merged(&self.menu_alignment, value)?;
                self.events.push(StudioEvent::MenuAlignmentUpdated);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{MemoryStore, PersistRequest, PersistenceBridge};
    use image::{ImageFormat, Rgba};

    fn source(name: &str, width: u32, height: u32) -> SourceImage {
        SourceImage {
            name: name.to_string(),
            format: ImageFormat::Png,
            pixels: RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 7, 255])),
            data_uri: "data:image/png;base64,AA==".to_string(),
        }
    }

    fn studio_with_grid(tile: u32, size: u32) -> Studio {
        let mut studio = Studio::new();
        studio.load_image(source("walk.png", size, size));
        studio.set_tile_width(tile).unwrap();
        assert_eq!(studio.apply_grid(false).unwrap(), GridApply::Applied);
        studio.drain_events();
        studio
    }

    fn frame_ids(studio: &Studio) -> Vec<HitBoxId> {
        studio.frames().iter().map(|frame| frame.id).collect()
    }

    #[test]
    fn test_select_all_then_deselect_one() {
        let mut studio = studio_with_grid(64, 256);
        assert_eq!(studio.selector().hit_boxes().len(), 16);

        studio.select_all();
        assert_eq!(studio.frames().len(), 16);
        for (index, frame) in studio.frames().iter().enumerate() {
            assert_eq!(frame.id, studio.selector().hit_boxes()[index].id);
        }

        let fifth = studio.frames().get(5).unwrap().id;
        studio.toggle_hit_box(fifth);
        assert_eq!(studio.frames().len(), 15);
        assert_eq!(studio.frames().index_of(fifth), None);
        let ids = frame_ids(&studio);
        for (index, id) in ids.iter().enumerate() {
            assert_eq!(studio.frames().index_of(*id), Some(index));
        }
        assert_eq!(studio.active_hit_box(), Some(studio.frames().get(4).unwrap().id));
        assert_eq!(studio.preview().total_frames, 15);
    }

    #[test]
    fn test_double_toggle_restores_frames() {
        let mut studio = studio_with_grid(8, 32);
        studio.toggle_hit_box(HitBoxId::new(0, 0));
        studio.toggle_hit_box(HitBoxId::new(8, 0));
        let before = frame_ids(&studio);

        studio.toggle_hit_box(HitBoxId::new(16, 8));
        studio.toggle_hit_box(HitBoxId::new(16, 8));
        assert_eq!(frame_ids(&studio), before);
    }

    #[test]
    fn test_select_routes_events_in_order() {
        let mut studio = studio_with_grid(8, 32);
        studio.pointer_down((4.0, 4.0), SelectionModifiers { ctrl: true, ..Default::default() });
        let id = HitBoxId::new(0, 0);
        assert_eq!(
            studio.drain_events(),
            vec![
                StudioEvent::AreaSelected {
                    id,
                    bounds: crate::grid::Rect::new(0.0, 0.0, 8.0, 8.0)
                },
                StudioEvent::FrameCreated { id, index: 0 },
                StudioEvent::FrameClicked { id, index: 0 },
            ]
        );
        let frame = studio.frames().get(0).unwrap();
        assert_eq!(frame.image.get_pixel(3, 2), &Rgba([3, 2, 7, 255]));
    }

    #[test]
    fn test_apply_grid_needs_image_and_confirmation() {
        let mut studio = Studio::new();
        assert!(matches!(studio.apply_grid(false), Err(StudioError::ViewportEmpty)));

        let mut studio = studio_with_grid(8, 32);
        studio.toggle_hit_box(HitBoxId::new(0, 0));
        studio.set_tile_width(16).unwrap();
        assert_eq!(studio.apply_grid(false).unwrap(), GridApply::NeedsConfirmation);
        assert_eq!(studio.frames().len(), 1);

        assert_eq!(studio.apply_grid(true).unwrap(), GridApply::Applied);
        assert!(studio.frames().is_empty());
        assert_eq!(studio.selector().hit_boxes().len(), 4);
    }

    #[test]
    fn test_zero_tile_size_rejected() {
        let mut studio = Studio::new();
        assert!(matches!(studio.set_tile_width(0), Err(StudioError::TileSize(_))));
    }

    #[test]
    fn test_reloading_same_file_retains_frames() {
        let mut studio = studio_with_grid(8, 32);
        studio.toggle_hit_box(HitBoxId::new(8, 8));
        studio.toggle_hit_box(HitBoxId::new(0, 0));

        studio.load_image(source("walk.png", 32, 32));
        assert_eq!(frame_ids(&studio), vec![HitBoxId::new(8, 8), HitBoxId::new(0, 0)]);
    }

    #[test]
    fn test_other_file_drops_frames() {
        let mut studio = studio_with_grid(8, 32);
        studio.toggle_hit_box(HitBoxId::new(8, 8));
        studio.load_image(source("run.png", 32, 32));
        assert!(studio.frames().is_empty());
        assert!(!studio.drain_events().contains(&StudioEvent::Warning(Warning::CantRetainFrames)));
    }

    #[test]
    fn test_shrunk_image_warns_and_drops_frames() {
        let mut studio = studio_with_grid(8, 32);
        studio.toggle_hit_box(HitBoxId::new(24, 0));
        studio.load_image(source("walk.png", 16, 16));
        assert!(studio.frames().is_empty());
        assert!(studio.drain_events().contains(&StudioEvent::Warning(Warning::CantRetainFrames)));
        assert_eq!(studio.selector().hit_boxes().len(), 4);
    }

    #[test]
    fn test_tile_crossing_new_edge_drops_frames() {
        let mut studio = studio_with_grid(8, 32);
        studio.toggle_hit_box(HitBoxId::new(8, 8));
        studio.toggle_hit_box(HitBoxId::new(16, 0));
        studio.load_image(source("walk.png", 20, 20));
        assert!(studio.frames().is_empty());
        assert!(studio.drain_events().contains(&StudioEvent::Warning(Warning::CantRetainFrames)));
    }

    #[test]
    fn test_reset_grid_keeps_built_tile_size() {
        let mut studio = studio_with_grid(64, 256);
        studio.toggle_hit_box(HitBoxId::new(64, 0));
        studio.reset(StateKind::Grid);

        let layout = &studio.grid().layout;
        assert_eq!((layout.width, layout.height), (8, 8));
        assert_eq!((layout.prev_width, layout.prev_height), (64, 64));
        assert_eq!(studio.selector().hit_boxes()[0].bounds.width, 64.0);
        assert_eq!(studio.grid_lines().vertical.len(), 3);

        let mut config = studio.export_config().clone();
        config.kind = ExportKind::SpriteSheet;
        config.name_tags = "_{w}x{h}".to_string();
        studio.set_export_config(config);
        let job = studio.export_job(PathBuf::from("/out"), PathBuf::from("ffmpeg")).unwrap();
        assert_eq!(job.tags, "_64x64");
        assert_eq!(job.frames[0].dimensions(), (64, 64));

        // The reset size is pending, so a reload rebuilds at 8px and drops frames
        studio.load_image(source("walk.png", 256, 256));
        assert!(studio.frames().is_empty());
        assert_eq!(studio.selector().hit_boxes().len(), 1024);
    }

    #[test]
    fn test_reset_grid_without_grid_is_plain_default() {
        let mut studio = Studio::new();
        studio.set_tile_width(32).unwrap();
        studio.reset(StateKind::Grid);
        assert_eq!(studio.grid(), &Grid::default());
    }

    #[test]
    fn test_deselect_all_empties_frames() {
        let mut studio = studio_with_grid(8, 64);
        studio.select_all();
        assert_eq!(studio.frames().len(), 64);
        studio.deselect_all();
        assert!(studio.frames().is_empty());
        assert!(studio.selector().selected().is_empty());
        assert_eq!(studio.active_hit_box(), None);
    }

    #[test]
    fn test_changed_tile_size_drops_frames() {
        let mut studio = studio_with_grid(8, 32);
        studio.toggle_hit_box(HitBoxId::new(0, 0));
        studio.set_tile_width(16).unwrap();
        studio.load_image(source("walk.png", 32, 32));
        assert!(studio.frames().is_empty());
    }

    #[test]
    fn test_clear_options() {
        let mut studio = Studio::new();
        assert_eq!(studio.clear().unwrap(), ClearOutcome::NothingToClear);

        studio.set_clear_options(ClearOptions {
            viewport: false,
            frames: true,
        });
        assert!(matches!(studio.clear(), Err(StudioError::ViewportEmpty)));

        studio.load_image(source("walk.png", 32, 32));
        studio.toggle_hit_box(HitBoxId::new(0, 0));
        assert_eq!(studio.clear().unwrap(), ClearOutcome::Cleared);
        assert!(studio.frames().is_empty());
        assert!(studio.image().is_loaded());

        studio.set_clear_options(ClearOptions {
            viewport: true,
            frames: false,
        });
        studio.clear().unwrap();
        assert!(!studio.image().is_loaded());
        assert!(!studio.selector().has_grid());
    }

    #[test]
    fn test_play_at_last_frame_restarts() {
        let mut studio = studio_with_grid(8, 32);
        for x in [0, 8, 16] {
            studio.toggle_hit_box(HitBoxId::new(x, 0));
        }
        studio.stop();
        assert_eq!(studio.preview().active_frame_index, 2);

        studio.play();
        assert_eq!(studio.preview().active_frame_index, 0);
        assert_eq!(studio.active_hit_box(), Some(HitBoxId::new(0, 0)));
    }

    #[test]
    fn test_tick_moves_highlight() {
        let mut studio = studio_with_grid(8, 32);
        for x in [0, 8] {
            studio.toggle_hit_box(HitBoxId::new(x, 0));
        }
        studio.click_frame(0);
        studio.tick(0.1);
        assert_eq!(studio.preview().active_frame_index, 1);
        assert_eq!(studio.active_hit_box(), Some(HitBoxId::new(8, 0)));
    }

    #[test]
    fn test_rate_change_stops_playback() {
        let mut studio = studio_with_grid(8, 32);
        studio.toggle_hit_box(HitBoxId::new(0, 0));
        assert!(studio.is_playing());
        studio.set_frame_rate(24.0).unwrap();
        assert!(!studio.is_playing());
        assert_eq!(studio.controls().duration_ms, 41.66);
    }

    #[test]
    fn test_step_only_when_paused() {
        let mut studio = studio_with_grid(8, 32);
        for x in [0, 8, 16] {
            studio.toggle_hit_box(HitBoxId::new(x, 0));
        }
        assert!(!studio.step_frame(true));
        studio.stop();
        assert!(studio.step_frame(true));
        assert_eq!(studio.preview().active_frame_index, 0);
    }

    #[test]
    fn test_export_job_resolves_tags() {
        let mut studio = studio_with_grid(8, 32);
        assert!(matches!(
            studio.export_job(PathBuf::from("/out"), PathBuf::from("ffmpeg")),
            Err(StudioError::EmptyFrames)
        ));

        studio.toggle_hit_box(HitBoxId::new(0, 0));
        let mut config = studio.export_config().clone();
        config.kind = ExportKind::Gif;
        config.file_name = "  ".to_string();
        config.name_tags = "_{w}x{h}_{fps}".to_string();
        studio.set_export_config(config);

        let job = studio.export_job(PathBuf::from("/out"), PathBuf::from("ffmpeg")).unwrap();
        assert_eq!(job.name, "frame");
        assert_eq!(job.tags, "_8x8_10");
        assert_eq!(job.outputs(), vec![PathBuf::from("/out/frame_8x8_10.gif")]);
    }

    #[test]
    fn test_sections_persist_through_bridge() {
        let mut bridge = PersistenceBridge::new(Box::new(MemoryStore::new()));
        let mut studio = Studio::new();
        studio.set_menu_alignment(MenuAlignment::Left);
        studio.set_preview_camera(3.0, Pan { x: 10.0, y: 20.0 });
        studio.set_tile_width(16).unwrap();
        for section in Section::ALL {
            bridge.request(PersistRequest::Save(section));
        }
        bridge.process(&mut studio);

        let mut fresh = Studio::new();
        bridge.request_load_all();
        bridge.process(&mut fresh);
        assert_eq!(fresh.menu_alignment(), MenuAlignment::Left);
        assert_eq!(fresh.preview().zoom, 3.0);
        assert_eq!(fresh.preview().pan, Pan { x: 10.0, y: 20.0 });
        assert_eq!(fresh.grid().layout.width, 16);
        assert!(Section::ALL.iter().all(|section| bridge.is_loaded(*section)));
    }
}
