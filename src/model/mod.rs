use serde::{Deserialize, Serialize};

pub const DEFAULT_EXPORT_FILE_NAME: &str = "frame";
pub const DEFAULT_TILE_SIZE: u32 = 8;
pub const DEFAULT_FRAME_DURATION_MS: f64 = 100.0;
pub const MAX_SPRITESHEET_PADDING: u32 = 100;

/// Metadata of the image currently shown in the viewport
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// `data:<mime>;base64,...` of the uploaded file, empty when nothing is loaded
    pub src: String,
    pub current_file_name: String,
    pub prev_file_name: String,
}

impl ImageInfo {
    pub fn is_loaded(&self) -> bool {
        !self.src.is_empty()
    }

    /// Move the current name into `prev_file_name` and take `name` as current
    pub fn rename(&mut self, name: impl Into<String>) {
        self.prev_file_name = std::mem::take(&mut self.current_file_name);
        self.current_file_name = name.into();
    }

    pub fn is_first_fresh_image_loaded(&self) -> bool {
        self.prev_file_name.is_empty() && !self.current_file_name.is_empty()
    }

    pub fn is_same_image_reloaded(&self) -> bool {
        !self.prev_file_name.is_empty()
            && !self.current_file_name.is_empty()
            && self.current_file_name == self.prev_file_name
    }
}

/// Tile size of the grid and the derived column/row totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    pub width: u32,
    pub height: u32,
    pub prev_width: u32,
    pub prev_height: u32,
    /// `image_width / width`, may be fractional when the last column is partial
    pub total_x: f32,
    pub total_y: f32,
    /// Editing one dimension mirrors it onto the other
    pub link: bool,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            width: DEFAULT_TILE_SIZE,
            height: DEFAULT_TILE_SIZE,
            prev_width: DEFAULT_TILE_SIZE,
            prev_height: DEFAULT_TILE_SIZE,
            total_x: 0.0,
            total_y: 0.0,
            link: true,
        }
    }
}

/// How the grid overlay is drawn. Never affects hit boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridAppearance {
    pub visible: bool,
    pub color: String,
    pub opacity: f32,
    /// 0.1 to 1
    pub line_thickness: f32,
}

impl Default for GridAppearance {
    fn default() -> Self {
        Self {
            visible: true,
            color: "#ccc4dd".to_string(),
            opacity: 0.4,
            line_thickness: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Grid {
    pub layout: GridLayout,
    pub appearance: GridAppearance,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("frame timing must be a positive number, got {0}")]
pub struct InvalidTiming(pub f64);

/// Truncate to two decimals, `1000 / duration`
pub fn ms_to_fps(duration_ms: f64) -> f64 {
    truncate_hundredths(1000.0 / duration_ms)
}

/// Truncate to two decimals, `1000 / fps`
pub fn fps_to_ms(fps: f64) -> f64 {
    truncate_hundredths(1000.0 / fps)
}

/// Round to `decimals` places
pub fn format_value(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn truncate_hundredths(value: f64) -> f64 {
    // tolerate float noise just below a hundredth
    ((value * 100.0) + 1e-6).floor() / 100.0
}

/// Playback settings shared by the preview animator and the GIF export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationControls {
    #[serde(rename = "loop")]
    pub looping: bool,
    pub duration_ms: f64,
    pub frame_rate: f64,
    pub play: bool,
}

impl Default for AnimationControls {
    fn default() -> Self {
        Self {
            looping: true,
            duration_ms: DEFAULT_FRAME_DURATION_MS,
            frame_rate: ms_to_fps(DEFAULT_FRAME_DURATION_MS),
            play: true,
        }
    }
}

impl AnimationControls {
    /// Set the per-frame duration and derive the frame rate from it
    pub fn set_duration_ms(&mut self, duration_ms: f64) -> Result<(), InvalidTiming> {
        if !duration_ms.is_finite() || duration_ms <= 0.0 {
            return Err(InvalidTiming(duration_ms));
        }
        self.duration_ms = duration_ms;
        self.frame_rate = ms_to_fps(duration_ms);
        Ok(())
    }

    /// Set the frame rate (rounded to two decimals) and derive the duration
    pub fn set_frame_rate(&mut self, fps: f64) -> Result<(), InvalidTiming> {
        let formatted = format_value(fps, 2);
        if !formatted.is_finite() || formatted <= 0.0 {
            return Err(InvalidTiming(fps));
        }
        self.frame_rate = formatted;
        self.duration_ms = fps_to_ms(formatted);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pan {
    pub x: f32,
    pub y: f32,
}

/// Preview window state: which frame is shown and the preview camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewState {
    pub active_frame_index: usize,
    pub total_frames: usize,
    pub zoom: f32,
    pub pan: Pan,
}

impl Default for PreviewState {
    fn default() -> Self {
        Self {
            active_frame_index: 0,
            total_frames: 0,
            zoom: 1.0,
            pan: Pan::default(),
        }
    }
}

/// Viewport camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportState {
    pub zoom: f32,
    pub pan: Pan,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Pan::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportKind {
    #[default]
    PngSequence,
    Gif,
    SpriteSheet,
}

impl ExportKind {
    pub const ALL: [ExportKind; 3] = [ExportKind::PngSequence, ExportKind::Gif, ExportKind::SpriteSheet];

    pub fn label(&self) -> &'static str {
        match self {
            ExportKind::PngSequence => "PNG Sequences",
            ExportKind::Gif => "GIF",
            ExportKind::SpriteSheet => "SpriteSheet",
        }
    }
}

/// Packing strategy for the sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackingAlgorithm {
    #[default]
    LeftRight,
    TopDown,
    BinaryTree,
    Diagonal,
    AltDiagonal,
}

impl PackingAlgorithm {
    pub const ALL: [PackingAlgorithm; 5] = [
        PackingAlgorithm::LeftRight,
        PackingAlgorithm::TopDown,
        PackingAlgorithm::BinaryTree,
        PackingAlgorithm::Diagonal,
        PackingAlgorithm::AltDiagonal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PackingAlgorithm::LeftRight => "left-right",
            PackingAlgorithm::TopDown => "top-down",
            PackingAlgorithm::BinaryTree => "binary-tree",
            PackingAlgorithm::Diagonal => "diagonal",
            PackingAlgorithm::AltDiagonal => "alt-diagonal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteSheetOptions {
    pub algorithm: PackingAlgorithm,
    pub padding: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub kind: ExportKind,
    pub file_name: String,
    /// Template appended to GIF/spritesheet names, e.g. `,w{w},h{h},fps{fps}`
    pub name_tags: String,
    pub sprite_sheet: SpriteSheetOptions,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            kind: ExportKind::PngSequence,
            file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            name_tags: String::new(),
            sprite_sheet: SpriteSheetOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    Default,
    Iceberg,
    Jetblack,
    Light,
    #[default]
    Retro,
    Translucent,
    Vivid,
}

impl Theme {
    pub const ALL: [Theme; 7] = [
        Theme::Default,
        Theme::Iceberg,
        Theme::Jetblack,
        Theme::Light,
        Theme::Retro,
        Theme::Translucent,
        Theme::Vivid,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Default => "Default",
            Theme::Iceberg => "Iceberg",
            Theme::Jetblack => "Jetblack",
            Theme::Light => "Light",
            Theme::Retro => "Retro",
            Theme::Translucent => "Translucent",
            Theme::Vivid => "Vivid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionStyle {
    pub background_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewStyle {
    pub background_color: String,
    pub background_opacity: f32,
    pub border_color: String,
    /// 0 to 10
    pub border_width: f32,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            background_color: "#454545".to_string(),
            background_opacity: 1.0,
            border_color: "#000000".to_string(),
            border_width: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingSettings {
    pub pixelated: bool,
}

impl Default for RenderingSettings {
    fn default() -> Self {
        Self { pixelated: true }
    }
}

/// Purely presentational interface settings, persisted as one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub viewport: RegionStyle,
    pub preview: PreviewStyle,
    pub frames_collection: RegionStyle,
    pub rendering: RenderingSettings,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport: RegionStyle {
                background_color: "#454545".to_string(),
            },
            preview: PreviewStyle::default(),
            frames_collection: RegionStyle {
                background_color: "#383838".to_string(),
            },
            rendering: RenderingSettings::default(),
            theme: Theme::Retro,
        }
    }
}

impl Default for RegionStyle {
    fn default() -> Self {
        Self {
            background_color: "#454545".to_string(),
        }
    }
}

/// What survives uploading the next image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Remember {
    pub grid: bool,
    pub viewport: bool,
    pub preview: bool,
    pub frames: bool,
    pub same_file_name_only: bool,
}

impl Default for Remember {
    fn default() -> Self {
        Self {
            grid: true,
            viewport: true,
            preview: true,
            frames: true,
            same_file_name_only: true,
        }
    }
}

/// Targets of the Clear action
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearOptions {
    pub viewport: bool,
    pub frames: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuAlignment {
    Left,
    #[default]
    Right,
    TopMiddle,
}

impl MenuAlignment {
    pub const ALL: [MenuAlignment; 3] = [MenuAlignment::Left, MenuAlignment::Right, MenuAlignment::TopMiddle];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAlignment::Left => "Left",
            MenuAlignment::Right => "Right",
            MenuAlignment::TopMiddle => "Top Middle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuWindowAlignment {
    pub align: MenuAlignment,
}

/// Sub-states that can be restored to their defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Grid,
    Image,
    AnimationControls,
    Preview,
    Viewport,
    Settings,
    Clear,
    Remember,
}

/// Parse `#rrggbb` (or `rrggbb`)
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

pub fn to_hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults_match_first_launch() {
        let grid = Grid::default();
        assert_eq!((grid.layout.width, grid.layout.height), (8, 8));
        assert!(grid.layout.link);
        assert_eq!(grid.appearance.color, "#ccc4dd");

        let controls = AnimationControls::default();
        assert_eq!(controls.duration_ms, 100.0);
        assert_eq!(controls.frame_rate, 10.0);
        assert!(controls.looping && controls.play);

        let export = ExportConfig::default();
        assert_eq!(export.kind, ExportKind::PngSequence);
        assert_eq!(export.file_name, "frame");
        assert_eq!(export.sprite_sheet.algorithm, PackingAlgorithm::LeftRight);
    }

    #[test]
    fn test_rename_tracks_previous_file() {
        let mut image = ImageInfo::default();
        image.rename("walk.png");
        assert!(image.is_first_fresh_image_loaded());
        assert!(!image.is_same_image_reloaded());

        image.rename("walk.png");
        assert!(image.is_same_image_reloaded());

        image.rename("run.png");
        assert_eq!(image.prev_file_name, "walk.png");
        assert!(!image.is_same_image_reloaded());
    }

    #[test]
    fn test_duration_and_rate_stay_in_sync() {
        let mut controls = AnimationControls::default();
        controls.set_duration_ms(33.0).unwrap();
        assert_eq!(controls.frame_rate, 30.3);

        controls.set_frame_rate(12.345).unwrap();
        assert_eq!(controls.frame_rate, 12.35);
        assert_eq!(controls.duration_ms, 80.97);

        assert!(controls.set_frame_rate(0.0).is_err());
        assert!(controls.set_duration_ms(-5.0).is_err());
        assert_eq!(controls.frame_rate, 12.35);
    }

    #[test]
    fn test_fast_rates_drift_on_round_trip() {
        assert_eq!(fps_to_ms(60.0), 16.66);
        assert_eq!(ms_to_fps(16.66), 60.02);
        assert_eq!(fps_to_ms(144.0), 6.94);
        assert_eq!(ms_to_fps(6.94), 144.09);
        assert_eq!(ms_to_fps(51.0), 19.6);
        assert_eq!(fps_to_ms(19.6), 51.02);
    }

    proptest! {
        #[test]
        fn timing_round_trips_up_to_45(hundredths in 1u32..=4500) {
            let value = hundredths as f64 / 100.0;
            prop_assert!((ms_to_fps(fps_to_ms(value)) - value).abs() <= 0.01 + 1e-9);
            prop_assert!((fps_to_ms(ms_to_fps(value)) - value).abs() <= 0.01 + 1e-9);
        }
    }

    #[test]
    fn test_loop_flag_serializes_as_loop() {
        let json = serde_json::to_value(AnimationControls::default()).unwrap();
        assert_eq!(json["loop"], serde_json::Value::Bool(true));
    }

    #[test]
    fn test_packing_algorithm_uses_kebab_case() {
        let json = serde_json::to_string(&PackingAlgorithm::AltDiagonal).unwrap();
        assert_eq!(json, "\"alt-diagonal\"");
        let parsed: PackingAlgorithm = serde_json::from_str("\"binary-tree\"").unwrap();
        assert_eq!(parsed, PackingAlgorithm::BinaryTree);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_hex_color("#ccc4dd"), Some([0xcc, 0xc4, 0xdd]));
        assert_eq!(parse_hex_color("454545"), Some([0x45, 0x45, 0x45]));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(to_hex_color([0x38, 0x38, 0x38]), "#383838");
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings =
            serde_json::from_str(r##"{"theme":"Vivid","preview":{"border_width":2.5}}"##).unwrap();
        assert_eq!(settings.theme, Theme::Vivid);
        assert_eq!(settings.preview.border_width, 2.5);
        assert_eq!(settings.preview.background_color, "#454545");
        assert!(settings.rendering.pixelated);
    }
}
