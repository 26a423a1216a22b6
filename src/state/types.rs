use std::path::PathBuf;

/// Zoom levels available in the application
pub const ZOOM_LEVELS: [f32; 14] = [
    0.25, 0.5, 1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 12.0, 16.0, 24.0, 32.0, 64.0, 128.0,
];

/// Action waiting on a yes/no answer
#[derive(Clone, Debug, PartialEq)]
pub enum PendingAction {
    /// Rebuilding the grid drops every frame
    RecreateGrid,
    /// The export would replace these files
    OverwriteExport { paths: Vec<PathBuf> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupKind {
    Info,
    Warning,
    Error,
}

impl PopupKind {
    pub fn title(&self) -> &'static str {
        match self {
            PopupKind::Info => "Info",
            PopupKind::Warning => "Warning",
            PopupKind::Error => "Error",
        }
    }
}

/// Modal message that must be acknowledged
#[derive(Clone, Debug, PartialEq)]
pub struct Popup {
    pub kind: PopupKind,
    pub message: String,
}

impl Popup {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: PopupKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: PopupKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: PopupKind::Error,
            message: message.into(),
        }
    }
}

/// Where the export worker is at, for the progress window
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ExportStatus {
    #[default]
    Idle,
    Running(String),
    Done(String),
}

/// Section shown in the inspector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InspectorTab {
    #[default]
    Grid,
    Animation,
    Export,
    Options,
}

impl InspectorTab {
    pub const ALL: [InspectorTab; 4] = [
        InspectorTab::Grid,
        InspectorTab::Animation,
        InspectorTab::Export,
        InspectorTab::Options,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InspectorTab::Grid => "Grid",
            InspectorTab::Animation => "Animation",
            InspectorTab::Export => "Export",
            InspectorTab::Options => "Options",
        }
    }
}
