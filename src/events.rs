use crate::grid::{HitBoxId, Rect};

/// Non-fatal conditions the user should be told about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// Previous selections no longer fit the reloaded image
    CantRetainFrames,
}

impl Warning {
    pub fn message(&self) -> &'static str {
        match self {
            Warning::CantRetainFrames => {
                "Previous frames boundaries exceed the current viewport image. Can not retain previous frames!"
            }
        }
    }
}

/// Changes views react to, drained once per UI frame
#[derive(Debug, Clone, PartialEq)]
pub enum StudioEvent {
    ImageLoaded,
    ImageCleared,
    GridCreated,
    GridDestroyed,
    AreaSelected { id: HitBoxId, bounds: Rect },
    AreaDeselected { id: HitBoxId },
    AreaClicked { id: HitBoxId },
    FrameCreated { id: HitBoxId, index: usize },
    FrameRemoved { id: HitBoxId, index: usize },
    FrameClicked { id: HitBoxId, index: usize },
    FramesCleared,
    SettingsUpdated,
    GridSettingsUpdated,
    PreviewSettingsUpdated,
    AnimationControlsUpdated,
    MenuAlignmentUpdated,
    Warning(Warning),
}
