//! Grid layout, hit boxes and the pointer gestures that select them.

mod hitbox;
mod layout;
mod rect;
mod selector;

pub use hitbox::{HitBox, HitBoxId};
pub use layout::{build_hit_boxes, grid_lines, GridLines, InvalidTileSize};
pub use rect::Rect;
pub use selector::{HitBoxSelector, SelectionModifiers, SelectorEvent, DRAG_THRESHOLD};
