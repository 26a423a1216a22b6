use std::collections::{HashMap, HashSet};

use super::{HitBox, HitBoxId, Rect};

/// Width or height a shift-drag must reach before it counts as a drag
pub const DRAG_THRESHOLD: f32 = 2.0;

/// Modifier keys held during a pointer gesture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionModifiers {
    pub ctrl: bool,
    pub shift: bool,
    /// `Z` re-activates already selected boxes
    pub activate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorEvent {
    Selected(HitBox),
    Deselected(HitBoxId),
    Activated(HitBoxId),
}

#[derive(Debug, Clone, Copy, Default)]
struct Gesture {
    pressed: bool,
    start: (f32, f32),
    current: (f32, f32),
    dragging: bool,
}

impl Gesture {
    fn rect(&self) -> Rect {
        Rect::from_corners(self.start, self.current)
    }
}

/// Selection state of the grid hit boxes
#[derive(Debug, Clone, Default)]
pub struct HitBoxSelector {
    hit_boxes: Vec<HitBox>,
    /// Position of each box in `hit_boxes`
    positions: HashMap<HitBoxId, usize>,
    /// In selection order
    selected: Vec<HitBoxId>,
    selected_set: HashSet<HitBoxId>,
    active: Option<HitBoxId>,
    gesture: Gesture,
}

impl HitBoxSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every hit box; the selection is dropped
    pub fn rebuild(&mut self, hit_boxes: Vec<HitBox>) {
        self.positions = hit_boxes
            .iter()
            .enumerate()
            .map(|(position, hit_box)| (hit_box.id, position))
            .collect();
        self.hit_boxes = hit_boxes;
        self.clear_selection();
        self.gesture = Gesture::default();
    }

    pub fn clear(&mut self) {
        self.rebuild(Vec::new());
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.selected_set.clear();
        self.active = None;
    }

    pub fn hit_boxes(&self) -> &[HitBox] {
        &self.hit_boxes
    }

    pub fn has_grid(&self) -> bool {
        !self.hit_boxes.is_empty()
    }

    pub fn get(&self, id: HitBoxId) -> Option<&HitBox> {
        self.positions.get(&id).and_then(|position| self.hit_boxes.get(*position))
    }

    pub fn selected(&self) -> &[HitBoxId] {
        &self.selected
    }

    /// Selected boxes in selection order
    pub fn selected_hit_boxes(&self) -> Vec<HitBox> {
        self.selected.iter().filter_map(|id| self.get(*id).copied()).collect()
    }

    pub fn is_selected(&self, id: HitBoxId) -> bool {
        self.selected_set.contains(&id)
    }

    pub fn active(&self) -> Option<HitBoxId> {
        self.active
    }

    pub fn set_active(&mut self, id: Option<HitBoxId>) {
        self.active = id;
    }

    /// Rubber band rectangle while a shift-drag is in progress
    pub fn drag_rect(&self) -> Option<Rect> {
        (self.gesture.pressed && self.gesture.dragging).then(|| self.gesture.rect())
    }

    pub fn select(&mut self, id: HitBoxId) -> Option<SelectorEvent> {
        if self.is_selected(id) {
            return None;
        }
        let hit_box = *self.get(id)?;
        self.selected.push(id);
        self.selected_set.insert(id);
        Some(SelectorEvent::Selected(hit_box))
    }

    pub fn deselect(&mut self, id: HitBoxId) -> Option<SelectorEvent> {
        if !self.selected_set.remove(&id) {
            return None;
        }
        if let Some(position) = self.selected.iter().rposition(|selected| *selected == id) {
            self.selected.remove(position);
        }
        if self.active == Some(id) {
            self.active = None;
        }
        Some(SelectorEvent::Deselected(id))
    }

    pub fn toggle(&mut self, id: HitBoxId) -> Option<SelectorEvent> {
        if self.is_selected(id) {
            self.deselect(id)
        } else {
            self.select(id)
        }
    }

    /// Toggle every box whose interior contains `point`
    pub fn toggle_at_point(&mut self, point: (f32, f32)) -> Vec<SelectorEvent> {
        let ids = self.ids_where(|hit_box| hit_box.bounds.contains_point(point));
        ids.into_iter().filter_map(|id| self.toggle(id)).collect()
    }

    /// Toggle every box overlapping `rect`
    pub fn toggle_in_rect(&mut self, rect: &Rect) -> Vec<SelectorEvent> {
        let ids = self.ids_where(|hit_box| hit_box.bounds.intersects(rect));
        ids.into_iter().filter_map(|id| self.toggle(id)).collect()
    }

    /// Re-activate selected boxes under `point` without changing membership
    pub fn activate_at_point(&mut self, point: (f32, f32)) -> Vec<SelectorEvent> {
        let ids: Vec<HitBoxId> = self
            .ids_where(|hit_box| hit_box.bounds.contains_point(point))
            .into_iter()
            .filter(|id| self.is_selected(*id))
            .collect();
        if let Some(last) = ids.last() {
            self.active = Some(*last);
        }
        ids.into_iter().map(SelectorEvent::Activated).collect()
    }

    pub fn pointer_down(&mut self, point: (f32, f32), modifiers: SelectionModifiers) -> Vec<SelectorEvent> {
        self.gesture = Gesture {
            pressed: true,
            start: point,
            current: point,
            dragging: false,
        };
        if modifiers.ctrl {
            self.toggle_at_point(point)
        } else if modifiers.activate {
            self.activate_at_point(point)
        } else {
            Vec::new()
        }
    }

    pub fn pointer_move(&mut self, point: (f32, f32), modifiers: SelectionModifiers) {
        if !self.gesture.pressed || !modifiers.shift {
            return;
        }
        self.gesture.current = point;
        let rect = self.gesture.rect();
        if rect.width >= DRAG_THRESHOLD || rect.height >= DRAG_THRESHOLD {
            self.gesture.dragging = true;
        }
    }

    pub fn pointer_up(&mut self, modifiers: SelectionModifiers) -> Vec<SelectorEvent> {
        let gesture = std::mem::take(&mut self.gesture);
        if gesture.pressed && gesture.dragging && modifiers.shift {
            self.toggle_in_rect(&gesture.rect())
        } else {
            Vec::new()
        }
    }

    fn ids_where(&self, predicate: impl Fn(&HitBox) -> bool) -> Vec<HitBoxId> {
        self.hit_boxes.iter().filter(|hit_box| predicate(hit_box)).map(|hit_box| hit_box.id).collect()
    }
}
