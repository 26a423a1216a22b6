//! Frames cropped from the selected hit boxes, in selection order.

use std::collections::HashMap;

use image::{imageops, RgbaImage};

use crate::grid::{HitBox, HitBoxId, Rect};

#[derive(Debug, Clone)]
pub struct Frame {
    pub id: HitBoxId,
    pub bounds: Rect,
    pub image: RgbaImage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    Created { id: HitBoxId, index: usize },
    Removed { id: HitBoxId, index: usize },
    Clicked { id: HitBoxId, index: usize },
}

/// Ordered frames; a frame's index is always its position
#[derive(Debug, Clone, Default)]
pub struct FrameCollection {
    frames: Vec<Frame>,
    /// Index of each frame by hit box
    positions: HashMap<HitBoxId, usize>,
    active: Option<usize>,
}

/// Copy `bounds` out of `source` into a tile-sized image. Pixels outside the
/// source stay transparent.
pub fn crop_tile(source: &RgbaImage, bounds: &Rect) -> RgbaImage {
    let (x, y) = (bounds.x.max(0.0) as u32, bounds.y.max(0.0) as u32);
    let (width, height) = (bounds.width.max(0.0) as u32, bounds.height.max(0.0) as u32);
    let mut tile = RgbaImage::new(width, height);
    if x < source.width() && y < source.height() {
        let visible = imageops::crop_imm(source, x, y, width, height).to_image();
        imageops::replace(&mut tile, &visible, 0, 0);
    }
    tile
}

impl FrameCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn index_of(&self, id: HitBoxId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_id(&self) -> Option<HitBoxId> {
        self.active.and_then(|index| self.frames.get(index)).map(|frame| frame.id)
    }

    /// Track the animator without emitting a click
    pub fn set_active_index(&mut self, index: usize) {
        if index < self.frames.len() {
            self.active = Some(index);
        }
    }

    /// Crop a frame for a newly selected hit box and make it active
    pub fn push(&mut self, source: &RgbaImage, hit_box: &HitBox) -> Vec<FrameEvent> {
        if self.index_of(hit_box.id).is_some() {
            return Vec::new();
        }
        self.frames.push(Frame {
            id: hit_box.id,
            bounds: hit_box.bounds,
            image: crop_tile(source, &hit_box.bounds),
        });
        let index = self.frames.len() - 1;
        self.positions.insert(hit_box.id, index);
        let mut events = vec![FrameEvent::Created { id: hit_box.id, index }];
        events.extend(self.click(index));
        events
    }

    /// Remove a frame and fall back to the previous frame, else the first, else none
    pub fn remove(&mut self, id: HitBoxId) -> Vec<FrameEvent> {
        let Some(index) = self.index_of(id) else {
            return Vec::new();
        };
        self.frames.remove(index);
        self.positions.remove(&id);
        for (position, frame) in self.frames.iter().enumerate().skip(index) {
            self.positions.insert(frame.id, position);
        }
        self.active = None;
        let mut events = vec![FrameEvent::Removed { id, index }];
        let fallback = if index > 0 {
            Some(index - 1)
        } else if !self.frames.is_empty() {
            Some(0)
        } else {
            None
        };
        if let Some(fallback) = fallback {
            events.extend(self.click(fallback));
        }
        events
    }

    pub fn click(&mut self, index: usize) -> Option<FrameEvent> {
        let id = self.frames.get(index)?.id;
        self.active = Some(index);
        Some(FrameEvent::Clicked { id, index })
    }

    pub fn click_id(&mut self, id: HitBoxId) -> Option<FrameEvent> {
        self.click(self.index_of(id)?)
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.positions.clear();
        self.active = None;
    }

    pub fn images(&self) -> Vec<RgbaImage> {
        self.frames.iter().map(|frame| frame.image.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::build_hit_boxes;
    use image::Rgba;
    use proptest::prelude::*;

    fn source() -> RgbaImage {
        RgbaImage::from_fn(20, 10, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    #[test]
    fn test_crop_copies_pixels() {
        let tile = crop_tile(&source(), &Rect::new(8.0, 0.0, 8.0, 8.0));
        assert_eq!(tile.dimensions(), (8, 8));
        assert_eq!(tile.get_pixel(0, 0), &Rgba([8, 0, 0, 255]));
        assert_eq!(tile.get_pixel(7, 7), &Rgba([15, 7, 0, 255]));
    }

    #[test]
    fn test_partial_tile_is_padded_transparent() {
        let tile = crop_tile(&source(), &Rect::new(16.0, 8.0, 8.0, 8.0));
        assert_eq!(tile.dimensions(), (8, 8));
        assert_eq!(tile.get_pixel(3, 1), &Rgba([19, 9, 0, 255]));
        assert_eq!(tile.get_pixel(4, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(tile.get_pixel(0, 2), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_push_creates_then_clicks() {
        let mut frames = FrameCollection::new();
        let hit_box = HitBox::new(8, 0, 8, 8);
        let events = frames.push(&source(), &hit_box);
        assert_eq!(
            events,
            vec![
                FrameEvent::Created { id: hit_box.id, index: 0 },
                FrameEvent::Clicked { id: hit_box.id, index: 0 },
            ]
        );
        assert_eq!(frames.active_id(), Some(hit_box.id));
    }

    #[test]
    fn test_remove_falls_back_to_previous() {
        let mut frames = FrameCollection::new();
        let boxes = build_hit_boxes(8, 8, 24, 8);
        for hit_box in &boxes {
            frames.push(&source(), hit_box);
        }
        let events = frames.remove(boxes[1].id);
        assert_eq!(
            events,
            vec![
                FrameEvent::Removed { id: boxes[1].id, index: 1 },
                FrameEvent::Clicked { id: boxes[0].id, index: 0 },
            ]
        );
        assert_eq!(frames.index_of(boxes[2].id), Some(1));
    }

    #[test]
    fn test_remove_first_falls_back_to_new_first() {
        let mut frames = FrameCollection::new();
        let boxes = build_hit_boxes(8, 8, 16, 8);
        for hit_box in &boxes {
            frames.push(&source(), hit_box);
        }
        let events = frames.remove(boxes[0].id);
        assert_eq!(events[1], FrameEvent::Clicked { id: boxes[1].id, index: 0 });

        let events = frames.remove(boxes[1].id);
        assert_eq!(events, vec![FrameEvent::Removed { id: boxes[1].id, index: 0 }]);
        assert_eq!(frames.active_id(), None);
    }

    proptest! {
        #[test]
        fn indices_stay_contiguous(toggles in proptest::collection::vec(0usize..12, 0..60)) {
            let boxes = build_hit_boxes(8, 8, 32, 24);
            let image = RgbaImage::new(32, 24);
            let mut frames = FrameCollection::new();
            let mut expected: Vec<HitBoxId> = Vec::new();
            for pick in toggles {
                let hit_box = boxes[pick];
                if let Some(pos) = expected.iter().position(|id| *id == hit_box.id) {
                    expected.remove(pos);
                    frames.remove(hit_box.id);
                } else {
                    expected.push(hit_box.id);
                    frames.push(&image, &hit_box);
                }
                let ids: Vec<_> = frames.iter().map(|frame| frame.id).collect();
                prop_assert_eq!(&ids, &expected);
                for (index, id) in ids.iter().enumerate() {
                    prop_assert_eq!(frames.index_of(*id), Some(index));
                }
            }
        }
    }
}
