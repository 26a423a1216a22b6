use crate::model::GridLayout;

use super::HitBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("grid tiles must be at least 1x1 pixels")]
pub struct InvalidTileSize;

impl GridLayout {
    /// Set the tile width; with `link` on the height follows
    pub fn set_width(&mut self, width: u32) -> Result<(), InvalidTileSize> {
        if width == 0 {
            return Err(InvalidTileSize);
        }
        self.width = width;
        if self.link {
            self.height = width;
        }
        Ok(())
    }

    /// Set the tile height; with `link` on the width follows
    pub fn set_height(&mut self, height: u32) -> Result<(), InvalidTileSize> {
        if height == 0 {
            return Err(InvalidTileSize);
        }
        self.height = height;
        if self.link {
            self.width = height;
        }
        Ok(())
    }

    /// Whether the tile size differs from the one the grid was last built with
    pub fn dimensions_changed(&self) -> bool {
        self.width != self.prev_width || self.height != self.prev_height
    }

    /// Recompute the totals for an image and record the current size as built
    pub fn commit(&mut self, image_width: u32, image_height: u32) {
        self.total_x = image_width as f32 / self.width.max(1) as f32;
        self.total_y = image_height as f32 / self.height.max(1) as f32;
        self.prev_width = self.width;
        self.prev_height = self.height;
    }

    /// Carry over the size and totals of the grid that is currently built
    pub fn keep_built(&mut self, built: &GridLayout) {
        self.prev_width = built.prev_width;
        self.prev_height = built.prev_height;
        self.total_x = built.total_x;
        self.total_y = built.total_y;
    }

    pub fn columns(&self) -> u32 {
        self.total_x.ceil() as u32
    }

    pub fn rows(&self) -> u32 {
        self.total_y.ceil() as u32
    }
}

/// One hit box per column and row in raster order. Tiles in the last
/// column/row may extend past the image.
pub fn build_hit_boxes(tile_width: u32, tile_height: u32, image_width: u32, image_height: u32) -> Vec<HitBox> {
    if tile_width == 0 || tile_height == 0 {
        return Vec::new();
    }
    let columns = image_width.div_ceil(tile_width);
    let rows = image_height.div_ceil(tile_height);
    let mut hit_boxes = Vec::with_capacity((columns * rows) as usize);
    for row in 0..rows {
        for col in 0..columns {
            hit_boxes.push(HitBox::new(col * tile_width, row * tile_height, tile_width, tile_height));
        }
    }
    hit_boxes
}

/// Overlay line offsets in image pixels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLines {
    pub vertical: Vec<f32>,
    pub horizontal: Vec<f32>,
}

/// Lines at every tile multiple strictly inside the image
pub fn grid_lines(tile_width: u32, tile_height: u32, image_width: u32, image_height: u32) -> GridLines {
    let inner = |step: u32, extent: u32| -> Vec<f32> {
        if step == 0 {
            return Vec::new();
        }
        (1..)
            .map(|i| i * step)
            .take_while(|&offset| offset < extent)
            .map(|offset| offset as f32)
            .collect()
    };
    GridLines {
        vertical: inner(tile_width, image_width),
        horizontal: inner(tile_height, image_height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::HitBoxId;
    use proptest::prelude::*;

    #[test]
    fn test_link_mirrors_dimensions() {
        let mut layout = GridLayout::default();
        layout.set_width(16).unwrap();
        assert_eq!((layout.width, layout.height), (16, 16));

        layout.link = false;
        layout.set_height(24).unwrap();
        assert_eq!((layout.width, layout.height), (16, 24));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let mut layout = GridLayout::default();
        assert_eq!(layout.set_width(0), Err(InvalidTileSize));
        assert_eq!(layout.set_height(0), Err(InvalidTileSize));
        assert_eq!((layout.width, layout.height), (8, 8));
    }

    #[test]
    fn test_commit_records_built_size() {
        let mut layout = GridLayout::default();
        layout.set_width(32).unwrap();
        assert!(layout.dimensions_changed());
        layout.commit(100, 64);
        assert!(!layout.dimensions_changed());
        assert_eq!(layout.total_x, 3.125);
        assert_eq!(layout.total_y, 2.0);
        assert_eq!((layout.columns(), layout.rows()), (4, 2));
    }

    #[test]
    fn test_hit_boxes_are_raster_ordered() {
        let boxes = build_hit_boxes(64, 64, 256, 256);
        assert_eq!(boxes.len(), 16);
        assert_eq!(boxes[0].id, HitBoxId::new(0, 0));
        assert_eq!(boxes[1].id, HitBoxId::new(64, 0));
        assert_eq!(boxes[4].id, HitBoxId::new(0, 64));
        assert_eq!(boxes[15].id, HitBoxId::new(192, 192));
    }

    #[test]
    fn test_partial_edge_tiles_extend_past_image() {
        let boxes = build_hit_boxes(8, 8, 20, 10);
        assert_eq!(boxes.len(), 6);
        let last = boxes.last().unwrap();
        assert_eq!(last.id, HitBoxId::new(16, 8));
        assert_eq!(last.bounds.right(), 24.0);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        assert_eq!(build_hit_boxes(16, 8, 50, 30), build_hit_boxes(16, 8, 50, 30));
    }

    #[test]
    fn test_grid_lines_stay_inside_image() {
        let lines = grid_lines(8, 16, 32, 40);
        assert_eq!(lines.vertical, vec![8.0, 16.0, 24.0]);
        assert_eq!(lines.horizontal, vec![16.0, 32.0]);
    }

    proptest! {
        #[test]
        fn hit_box_count_is_ceil_product(w in 1u32..64, h in 1u32..64, iw in 1u32..300, ih in 1u32..300) {
            let boxes = build_hit_boxes(w, h, iw, ih);
            let expected = ((iw as f64 / w as f64).ceil() * (ih as f64 / h as f64).ceil()) as usize;
            prop_assert_eq!(boxes.len(), expected);
        }
    }
}
