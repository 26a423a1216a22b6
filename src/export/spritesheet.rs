use std::fs;

use image::{imageops, RgbaImage};
use serde::Serialize;

use crate::model::PackingAlgorithm;

use super::{naming, ExportError, ExportJob};

/// Where one frame landed in the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub width: u32,
    pub height: u32,
    /// Same order as the input sizes
    pub placements: Vec<Placement>,
}

/// Lay out frames of the given sizes. Every cell is grown by `padding`, which
/// is then trimmed once from the sheet's right and bottom edge.
pub fn pack(sizes: &[(u32, u32)], algorithm: PackingAlgorithm, padding: u32) -> SheetLayout {
    let cells: Vec<(u32, u32)> = sizes.iter().map(|&(w, h)| (w + padding, h + padding)).collect();

    let origins = match algorithm {
        PackingAlgorithm::LeftRight => running_origins(&cells, true, false),
        PackingAlgorithm::TopDown => running_origins(&cells, false, true),
        PackingAlgorithm::Diagonal => running_origins(&cells, true, true),
        PackingAlgorithm::AltDiagonal => {
            let total_width: u32 = cells.iter().map(|cell| cell.0).sum();
            running_origins(&cells, true, true)
                .into_iter()
                .zip(&cells)
                .map(|((x, y), cell)| (total_width - x - cell.0, y))
                .collect()
        }
        PackingAlgorithm::BinaryTree => binary_tree_origins(&cells),
    };

    let placements: Vec<Placement> = origins
        .iter()
        .zip(sizes)
        .map(|(&(x, y), &(width, height))| Placement { x, y, width, height })
        .collect();
    let extent = |axis: fn(&(u32, u32), &(u32, u32)) -> u32| {
        origins
            .iter()
            .zip(&cells)
            .map(|(origin, cell)| axis(origin, cell))
            .max()
            .unwrap_or(0)
            .saturating_sub(padding)
    };

    SheetLayout {
        width: extent(|origin, cell| origin.0 + cell.0),
        height: extent(|origin, cell| origin.1 + cell.1),
        placements,
    }
}

fn running_origins(cells: &[(u32, u32)], advance_x: bool, advance_y: bool) -> Vec<(u32, u32)> {
    let (mut x, mut y) = (0, 0);
    cells
        .iter()
        .map(|&(w, h)| {
            let origin = (x, y);
            if advance_x {
                x += w;
            }
            if advance_y {
                y += h;
            }
            origin
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Node {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    used: bool,
    right: Option<usize>,
    down: Option<usize>,
}

impl Node {
    fn free(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h, used: false, right: None, down: None }
    }
}

/// Binary tree packer whose root grows right or down as blocks arrive
struct GrowingPacker {
    nodes: Vec<Node>,
    root: usize,
}

impl GrowingPacker {
    fn new(w: u32, h: u32) -> Self {
        Self {
            nodes: vec![Node::free(0, 0, w, h)],
            root: 0,
        }
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn find(&self, index: usize, w: u32, h: u32) -> Option<usize> {
        let node = self.nodes[index];
        if node.used {
            node.right
                .and_then(|right| self.find(right, w, h))
                .or_else(|| node.down.and_then(|down| self.find(down, w, h)))
        } else if w <= node.w && h <= node.h {
            Some(index)
        } else {
            None
        }
    }

    fn split(&mut self, index: usize, w: u32, h: u32) -> (u32, u32) {
        let node = self.nodes[index];
        let down = self.push(Node::free(node.x, node.y + h, node.w, node.h - h));
        let right = self.push(Node::free(node.x + w, node.y, node.w - w, h));
        let node = &mut self.nodes[index];
        node.used = true;
        node.down = Some(down);
        node.right = Some(right);
        (node.x, node.y)
    }

    fn fit(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        match self.find(self.root, w, h) {
            Some(index) => Some(self.split(index, w, h)),
            None => self.grow(w, h),
        }
    }

    fn grow(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        let root = self.nodes[self.root];
        let can_grow_down = w <= root.w;
        let can_grow_right = h <= root.h;
        // Keep the sheet roughly square
        let should_grow_right = can_grow_right && root.h >= root.w + w;
        let should_grow_down = can_grow_down && root.w >= root.h + h;

        if should_grow_right || (!should_grow_down && can_grow_right) {
            let right = self.push(Node::free(root.w, 0, w, root.h));
            self.root = self.push(Node {
                x: 0,
                y: 0,
                w: root.w + w,
                h: root.h,
                used: true,
                right: Some(right),
                down: Some(self.root),
            });
        } else if can_grow_down {
            let down = self.push(Node::free(0, root.h, root.w, h));
            self.root = self.push(Node {
                x: 0,
                y: 0,
                w: root.w,
                h: root.h + h,
                used: true,
                right: Some(self.root),
                down: Some(down),
            });
        } else {
            return None;
        }
        let index = self.find(self.root, w, h)?;
        Some(self.split(index, w, h))
    }
}

fn binary_tree_origins(cells: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut order: Vec<usize> = (0..cells.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(cells[i].0.max(cells[i].1)));

    let Some(&first) = order.first() else {
        return Vec::new();
    };
    let mut packer = GrowingPacker::new(cells[first].0, cells[first].1);
    let mut origins = vec![(0, 0); cells.len()];
    let mut bottom = 0;
    for i in order {
        let (w, h) = cells[i];
        // Blocks are sorted by their longest side, so growing cannot fail;
        // stack below everything if it ever does
        origins[i] = packer.fit(w, h).unwrap_or((0, bottom));
        bottom = bottom.max(origins[i].1 + h);
    }
    origins
}

/// Paste frames at their placements
pub fn compose(frames: &[RgbaImage], layout: &SheetLayout) -> RgbaImage {
    let mut sheet = RgbaImage::new(layout.width, layout.height);
    for (frame, placement) in frames.iter().zip(&layout.placements) {
        imageops::replace(&mut sheet, frame, placement.x as i64, placement.y as i64);
    }
    sheet
}

/// Export the frames as a single packed spritesheet plus a JSON sidecar
pub fn export_spritesheet(job: &ExportJob, progress: &mut dyn FnMut(String)) -> Result<String, ExportError> {
    let sizes: Vec<(u32, u32)> = job.frames.iter().map(|frame| frame.dimensions()).collect();
    let layout = pack(&sizes, job.sprite_sheet.algorithm, job.sprite_sheet.padding);
    let sheet = compose(&job.frames, &layout);
    progress(format!(
        "Packed {} frames into {}x{} ({})",
        job.frames.len(),
        layout.width,
        layout.height,
        job.sprite_sheet.algorithm.label()
    ));

    // Save spritesheet
    let png_path = naming::tagged_path(&job.dir, &job.name, &job.tags, "png");
    sheet.save(&png_path).map_err(|source| ExportError::Encode {
        path: png_path.clone(),
        source,
    })?;

    // Create metadata JSON
    let json_path = naming::tagged_path(&job.dir, &job.name, &job.tags, "json");
    let frames: Vec<serde_json::Value> = layout
        .placements
        .iter()
        .enumerate()
        .map(|(index, placement)| {
            serde_json::json!({
                "index": index,
                "x": placement.x,
                "y": placement.y,
                "width": placement.width,
                "height": placement.height,
            })
        })
        .collect();
    let metadata = serde_json::json!({
        "sprite_sheet": png_path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| png_path.display().to_string()),
        "algorithm": job.sprite_sheet.algorithm,
        "padding": job.sprite_sheet.padding,
        "width": layout.width,
        "height": layout.height,
        "frame_rate": job.frame_rate,
        "frames": frames
    });
    let json_str = serde_json::to_string_pretty(&metadata)?;
    fs::write(&json_path, json_str).map_err(|source| ExportError::Io {
        path: json_path.clone(),
        source,
    })?;
    progress(format!("Saved {}", png_path.display()));

    Ok(format!("Export completed: {}", png_path.display()))
}
