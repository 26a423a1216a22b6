use std::fmt;
use std::str::FromStr;

use super::Rect;

/// Pixel origin of a tile, displayed as `"x,y"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HitBoxId {
    pub x: u32,
    pub y: u32,
}

impl HitBoxId {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for HitBoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for HitBoxId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s.split_once(',').unwrap_or((s, ""));
        Ok(Self {
            x: x.trim().parse()?,
            y: y.trim().parse()?,
        })
    }
}

/// One selectable grid tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitBox {
    pub id: HitBoxId,
    pub bounds: Rect,
}

impl HitBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            id: HitBoxId::new(x, y),
            bounds: Rect::new(x as f32, y as f32, width as f32, height as f32),
        }
    }
}
