// THEORY:
// The data model of the generator. A `Canvas` is the fixed drawing surface, a
// `Circle` is a single disc, and a `Field` is everything needed to paint one
// frame: the background plus an ordered list of circles.
//
// Key architectural principles:
// 1.  **Dumb Containers**: Nothing here knows how to place or move circles.
//     The engines in `placement` and `migration` own that logic.
// 2.  **Order Matters**: `Field::circles` keeps insertion order. Migration
//     resolves collisions against circles earlier in the list only, so the
//     order is part of the field's state, not an incidental detail.
// 3.  **Immutable Identity**: A circle's radius and color are fixed at birth.
//     Only its center moves.

use crate::error::{FieldError, FieldResult};
use image::Rgb;

pub const CANVAS_WIDTH: u32 = 1024;
pub const CANVAS_HEIGHT: u32 = 512;

/// The fixed drawing surface shared by every frame of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> FieldResult<Self> {
        if width == 0 || height == 0 {
            return Err(FieldError::invalid(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(FieldError::invalid(format!(
                "canvas {width}x{height} does not fit signed pixel coordinates"
            )));
        }
        Ok(Self { width, height })
    }

    /// Whether a center lies on the canvas.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

/// Inclusive bounds for circle radii.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadiusRange {
    pub min: u32,
    pub max: u32,
}

impl RadiusRange {
    pub fn new(min: u32, max: u32) -> FieldResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> FieldResult<()> {
        if self.min > self.max {
            return Err(FieldError::invalid(format!(
                "radius range {}..={} is inverted",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, radius: u32) -> bool {
        (self.min..=self.max).contains(&radius)
    }
}

impl Default for RadiusRange {
    fn default() -> Self {
        Self { min: 40, max: 50 }
    }
}

/// A single filled disc. `x`/`y` is the center and may leave the canvas after a wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Circle {
    pub x: i32,
    pub y: i32,
    pub radius: u32,
    pub color: Rgb<u8>,
}

impl Circle {
    pub fn new(x: i32, y: i32, radius: u32, color: Rgb<u8>) -> Self {
        Self {
            x,
            y,
            radius,
            color,
        }
    }

    /// Euclidean distance between two centers.
    pub fn distance_to(&self, other: &Circle) -> f64 {
        center_distance((self.x, self.y), (other.x, other.y))
    }

    /// Center distance two circles need so that their edges are `min_distance` apart.
    pub fn required_separation(&self, other: &Circle, min_distance: u32) -> f64 {
        self.radius as f64 + other.radius as f64 + min_distance as f64
    }

    /// The same circle moved to a new center.
    pub fn moved_to(&self, x: i32, y: i32) -> Self {
        Self { x, y, ..*self }
    }
}

pub(crate) fn center_distance(a: (i32, i32), b: (i32, i32)) -> f64 {
    let dx = a.0 as f64 - b.0 as f64;
    let dy = a.1 as f64 - b.1 as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub background: Rgb<u8>,
    pub circles: Vec<Circle>,
}

impl Field {
    pub fn new(background: Rgb<u8>, circles: Vec<Circle>) -> Self {
        Self {
            background,
            circles,
        }
    }

    pub fn empty(background: Rgb<u8>) -> Self {
        Self::new(background, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    /// Every pair of circles whose edges are closer than `min_distance`.
    pub fn crowded_pairs(&self, min_distance: u32) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.circles.iter().enumerate() {
            for (j, b) in self.circles.iter().enumerate().skip(i + 1) {
                if a.distance_to(b) < a.required_separation(b, min_distance) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}
