// THEORY:
// The grid is the skeleton the field is drawn on. Its intersections double as
// the candidate pool for initial circle placement, and its cells are what the
// renderer outlines. It is derived from the canvas and a cell size and is
// cheap to rebuild, so nothing holds on to it for long.

use crate::core_modules::circle::Canvas;
use crate::error::{FieldError, FieldResult};

pub const GRID_CELL: u32 = 50;

/// Grid-aligned anchor points for a canvas, in column-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridIndex {
    cell: u32,
    anchors: Vec<(i32, i32)>,
}

impl GridIndex {
    pub fn new(canvas: Canvas, cell: u32) -> FieldResult<Self> {
        if cell == 0 {
            return Err(FieldError::invalid("grid cell size must be positive"));
        }
        let canvas = Canvas::new(canvas.width, canvas.height)?;

        let columns = canvas.width.div_ceil(cell);
        let rows = canvas.height.div_ceil(cell);
        let mut anchors = Vec::with_capacity(columns as usize * rows as usize);
        for x in (0..canvas.width).step_by(cell as usize) {
            for y in (0..canvas.height).step_by(cell as usize) {
                anchors.push((x as i32, y as i32));
            }
        }

        Ok(Self { cell, anchors })
    }

    pub fn cell(&self) -> u32 {
        self.cell
    }

    pub fn anchors(&self) -> &[(i32, i32)] {
        &self.anchors
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
