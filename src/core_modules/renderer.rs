// THEORY:
// The renderer turns a `Field` into pixels. It is a thin layer over raw
// `RgbImage` writes: fill, outline every grid cell, then fill every disc.
// Draw order is fixed so the grid always sits underneath the circles.

use crate::core_modules::circle::{Canvas, Circle, Field};
use crate::core_modules::grid_index::GridIndex;
use crate::error::{FieldError, FieldResult};
use image::{Rgb, RgbImage};

const CHANNELS: usize = 3;

/// Paints `field` onto a fresh raster.
pub fn render(
    field: &Field,
    canvas: Canvas,
    grid: &GridIndex,
    grid_color: Rgb<u8>,
) -> FieldResult<RgbImage> {
    let mut raster = allocate(canvas, field.background)?;
    draw_grid(&mut raster, grid, grid_color);
    for circle in &field.circles {
        fill_disc(&mut raster, circle);
    }
    Ok(raster)
}

fn allocate(canvas: Canvas, background: Rgb<u8>) -> FieldResult<RgbImage> {
    let len = (canvas.width as usize)
        .checked_mul(canvas.height as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
        .ok_or_else(|| {
            FieldError::RenderFailure(format!(
                "{}x{} raster overflows the address space",
                canvas.width, canvas.height
            ))
        })?;

    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|e| {
        FieldError::RenderFailure(format!("cannot allocate {len} byte raster: {e}"))
    })?;
    for _ in 0..len / CHANNELS {
        buffer.extend_from_slice(&background.0);
    }

    RgbImage::from_raw(canvas.width, canvas.height, buffer).ok_or_else(|| {
        FieldError::RenderFailure("raster buffer does not match canvas size".to_string())
    })
}

/// Outlines the cell `[x, x + cell - 1] x [y, y + cell - 1]` for every anchor.
fn draw_grid(raster: &mut RgbImage, grid: &GridIndex, color: Rgb<u8>) {
    let last = grid.cell() as i64 - 1;
    for &(x, y) in grid.anchors() {
        let (x0, y0) = (x as i64, y as i64);
        let (x1, y1) = (x0 + last, y0 + last);
        for px in x0..=x1 {
            put(raster, px, y0, color);
            put(raster, px, y1, color);
        }
        for py in y0..=y1 {
            put(raster, x0, py, color);
            put(raster, x1, py, color);
        }
    }
}

fn fill_disc(raster: &mut RgbImage, circle: &Circle) {
    let r = circle.radius as i64;
    let (cx, cy) = (circle.x as i64, circle.y as i64);
    let r_sq = r * r;

    // Clip the bounding box to the raster before scanning.
    let x0 = (cx - r).max(0);
    let y0 = (cy - r).max(0);
    let x1 = (cx + r).min(raster.width() as i64 - 1);
    let y1 = (cy + r).min(raster.height() as i64 - 1);

    for py in y0..=y1 {
        let dy = py - cy;
        for px in x0..=x1 {
            let dx = px - cx;
            if dx * dx + dy * dy <= r_sq {
                raster.put_pixel(px as u32, py as u32, circle.color);
            }
        }
    }
}

fn put(raster: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < raster.width() as i64 && y < raster.height() as i64 {
        raster.put_pixel(x as u32, y as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::color_hash::grid_line_color;
    use crate::core_modules::grid_index::GRID_CELL;

    const BG: Rgb<u8> = Rgb([10, 20, 30]);
    const GRID: Rgb<u8> = Rgb([35, 45, 55]);
    const DISC: Rgb<u8> = Rgb([200, 100, 0]);

    fn default_grid() -> GridIndex {
        GridIndex::new(Canvas::default(), GRID_CELL).unwrap()
    }

    #[test]
    fn empty_field_is_background_and_grid() {
        let raster = render(&Field::empty(BG), Canvas::default(), &default_grid(), GRID).unwrap();
        assert_eq!(raster.dimensions(), (1024, 512));
        // Cell edges at 0 and 49, interior at 25.
        assert_eq!(*raster.get_pixel(0, 25), GRID);
        assert_eq!(*raster.get_pixel(49, 25), GRID);
        assert_eq!(*raster.get_pixel(50, 25), GRID);
        assert_eq!(*raster.get_pixel(25, 25), BG);
        assert_eq!(*raster.get_pixel(25, 49), GRID);
    }

    #[test]
    fn discs_are_drawn_over_the_grid() {
        let field = Field::new(BG, vec![Circle::new(100, 100, 40, DISC)]);
        let raster = render(&field, Canvas::default(), &default_grid(), GRID).unwrap();
        // (100, 100) is a grid line pixel before the disc covers it.
        assert_eq!(*raster.get_pixel(100, 100), DISC);
        assert_eq!(*raster.get_pixel(100, 140), DISC);
        assert_eq!(*raster.get_pixel(140, 100), DISC);
        assert_eq!(*raster.get_pixel(141, 101), BG);
        // Bounding box corner lies outside the disc.
        assert_eq!(*raster.get_pixel(130, 130), BG);
    }

    #[test]
    fn off_canvas_discs_are_clipped() {
        let field = Field::new(
            BG,
            vec![Circle::new(-426, 487, 45, DISC), Circle::new(-20, 490, 45, DISC)],
        );
        let raster = render(&field, Canvas::default(), &default_grid(), GRID).unwrap();
        assert_eq!(*raster.get_pixel(0, 490), DISC);
        assert_eq!(*raster.get_pixel(20, 500), DISC);
    }

    #[test]
    fn later_circles_paint_over_earlier_ones() {
        let field = Field::new(
            BG,
            vec![Circle::new(300, 300, 40, DISC), Circle::new(310, 300, 40, GRID)],
        );
        let raster = render(&field, Canvas::default(), &default_grid(), grid_line_color(BG)).unwrap();
        assert_eq!(*raster.get_pixel(305, 300), GRID);
    }

    #[test]
    fn unaddressable_canvas_is_a_render_failure() {
        let canvas = Canvas {
            width: u32::MAX,
            height: u32::MAX,
        };
        let grid = GridIndex::new(Canvas::default(), GRID_CELL).unwrap();
        let result = render(&Field::empty(BG), canvas, &grid, GRID);
        assert!(matches!(result, Err(FieldError::RenderFailure(_))));
    }
}
