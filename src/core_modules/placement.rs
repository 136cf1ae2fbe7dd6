// THEORY:
// Initial placement is rejection sampling over the grid intersections. Each
// circle draws an anchor, a radius and a color, and is kept only if its edge
// stays at least `min_distance` away from every circle placed before it.
//
// Key architectural principles:
// 1.  **Bounded Effort**: Every circle gets a fixed attempt budget. Running
//     out is an expected outcome on crowded canvases, so it is reported as
//     `PlacementOutcome::Skipped` rather than an error.
// 2.  **Injected Randomness**: The caller owns the RNG. A seeded RNG
//     reproduces the same field exactly, which is what the tests lean on.
// 3.  **Seeded Identity**: The background never comes from the RNG. It is a
//     hash of the seed identifier, so two runs with the same identifier share
//     a background even when their circles differ.

use crate::core_modules::circle::{Canvas, Circle, Field, RadiusRange};
use crate::core_modules::color_hash::{grid_line_color, hash_color};
use crate::core_modules::grid_index::{GRID_CELL, GridIndex};
use crate::error::{FieldError, FieldResult};
use image::Rgb;
use rand::Rng;
use tracing::{debug, warn};

pub const MIN_DISTANCE: u32 = 100;
pub const MAX_ATTEMPTS: u32 = 1000;
pub const DEFAULT_CIRCLE_COUNT: usize = 5;

/// Tunables for a single placement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementConfig {
    pub canvas: Canvas,
    pub grid_cell: u32,
    pub circle_count: usize,
    /// Minimum gap between two circle edges.
    pub min_distance: u32,
    pub radius_range: RadiusRange,
    pub max_attempts: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            grid_cell: GRID_CELL,
            circle_count: DEFAULT_CIRCLE_COUNT,
            min_distance: MIN_DISTANCE,
            radius_range: RadiusRange::default(),
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl PlacementConfig {
    pub fn validate(&self) -> FieldResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        self.radius_range.validate()?;
        if self.grid_cell == 0 {
            return Err(FieldError::invalid("grid cell size must be positive"));
        }
        if self.max_attempts == 0 {
            return Err(FieldError::invalid("placement needs at least one attempt per circle"));
        }
        Ok(())
    }
}

/// What happened to one requested circle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    Placed(Circle),
    /// The attempt budget ran out before a clear spot turned up.
    Skipped { attempts: u32 },
}

/// The result of a placement run: the new field plus a per-circle account.
#[derive(Debug, Clone)]
pub struct Placement {
    pub field: Field,
    pub outcomes: Vec<PlacementOutcome>,
    pub grid_color: Rgb<u8>,
}

impl Placement {
    pub fn placed_count(&self) -> usize {
        self.field.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PlacementOutcome::Skipped { .. }))
            .count()
    }
}

/// Builds the initial field for `seed`.
pub fn place<R: Rng>(
    config: &PlacementConfig,
    seed: &str,
    rng: &mut R,
) -> FieldResult<Placement> {
    config.validate()?;

    let background = hash_color(seed);
    let grid = GridIndex::new(config.canvas, config.grid_cell)?;
    let mut circles: Vec<Circle> = Vec::with_capacity(config.circle_count);
    let mut outcomes = Vec::with_capacity(config.circle_count);

    for index in 0..config.circle_count {
        let outcome = place_one(config, &grid, &circles, rng);
        match &outcome {
            PlacementOutcome::Placed(circle) => {
                debug!(index, x = circle.x, y = circle.y, radius = circle.radius, "circle placed");
                circles.push(*circle);
            }
            PlacementOutcome::Skipped { attempts } => {
                warn!(index, attempts, "max attempts reached, unable to place circle without intersection");
            }
        }
        outcomes.push(outcome);
    }

    Ok(Placement {
        field: Field::new(background, circles),
        outcomes,
        grid_color: grid_line_color(background),
    })
}

fn place_one<R: Rng>(
    config: &PlacementConfig,
    grid: &GridIndex,
    placed: &[Circle],
    rng: &mut R,
) -> PlacementOutcome {
    let anchors = grid.anchors();
    for _ in 0..config.max_attempts {
        let (x, y) = anchors[rng.random_range(0..anchors.len())];
        let radius = rng.random_range(config.radius_range.min..=config.radius_range.max);
        let color = Rgb([rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>()]);
        let candidate = Circle::new(x, y, radius, color);

        let clear = placed.iter().all(|existing| {
            candidate.distance_to(existing) >= candidate.required_separation(existing, config.min_distance)
        });
        if clear {
            return PlacementOutcome::Placed(candidate);
        }
    }
    PlacementOutcome::Skipped {
        attempts: config.max_attempts,
    }
}
