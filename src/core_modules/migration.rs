// THEORY:
// Migration advances a field by one tick. Every circle drifts by a fixed
// vector, re-enters near the bottom edge when it leaves through the right or
// top edge, and is nudged away from a circle it landed on.
//
// Key architectural principles:
// 1.  **Pure Step**: `migrate` reads only the previous field and returns a new
//     one. There is no history and no hidden state between ticks.
// 2.  **Single Re-entry Point**: Both exit conditions share one relocation
//     formula, `x = (x mod W) - (y mod H)`, `y = H - inset`. The axes are not
//     wrapped independently and `x` can come out negative. Circles that end up
//     off-canvas keep drifting until the next exit sends them back.
// 3.  **Order-Dependent Correction**: A circle is compared only against the
//     circles that already finished this tick, in field order. Under
//     `CollisionPolicy::FirstContact` the first contact yields one push and
//     nothing else is re-checked, so overlaps can survive a tick.

use crate::core_modules::circle::{Canvas, Circle, Field, center_distance};
use crate::core_modules::placement::MIN_DISTANCE;
use crate::error::FieldResult;
use std::str::FromStr;
use tracing::debug;

/// Per-tick displacement applied to every circle.
pub const DRIFT: (i32, i32) = (50, -50);
/// Distance above the bottom edge where wrapped circles re-enter.
pub const WRAP_INSET: i32 = 25;

/// How far the collision pass goes for each circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Push away from the first already-moved circle in contact, then stop.
    #[default]
    FirstContact,
    /// Keep scanning the remaining already-moved circles with the corrected
    /// position, pushing again on each further contact.
    Sweep,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first-contact" | "first_contact" => Ok(Self::FirstContact),
            "sweep" => Ok(Self::Sweep),
            other => Err(format!(
                "unknown collision policy `{other}`, expected `first-contact` or `sweep`"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationConfig {
    pub canvas: Canvas,
    pub drift: (i32, i32),
    pub min_distance: u32,
    pub wrap_inset: i32,
    pub policy: CollisionPolicy,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            drift: DRIFT,
            min_distance: MIN_DISTANCE,
            wrap_inset: WRAP_INSET,
            policy: CollisionPolicy::default(),
        }
    }
}

impl MigrationConfig {
    /// Applies the `Canvas::new` checks to `canvas`.
    pub fn validate(&self) -> FieldResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        Ok(())
    }
}

/// Advances `field` by one tick.
pub fn migrate(field: &Field, config: &MigrationConfig) -> FieldResult<Field> {
    config.validate()?;
    let mut updated: Vec<Circle> = Vec::with_capacity(field.circles.len());

    for circle in &field.circles {
        let (x, y) = wrap(
            circle.x + config.drift.0,
            circle.y + config.drift.1,
            config.canvas,
            config.wrap_inset,
        );
        let (x, y) = resolve_collisions(circle, (x, y), &updated, config);
        updated.push(circle.moved_to(x, y));
    }

    Ok(Field::new(field.background, updated))
}

/// Applies the exit rule to a translated center. `canvas` must be validated.
fn wrap(x: i32, y: i32, canvas: Canvas, inset: i32) -> (i32, i32) {
    let width = canvas.width as i32;
    let height = canvas.height as i32;
    if x >= width || y < 0 {
        (x.rem_euclid(width) - y.rem_euclid(height), height - inset)
    } else {
        (x, y)
    }
}

fn resolve_collisions(
    circle: &Circle,
    mut position: (i32, i32),
    updated: &[Circle],
    config: &MigrationConfig,
) -> (i32, i32) {
    for existing in updated {
        let required = circle.required_separation(existing, config.min_distance);
        if center_distance(position, (existing.x, existing.y)) >= required {
            continue;
        }

        let pushed = push_out(position, existing, required);
        debug!(
            from_x = position.0,
            from_y = position.1,
            to_x = pushed.0,
            to_y = pushed.1,
            "collision corrected"
        );
        position = pushed;

        if config.policy == CollisionPolicy::FirstContact {
            break;
        }
    }
    position
}

/// Places `position` exactly `distance` away from `anchor`, along the line from
/// `anchor` to `position`. Coincident centers push along +x.
fn push_out(position: (i32, i32), anchor: &Circle, distance: f64) -> (i32, i32) {
    let dx = (position.0 - anchor.x) as f64;
    let dy = (position.1 - anchor.y) as f64;
    let direction = dy.atan2(dx);
    (
        anchor.x + (distance * direction.cos()) as i32,
        anchor.y + (distance * direction.sin()) as i32,
    )
}
