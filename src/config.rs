// THEORY:
// `FieldConfig` is the single source of tunables for a running field. Its
// `Default` carries the canonical constants (1024x512 canvas, 50px grid, five
// circles seeded from "A12345", a ten second tick). A handful of values can be
// overridden from `CF_*` environment variables at startup.
//
// Overrides are read through a lookup closure instead of `std::env` directly
// so that parsing can be exercised without mutating the process environment.

use crate::core_modules::circle::{Canvas, RadiusRange};
use crate::core_modules::grid_index::GRID_CELL;
use crate::core_modules::migration::{CollisionPolicy, DRIFT, MigrationConfig, WRAP_INSET};
use crate::core_modules::placement::{DEFAULT_CIRCLE_COUNT, MAX_ATTEMPTS, MIN_DISTANCE, PlacementConfig};
use crate::error::{FieldError, FieldResult};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SEED: &str = "A12345";
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(10);

pub const ENV_SEED: &str = "CF_SEED";
pub const ENV_CIRCLE_COUNT: &str = "CF_CIRCLE_COUNT";
pub const ENV_MIN_DISTANCE: &str = "CF_MIN_DISTANCE";
pub const ENV_TICK_SECS: &str = "CF_TICK_SECS";
pub const ENV_RNG_SEED: &str = "CF_RNG_SEED";
pub const ENV_COLLISION: &str = "CF_COLLISION";

/// Configuration for a `FieldService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    /// Opaque identifier the background color is derived from.
    pub seed: String,
    pub circle_count: usize,
    pub canvas: Canvas,
    pub grid_cell: u32,
    /// Minimum gap between circle edges, enforced at placement and used for correction on tick.
    pub min_distance: u32,
    pub radius_range: RadiusRange,
    pub max_attempts: u32,
    pub drift: (i32, i32),
    pub wrap_inset: i32,
    pub collision_policy: CollisionPolicy,
    pub tick_period: Duration,
    /// Fixed RNG seed for reproducible placement. `None` draws from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED.to_string(),
            circle_count: DEFAULT_CIRCLE_COUNT,
            canvas: Canvas::default(),
            grid_cell: GRID_CELL,
            min_distance: MIN_DISTANCE,
            radius_range: RadiusRange::default(),
            max_attempts: MAX_ATTEMPTS,
            drift: DRIFT,
            wrap_inset: WRAP_INSET,
            collision_policy: CollisionPolicy::default(),
            tick_period: DEFAULT_TICK_PERIOD,
            rng_seed: None,
        }
    }
}

impl FieldConfig {
    /// Defaults with any `CF_*` overrides from the process environment applied.
    pub fn from_env() -> FieldResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides taken from `lookup`. Empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> FieldResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(seed) = value(ENV_SEED) {
            config.seed = seed;
        }
        if let Some(raw) = value(ENV_CIRCLE_COUNT) {
            config.circle_count = parse(ENV_CIRCLE_COUNT, &raw)?;
        }
        if let Some(raw) = value(ENV_MIN_DISTANCE) {
            config.min_distance = parse(ENV_MIN_DISTANCE, &raw)?;
        }
        if let Some(raw) = value(ENV_TICK_SECS) {
            config.tick_period = Duration::from_secs(parse(ENV_TICK_SECS, &raw)?);
        }
        if let Some(raw) = value(ENV_RNG_SEED) {
            config.rng_seed = Some(parse(ENV_RNG_SEED, &raw)?);
        }
        if let Some(raw) = value(ENV_COLLISION) {
            config.collision_policy = raw
                .parse::<CollisionPolicy>()
                .map_err(|e: String| FieldError::invalid(format!("{ENV_COLLISION}: {e}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FieldResult<()> {
        self.placement().validate()?;
        self.migration().validate()?;
        if self.tick_period.is_zero() {
            return Err(FieldError::invalid("tick period must be positive"));
        }
        Ok(())
    }

    pub fn placement(&self) -> PlacementConfig {
        PlacementConfig {
            canvas: self.canvas,
            grid_cell: self.grid_cell,
            circle_count: self.circle_count,
            min_distance: self.min_distance,
            radius_range: self.radius_range,
            max_attempts: self.max_attempts,
        }
    }

    pub fn migration(&self) -> MigrationConfig {
        MigrationConfig {
            canvas: self.canvas,
            drift: self.drift,
            min_distance: self.min_distance,
            wrap_inset: self.wrap_inset,
            policy: self.collision_policy,
        }
    }
}

fn parse<T>(key: &str, raw: &str) -> FieldResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| FieldError::invalid(format!("{key}={raw}: {e}")))
}
