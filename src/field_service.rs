// THEORY:
// The `field_service` module is the top-level API of the generator. It owns the
// live field and is the only place where it changes. Downstream code (a
// transport layer, a test, the binary) interacts with two operations only:
// `snapshot`, which renders the current field, and `tick`, which advances it.
//
// Key architectural principles:
// 1.  **Immutable Frames, Swapped Whole**: The current state is an
//     `Arc<FieldFrame>`. Readers clone the `Arc` and drop the lock at once, so
//     a reader can never observe half of one field and half of another.
// 2.  **Compute Outside the Lock**: `tick` migrates and renders on its own copy
//     and takes the write lock only to swap the pointer.
// 3.  **Single Writer**: A separate writer mutex serializes ticks, so two
//     overlapping ticks cannot both migrate the same frame and lose a step.
// 4.  **Non-Fatal Publishing**: Rendering for the frame bus can fail without
//     stopping the tick. The new field is still installed and the failure is
//     logged.

use crate::config::FieldConfig;
use crate::core_modules::circle::{Canvas, Field};
use crate::core_modules::grid_index::GridIndex;
use crate::core_modules::migration::{MigrationConfig, migrate};
use crate::core_modules::placement::{Placement, PlacementOutcome, place};
use crate::core_modules::renderer::render;
use crate::error::FieldResult;
use crate::frame_bus::{FrameBus, FramePacket};
use image::{Rgb, RgbImage};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

type RenderFn = fn(&Field, Canvas, &GridIndex, Rgb<u8>) -> FieldResult<RgbImage>;

/// One generation of the field, stamped with when it was produced.
#[derive(Debug, Clone)]
pub struct FieldFrame {
    /// 0 for the initial placement, +1 per tick.
    pub generation: u64,
    pub field: Field,
    pub generated_at: SystemTime,
}

/// Owner of the live field.
pub struct FieldService {
    config: FieldConfig,
    migration: MigrationConfig,
    grid: GridIndex,
    grid_color: Rgb<u8>,
    placement_outcomes: Vec<PlacementOutcome>,
    current: RwLock<Arc<FieldFrame>>,
    writer: Mutex<()>,
    bus: FrameBus,
    renderer: RenderFn,
}

impl FieldService {
    /// Places the initial field using an RNG seeded from `config.rng_seed`, or from the OS.
    pub fn from_config(config: FieldConfig) -> FieldResult<Self> {
        let mut rng = match config.rng_seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::from_os_rng(),
        };
        Self::new(config, &mut rng)
    }

    pub fn new<R: Rng>(config: FieldConfig, rng: &mut R) -> FieldResult<Self> {
        config.validate()?;
        let Placement {
            field,
            outcomes,
            grid_color,
        } = place(&config.placement(), &config.seed, rng)?;
        let grid = GridIndex::new(config.canvas, config.grid_cell)?;

        info!(
            seed = %config.seed,
            requested = config.circle_count,
            placed = field.len(),
            "field created"
        );

        let frame = FieldFrame {
            generation: 0,
            field,
            generated_at: SystemTime::now(),
        };

        Ok(Self {
            migration: config.migration(),
            config,
            grid,
            grid_color,
            placement_outcomes: outcomes,
            current: RwLock::new(Arc::new(frame)),
            writer: Mutex::new(()),
            bus: FrameBus::default(),
            renderer: render,
        })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn canvas(&self) -> Canvas {
        self.config.canvas
    }

    pub fn bus(&self) -> &FrameBus {
        &self.bus
    }

    /// Per-circle account of the initial placement, including skipped circles.
    pub fn placement_outcomes(&self) -> &[PlacementOutcome] {
        &self.placement_outcomes
    }

    /// The latest frame. Cheap: clones an `Arc`.
    pub async fn current(&self) -> Arc<FieldFrame> {
        self.current.read().await.clone()
    }

    /// Renders the current field on demand.
    pub async fn snapshot(&self) -> FieldResult<RgbImage> {
        let frame = self.current().await;
        self.render(&frame.field)
    }

    /// Advances the field by one step and publishes the result.
    ///
    /// Only a migration error leaves the current frame in place. A frame that
    /// fails to render is still installed.
    pub async fn tick(&self) -> FieldResult<Arc<FieldFrame>> {
        let _writer = self.writer.lock().await;
        let previous = self.current().await;

        let frame = Arc::new(FieldFrame {
            generation: previous.generation + 1,
            field: migrate(&previous.field, &self.migration)?,
            generated_at: SystemTime::now(),
        });
        *self.current.write().await = frame.clone();

        let crowded = frame.field.crowded_pairs(self.migration.min_distance).len();
        info!(
            generation = frame.generation,
            circles = frame.field.len(),
            crowded,
            "field migrated"
        );

        if self.bus.has_subscribers() {
            match self.render(&frame.field) {
                Ok(raster) => {
                    self.bus
                        .publish(FramePacket::new(frame.generation, frame.generated_at, raster));
                }
                Err(e) => {
                    error!(generation = frame.generation, error = %e, "frame not published");
                }
            }
        }

        Ok(frame)
    }

    fn render(&self, field: &Field) -> FieldResult<RgbImage> {
        (self.renderer)(field, self.config.canvas, &self.grid, self.grid_color)
    }

    #[cfg(test)]
    fn with_renderer(mut self, renderer: RenderFn) -> Self {
        self.renderer = renderer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::color_hash::hash_color;
    use crate::core_modules::placement::MIN_DISTANCE;
    use crate::error::FieldError;

    fn service(rng_seed: u64) -> FieldService {
        let config = FieldConfig {
            rng_seed: Some(rng_seed),
            ..FieldConfig::default()
        };
        FieldService::from_config(config).unwrap()
    }

    #[tokio::test]
    async fn initial_frame_matches_placement() {
        let service = service(1);
        let frame = service.current().await;
        assert_eq!(frame.generation, 0);
        assert_eq!(frame.field.len(), 5);
        assert_eq!(frame.field.background, hash_color("A12345"));
        assert!(frame.field.crowded_pairs(MIN_DISTANCE).is_empty());
        assert_eq!(service.placement_outcomes().len(), 5);
    }

    #[tokio::test]
    async fn same_rng_seed_same_initial_field() {
        let a = service(77).current().await;
        let b = service(77).current().await;
        assert_eq!(a.field, b.field);
    }

    #[tokio::test]
    async fn tick_advances_generation_and_keeps_identity() {
        let service = service(2);
        let before = service.current().await;
        let after = service.tick().await.unwrap();
        assert_eq!(after.generation, 1);
        assert_eq!(service.current().await.generation, 1);
        assert_eq!(after.field.background, before.field.background);
        assert_eq!(after.field, migrate(&before.field, &service.migration).unwrap());
        for (a, b) in before.field.circles.iter().zip(&after.field.circles) {
            assert_eq!((a.radius, a.color), (b.radius, b.color));
        }
    }

    #[tokio::test]
    async fn snapshot_renders_latest_field() {
        let service = service(3);
        service.tick().await.unwrap();
        let frame = service.current().await;
        let raster = service.snapshot().await.unwrap();
        assert_eq!(raster.dimensions(), (1024, 512));
        for circle in &frame.field.circles {
            if !service.canvas().contains(circle.x, circle.y) {
                continue;
            }
            // The topmost disc covering the center wins.
            let expected = frame
                .field
                .circles
                .iter()
                .filter(|c| {
                    let (dx, dy) = ((c.x - circle.x) as i64, (c.y - circle.y) as i64);
                    dx * dx + dy * dy <= (c.radius as i64).pow(2)
                })
                .last()
                .map(|c| c.color);
            assert_eq!(Some(*raster.get_pixel(circle.x as u32, circle.y as u32)), expected);
        }
    }

    #[tokio::test]
    async fn concurrent_ticks_do_not_lose_steps() {
        let service = Arc::new(service(4));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.tick().await.unwrap().generation })
            })
            .collect();
        let mut generations = Vec::new();
        for handle in handles {
            generations.push(handle.await.unwrap());
        }
        generations.sort_unstable();
        assert_eq!(generations, (1..=8).collect::<Vec<_>>());
        assert_eq!(service.current().await.generation, 8);
    }

    #[tokio::test]
    async fn ticks_publish_to_subscribers() {
        let service = service(5);
        let mut rx = service.bus().subscribe();
        service.tick().await.unwrap();
        let packet = rx.recv().await.unwrap();
        assert_eq!(packet.generation, 1);
        assert_eq!((packet.width, packet.height), (1024, 512));
    }

    fn failing_render(_: &Field, _: Canvas, _: &GridIndex, _: Rgb<u8>) -> FieldResult<RgbImage> {
        Err(FieldError::RenderFailure("raster unavailable".to_string()))
    }

    #[tokio::test]
    async fn render_failure_during_tick_still_installs_the_field() {
        let service = service(6).with_renderer(failing_render);
        let mut rx = service.bus().subscribe();
        let before = service.current().await;

        let after = service.tick().await.unwrap();
        assert_eq!(after.generation, 1);
        assert_eq!(after.field, migrate(&before.field, &service.migration).unwrap());
        assert_eq!(service.current().await.generation, 1);
        assert!(matches!(
            rx.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
        assert!(matches!(service.snapshot().await, Err(FieldError::RenderFailure(_))));

        // Later ticks keep going.
        assert_eq!(service.tick().await.unwrap().generation, 2);
    }

    #[test]
    fn invalid_configuration_is_rejected_at_construction() {
        let config = FieldConfig {
            grid_cell: 0,
            ..FieldConfig::default()
        };
        assert!(matches!(
            FieldService::from_config(config),
            Err(FieldError::InvalidConfiguration(_))
        ));
    }
}
