// THEORY:
// This file is the main entry point for the `circle_field` library crate.
// It exposes the `FieldService` and its ticker as the high-level interface,
// while the geometric engines (`core_modules`) stay usable on their own for
// anyone who wants to place or migrate a field without the service around it.
//
// Data flows leaf to root: `color_hash` and `grid_index` feed `placement`,
// which builds the initial `Field`; `migration` advances it one tick at a
// time; `renderer` paints it; `field_service` owns it and `ticker` drives it.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod field_service;
pub mod frame_bus;
pub mod ticker;

pub use config::FieldConfig;
pub use core_modules::circle::{Canvas, Circle, Field, RadiusRange};
pub use core_modules::color_hash::hash_color;
pub use core_modules::migration::{CollisionPolicy, MigrationConfig, migrate};
pub use core_modules::placement::{Placement, PlacementConfig, PlacementOutcome, place};
pub use core_modules::renderer::render;
pub use error::{FieldError, FieldResult};
pub use field_service::{FieldFrame, FieldService};
pub use frame_bus::{FrameBus, FramePacket};
pub use ticker::{TickerHandle, TickerState, spawn_ticker};
