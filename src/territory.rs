//! Hex territory: grid ownership, unlock-by-payment, and fog-of-war reveal.
//!
//! The engine-free core lives in [`coords`], [`tile`], [`grid`], [`payment`] and
//! [`map_data`]. This module wires it into the app: startup builds the grid,
//! queued visual commands drive the hex face entities, and grid events are
//! re-emitted as [`TerritoryEvent`] messages.

pub mod coords;
mod entities;
pub mod grid;
pub mod map_data;
pub mod payment;
pub mod scatter;
mod startup_systems;
mod systems;
pub mod tile;

pub use coords::{HexCoord, HexMetrics};
pub use entities::HexFace;
pub use grid::{HexGrid, NullVisuals, TerritoryEvent, TileVisual, VisualSink};
pub use map_data::{HexMapData, MapFileError};
pub use payment::PaymentController;

use bevy::prelude::*;

use crate::GameState;
use crate::inventory::Backpack;
use scatter::SpawnScatter;

/// Nested configuration for the territory subsystem.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct TerritoryConfig {
    /// Procedural layout and cell size.
    pub grid: GridSettings,
    /// Auto-payment rate and reach.
    pub payment: PaymentSettings,
    /// Reveal animation timing.
    pub reveal: RevealSettings,
    /// Authored map to load instead of generating one.
    pub map_path: Option<String>,
    /// Background clear color.
    pub clear_color: Color,
}

/// Grid layout and spawn scatter parameters.
#[derive(Clone, Debug, Reflect)]
pub struct GridSettings {
    /// Half-width of the square procedural window around the origin.
    pub radius: i32,
    /// Center-to-corner radius of one hex in world units.
    pub hex_size: f32,
    /// Face mesh radius as a fraction of `hex_size`, leaving a seam between faces.
    pub face_scale: f32,
    /// Seed for the resource scatter noise.
    pub scatter_seed: u32,
    /// Octaves for the resource scatter noise.
    pub scatter_octaves: usize,
    /// Spatial scale divisor for scatter sampling.
    pub scatter_scale: f64,
    /// Upper bound of scattered nodes per hex.
    pub max_spawns_per_hex: u32,
}

/// Auto-payment parameters.
#[derive(Clone, Debug, Reflect)]
pub struct PaymentSettings {
    /// Single-unit payments per second.
    pub payment_rate: f64,
    /// Ground distance from the player within which tiles are paid.
    pub detection_radius: f32,
}

/// Reveal animation parameters.
#[derive(Clone, Debug, Reflect)]
pub struct RevealSettings {
    /// Delay between successive faces of one reveal batch, in seconds.
    pub stagger: f32,
    /// Grow-in duration of a revealed face, in seconds.
    pub appear_duration: f32,
}

impl Default for TerritoryConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings {
                radius: 3,
                hex_size: 5.0,
                face_scale: 0.95,
                scatter_seed: 42,
                scatter_octaves: 3,
                scatter_scale: 25.0,
                max_spawns_per_hex: 3,
            },
            payment: PaymentSettings {
                payment_rate: 5.0,
                detection_radius: 6.0,
            },
            reveal: RevealSettings {
                stagger: 0.08,
                appear_duration: 0.35,
            },
            map_path: None,
            clear_color: Color::srgb(0.05, 0.06, 0.08),
        }
    }
}

impl GridSettings {
    /// Cell dimensions for these settings.
    pub fn metrics(&self) -> HexMetrics {
        HexMetrics::new(self.hex_size)
    }

    /// Resource scatter for procedural grids.
    pub fn scatter(&self) -> SpawnScatter {
        SpawnScatter::new(
            self.scatter_seed,
            self.scatter_octaves,
            self.scatter_scale,
            self.max_spawns_per_hex,
        )
    }
}

/// Generates the procedural grid described by `settings` into `grid`.
pub fn generate_procedural(settings: &GridSettings, grid: &mut HexGrid) {
    grid.generate(settings.radius, Some(&settings.scatter()));
}

/// Territory plugin: grid construction at startup, payment and face updates per frame.
pub struct TerritoryPlugin(pub TerritoryConfig);

impl Plugin for TerritoryPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<TerritoryConfig>()
            .register_type::<entities::HexFace>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(self.0.clear_color))
            .add_message::<TerritoryEvent>()
            .init_resource::<entities::HexFaces>()
            .init_resource::<Backpack>()
            .add_systems(
                Startup,
                (startup_systems::build_territory, startup_systems::spawn_light),
            )
            .add_systems(
                Update,
                (
                    systems::pay_for_nearby_hex.run_if(in_state(GameState::Running)),
                    systems::forward_territory_events,
                    systems::log_territory_events,
                    systems::apply_visual_commands,
                    systems::animate_appear,
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_procedural_grid() {
        let cfg = TerritoryConfig::default();
        let mut grid = HexGrid::new(cfg.grid.metrics(), NullVisuals);
        generate_procedural(&cfg.grid, &mut grid);
        assert_eq!(grid.len(), 49);
        assert_eq!(grid.get_spawn_data(HexCoord::ORIGIN).len(), 3);
        assert_eq!(grid.get_unlockable_tiles().len(), 6);
    }
}
