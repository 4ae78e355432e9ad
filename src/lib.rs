//! Aquarium - a populated fish tank arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (creatures, levels, collisions, events)
//! - `scene`: Scene table and transitions driven by simulation events
//! - `sprites`: Opaque sprite handles and the drawing boundary
//! - `settings`: Data-driven tuning and level scripts

pub mod scene;
pub mod settings;
pub mod sim;
pub mod sprites;

pub use scene::{SceneKind, SceneManager};
pub use settings::{ConfigError, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (the host paces frames at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Arena defaults
    pub const ARENA_WIDTH: f32 = 1024.0;
    pub const ARENA_HEIGHT: f32 = 768.0;
    pub const MAX_POPULATION: usize = 100;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 300.0;
    pub const PLAYER_RADIUS: f32 = 10.0;
    pub const PLAYER_LIVES: u32 = 3;
    pub const PLAYER_POWER: u32 = 1;
    /// Player bounds are the arena shrunk by this much on each axis
    pub const PLAYER_BOUNDS_MARGIN: f32 = 20.0;

    /// Frames of damage immunity after being hit (3 seconds)
    pub const DAMAGE_DEBOUNCE_FRAMES: u32 = 3 * 60;

    /// Base swim speed for non-player creatures (pixels/s)
    pub const NPC_BASE_SPEED: f32 = 120.0;

    /// Shark sprint cycle
    pub const SHARK_BOOST_FRAMES: u32 = 10;
    pub const SHARK_REST_FRAMES: u32 = 5;

    /// Power-up pickups
    pub const POWER_UP_RADIUS: f32 = 15.0;
    pub const POWER_UP_SPAWN_CHANCE: f64 = 0.02;
}

/// Unit heading for an angle in radians
#[inline]
pub fn heading_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Number of multiples of `step` crossed going from `before` to `after`
///
/// A step of zero never triggers.
#[inline]
pub fn steps_crossed(before: u64, after: u64, step: u64) -> u64 {
    if step == 0 || after <= before {
        return 0;
    }
    after / step - before / step
}
