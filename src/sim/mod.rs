//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by creature id)
//! - No rendering or platform dependencies

pub mod aquarium;
pub mod collision;
pub mod creature;
pub mod event;
pub mod level;
pub mod power_up;
pub mod tick;

pub use aquarium::{Aquarium, AquariumSnapshot};
pub use collision::{
    Collider, check_collision, detect_aquarium_collisions, detect_power_up_collisions,
};
pub use creature::{
    Bounce, Creature, CreatureId, CreatureKind, Movement, PlayerCreature, SprintPhase,
    reflect_in_bounds,
};
pub use event::{CollisionOutcome, GameEvent, GameEventKind};
pub use level::{AquariumLevel, LevelState, PopulationNode, Repopulation};
pub use power_up::{PowerUp, PowerUpId, PowerUpKind};
pub use tick::{AquariumScene, FrameGate, GamePhase, TickInput, tick};
