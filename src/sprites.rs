//! Sprite boundary
//!
//! The simulation never touches pixels. It asks a [`SpriteSource`] for an
//! opaque handle when an entity is created and forwards that handle to a
//! host-provided [`Canvas`] when drawing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{CreatureKind, PowerUpKind};

/// Opaque reference to a drawable asset owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteHandle(pub u32);

/// Lookup from entity kind to drawable asset
pub trait SpriteSource {
    fn creature_sprite(&self, kind: CreatureKind) -> Option<SpriteHandle>;
    fn power_up_sprite(&self, kind: PowerUpKind) -> Option<SpriteHandle>;
}

/// Placeholder source for headless runs: every lookup misses
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSprites;

impl SpriteSource for NullSprites {
    fn creature_sprite(&self, _kind: CreatureKind) -> Option<SpriteHandle> {
        None
    }

    fn power_up_sprite(&self, _kind: PowerUpKind) -> Option<SpriteHandle> {
        None
    }
}

/// Table of handles registered by the host after it loads its assets
#[derive(Debug, Clone, Default)]
pub struct SpriteTable {
    creatures: Vec<(CreatureKind, SpriteHandle)>,
    power_ups: Vec<(PowerUpKind, SpriteHandle)>,
}

impl SpriteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the sprite for a creature kind
    pub fn with_creature(mut self, kind: CreatureKind, sprite: SpriteHandle) -> Self {
        self.creatures.retain(|(k, _)| *k != kind);
        self.creatures.push((kind, sprite));
        self
    }

    /// Register (or replace) the sprite for a power-up kind
    pub fn with_power_up(mut self, kind: PowerUpKind, sprite: SpriteHandle) -> Self {
        self.power_ups.retain(|(k, _)| *k != kind);
        self.power_ups.push((kind, sprite));
        self
    }
}

impl SpriteSource for SpriteTable {
    fn creature_sprite(&self, kind: CreatureKind) -> Option<SpriteHandle> {
        self.creatures
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, sprite)| *sprite)
    }

    fn power_up_sprite(&self, kind: PowerUpKind) -> Option<SpriteHandle> {
        self.power_ups
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, sprite)| *sprite)
    }
}

/// Drawing surface implemented by the host renderer
pub trait Canvas {
    fn draw_sprite(&mut self, sprite: SpriteHandle, pos: Vec2, flipped: bool);
}
