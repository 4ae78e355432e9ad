//! Power-up pickups

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::POWER_UP_RADIUS;
use crate::sprites::SpriteHandle;

/// Stable identifier for a pickup (allocated by the arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PowerUpId(pub u32);

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Restores one life (up to the cap)
    Health,
}

impl PowerUpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Health => "Health",
        }
    }
}

/// A stationary pickup waiting for the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: PowerUpId,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
    #[serde(skip)]
    pub sprite: Option<SpriteHandle>,
}

impl PowerUp {
    pub fn new(id: PowerUpId, kind: PowerUpKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            radius: POWER_UP_RADIUS,
            sprite: None,
        }
    }

    pub fn with_sprite(mut self, sprite: Option<SpriteHandle>) -> Self {
        self.sprite = sprite;
        self
    }
}
