//! Simulation events
//!
//! One [`GameEvent`] summarizes the most significant thing that happened in
//! a tick. The scene keeps only the latest one; there is no queue.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::creature::{CreatureId, CreatureKind};
use super::power_up::{PowerUpId, PowerUpKind};

/// What a player-creature collision did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionOutcome {
    /// The player ate the creature
    Consumed {
        score_gained: u64,
        power_gained: u32,
        lives_gained: u32,
    },
    /// The creature was too big; the player lost a life
    Damaged { lives_left: u32 },
    /// The creature was too big, but the player was still recovering
    Debounced,
}

/// Event tag without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEventKind {
    None,
    Collision,
    PowerUp,
    CreatureAdded,
    CreatureRemoved,
    GameOver,
    GameExit,
    NewLevel,
}

/// The most significant occurrence of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameEvent {
    #[default]
    None,
    /// The player touched a creature (the player is always the other party)
    Collision {
        creature: CreatureId,
        kind: CreatureKind,
        outcome: CollisionOutcome,
    },
    /// The player picked up a power-up
    PowerUp {
        power_up: PowerUpId,
        kind: PowerUpKind,
    },
    CreatureAdded {
        creature: CreatureId,
        kind: CreatureKind,
    },
    CreatureRemoved {
        creature: CreatureId,
        kind: CreatureKind,
    },
    /// The player ran out of lives
    GameOver,
    /// The run finished: the last level was completed
    GameExit,
    /// Play moved on to level `level`
    NewLevel { level: usize },
}

impl GameEvent {
    pub fn kind(&self) -> GameEventKind {
        match self {
            GameEvent::None => GameEventKind::None,
            GameEvent::Collision { .. } => GameEventKind::Collision,
            GameEvent::PowerUp { .. } => GameEventKind::PowerUp,
            GameEvent::CreatureAdded { .. } => GameEventKind::CreatureAdded,
            GameEvent::CreatureRemoved { .. } => GameEventKind::CreatureRemoved,
            GameEvent::GameOver => GameEventKind::GameOver,
            GameEvent::GameExit => GameEventKind::GameExit,
            GameEvent::NewLevel { .. } => GameEventKind::NewLevel,
        }
    }

    /// Rank used when several things happen in one tick
    pub fn priority(&self) -> u8 {
        match self.kind() {
            GameEventKind::None => 0,
            GameEventKind::CreatureAdded | GameEventKind::CreatureRemoved => 1,
            GameEventKind::NewLevel => 2,
            GameEventKind::Collision | GameEventKind::PowerUp => 3,
            GameEventKind::GameExit => 4,
            GameEventKind::GameOver => 5,
        }
    }

    /// Keep whichever event matters more; ties keep `self`
    pub fn most_significant(self, other: GameEvent) -> GameEvent {
        if other.priority() > self.priority() {
            other
        } else {
            self
        }
    }

    /// Creature referenced by the event, if any
    pub fn creature(&self) -> Option<CreatureId> {
        match *self {
            GameEvent::Collision { creature, .. }
            | GameEvent::CreatureAdded { creature, .. }
            | GameEvent::CreatureRemoved { creature, .. } => Some(creature),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, GameEvent::None)
    }

    pub fn is_collision_event(&self) -> bool {
        matches!(self, GameEvent::Collision { .. })
    }

    pub fn is_power_up_event(&self) -> bool {
        matches!(self, GameEvent::PowerUp { .. })
    }

    pub fn is_creature_added_event(&self) -> bool {
        matches!(self, GameEvent::CreatureAdded { .. })
    }

    pub fn is_creature_removed_event(&self) -> bool {
        matches!(self, GameEvent::CreatureRemoved { .. })
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, GameEvent::GameOver)
    }

    pub fn is_game_exit(&self) -> bool {
        matches!(self, GameEvent::GameExit)
    }

    pub fn is_new_level(&self) -> bool {
        matches!(self, GameEvent::NewLevel { .. })
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::None => write!(f, "none"),
            GameEvent::Collision {
                creature,
                kind,
                outcome,
            } => match outcome {
                CollisionOutcome::Consumed { score_gained, .. } => write!(
                    f,
                    "player ate {} #{} (+{})",
                    kind.as_str(),
                    creature.0,
                    score_gained
                ),
                CollisionOutcome::Damaged { lives_left } => write!(
                    f,
                    "player bitten by {} #{} ({} lives left)",
                    kind.as_str(),
                    creature.0,
                    lives_left
                ),
                CollisionOutcome::Debounced => write!(
                    f,
                    "player brushed {} #{} while recovering",
                    kind.as_str(),
                    creature.0
                ),
            },
            GameEvent::PowerUp { power_up, kind } => {
                write!(f, "player picked up {} #{}", kind.as_str(), power_up.0)
            }
            GameEvent::CreatureAdded { creature, kind } => {
                write!(f, "{} #{} added", kind.as_str(), creature.0)
            }
            GameEvent::CreatureRemoved { creature, kind } => {
                write!(f, "{} #{} removed", kind.as_str(), creature.0)
            }
            GameEvent::GameOver => write!(f, "game over"),
            GameEvent::GameExit => write!(f, "all levels complete"),
            GameEvent::NewLevel { level } => write!(f, "level {}", level),
        }
    }
}
