//! Creatures: the player and the non-player fish
//!
//! Every non-player fish is one [`Creature`] record tagged with a
//! [`CreatureKind`]. Behavior differences live in the [`Movement`] policy the
//! kind hands out, so a single `move_within` covers all five species.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sprites::SpriteHandle;

/// Stable identifier for a non-player creature (allocated by the arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(pub u32);

/// Non-player species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureKind {
    NPCreature,
    BiggerFish,
    FastNPCreature,
    NewNemoCreature,
    SharkCreature,
}

impl CreatureKind {
    pub const ALL: [CreatureKind; 5] = [
        CreatureKind::NPCreature,
        CreatureKind::BiggerFish,
        CreatureKind::FastNPCreature,
        CreatureKind::NewNemoCreature,
        CreatureKind::SharkCreature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CreatureKind::NPCreature => "NPCreature",
            CreatureKind::BiggerFish => "BiggerFish",
            CreatureKind::FastNPCreature => "FastNPCreature",
            CreatureKind::NewNemoCreature => "NewNemoCreature",
            CreatureKind::SharkCreature => "SharkCreature",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
    }

    /// Collision radius in pixels
    pub fn collision_radius(&self) -> f32 {
        match self {
            CreatureKind::NPCreature | CreatureKind::NewNemoCreature => 30.0,
            CreatureKind::FastNPCreature => 25.0,
            CreatureKind::BiggerFish => 60.0,
            CreatureKind::SharkCreature => 45.0,
        }
    }

    /// Score value when eaten; also the power needed to eat it safely
    pub fn value(&self) -> u32 {
        match self {
            CreatureKind::NPCreature | CreatureKind::NewNemoCreature => 1,
            CreatureKind::FastNPCreature => 2,
            CreatureKind::SharkCreature => 3,
            CreatureKind::BiggerFish => 5,
        }
    }

    /// Fresh movement policy for a newly spawned creature of this kind
    pub fn movement(&self) -> Movement {
        match self {
            CreatureKind::NPCreature => Movement::Cruise { speed_factor: 1.0 },
            CreatureKind::NewNemoCreature => Movement::Cruise { speed_factor: 1.25 },
            CreatureKind::FastNPCreature => Movement::Cruise { speed_factor: 2.0 },
            CreatureKind::BiggerFish => Movement::Cruise { speed_factor: 0.5 },
            CreatureKind::SharkCreature => Movement::sprint(
                1.5,
                3.0,
                SHARK_BOOST_FRAMES,
                SHARK_REST_FRAMES,
            ),
        }
    }
}

/// Phase of a sprinting swimmer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SprintPhase {
    Boost,
    Rest,
}

/// How a creature's base speed is scaled from frame to frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Movement {
    /// Straight line at a constant multiple of the base speed
    Cruise { speed_factor: f32 },
    /// Alternates boost and rest phases, each lasting a fixed number of frames
    Sprint {
        rest_factor: f32,
        boost_factor: f32,
        boost_frames: u32,
        rest_frames: u32,
        phase: SprintPhase,
        frames_left: u32,
    },
}

impl Movement {
    /// Sprint policy starting in the boost phase
    pub fn sprint(rest_factor: f32, boost_factor: f32, boost_frames: u32, rest_frames: u32) -> Self {
        Movement::Sprint {
            rest_factor,
            boost_factor,
            boost_frames: boost_frames.max(1),
            rest_frames: rest_frames.max(1),
            phase: SprintPhase::Boost,
            frames_left: boost_frames.max(1),
        }
    }

    /// Multiplier applied to base speed this frame
    pub fn speed_factor(&self) -> f32 {
        match *self {
            Movement::Cruise { speed_factor } => speed_factor,
            Movement::Sprint {
                rest_factor,
                boost_factor,
                phase,
                ..
            } => match phase {
                SprintPhase::Boost => boost_factor,
                SprintPhase::Rest => rest_factor,
            },
        }
    }

    /// Current sprint phase (None for cruisers)
    pub fn phase(&self) -> Option<SprintPhase> {
        match *self {
            Movement::Cruise { .. } => None,
            Movement::Sprint { phase, .. } => Some(phase),
        }
    }

    /// Count down one frame, flipping phase when the timer runs out
    fn advance(&mut self) {
        if let Movement::Sprint {
            boost_frames,
            rest_frames,
            ref mut phase,
            ref mut frames_left,
            ..
        } = *self
        {
            *frames_left = frames_left.saturating_sub(1);
            if *frames_left == 0 {
                *phase = match *phase {
                    SprintPhase::Boost => SprintPhase::Rest,
                    SprintPhase::Rest => SprintPhase::Boost,
                };
                *frames_left = match *phase {
                    SprintPhase::Boost => boost_frames,
                    SprintPhase::Rest => rest_frames,
                };
            }
        }
    }
}

/// Which axes were reflected during a bounds check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounce {
    pub x: bool,
    pub y: bool,
}

impl Bounce {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Allowed center range on one axis for a body of `radius` in `[0, extent]`
///
/// When the body is wider than the extent the range collapses to the middle.
#[inline]
fn axis_range(radius: f32, extent: f32) -> (f32, f32) {
    let extent = extent.max(0.0);
    let lo = radius.max(0.0).min(extent / 2.0);
    let hi = (extent - radius.max(0.0)).max(extent / 2.0);
    (lo, hi)
}

fn reflect_axis(p: &mut f32, v: &mut f32, radius: f32, extent: f32) -> bool {
    let (lo, hi) = axis_range(radius, extent);
    if *p < lo {
        *p = lo;
        if *v < 0.0 {
            *v = -*v;
            return true;
        }
    } else if *p > hi {
        *p = hi;
        if *v > 0.0 {
            *v = -*v;
            return true;
        }
    }
    false
}

/// Clamp a body into `[0, bounds.x] x [0, bounds.y]` and point its heading
/// back inside on every axis it crossed
pub fn reflect_in_bounds(pos: &mut Vec2, heading: &mut Vec2, radius: f32, bounds: Vec2) -> Bounce {
    Bounce {
        x: reflect_axis(&mut pos.x, &mut heading.x, radius, bounds.x),
        y: reflect_axis(&mut pos.y, &mut heading.y, radius, bounds.y),
    }
}

/// A non-player fish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creature {
    pub id: CreatureId,
    pub kind: CreatureKind,
    pub pos: Vec2,
    /// Direction of travel; unit length at spawn, only its signs change after
    pub heading: Vec2,
    /// Base speed in pixels/s, scaled by the movement policy
    pub speed: f32,
    pub radius: f32,
    pub value: u32,
    pub movement: Movement,
    /// Sprite faces left
    pub flipped: bool,
    #[serde(skip)]
    pub sprite: Option<SpriteHandle>,
    /// Holds a slot in the current level's population count
    #[serde(skip)]
    pub(crate) counted: bool,
}

impl Creature {
    pub fn new(id: CreatureId, kind: CreatureKind, pos: Vec2, heading: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            heading,
            speed: NPC_BASE_SPEED,
            radius: kind.collision_radius(),
            value: kind.value(),
            movement: kind.movement(),
            flipped: heading.x < 0.0,
            sprite: None,
            counted: false,
        }
    }

    pub fn with_sprite(mut self, sprite: Option<SpriteHandle>) -> Self {
        self.sprite = sprite;
        self
    }

    /// Speed in pixels/s for the current frame
    pub fn current_speed(&self) -> f32 {
        self.speed * self.movement.speed_factor()
    }

    /// Swim one frame along the heading, then bounce off the arena walls
    pub fn move_within(&mut self, dt: f32, bounds: Vec2) -> Bounce {
        self.pos += self.heading * self.current_speed() * dt;
        self.movement.advance();
        let bounce = reflect_in_bounds(&mut self.pos, &mut self.heading, self.radius, bounds);
        if self.heading.x != 0.0 {
            self.flipped = self.heading.x < 0.0;
        }
        bounce
    }
}

/// The player-controlled fish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCreature {
    pub pos: Vec2,
    /// Input direction, each component in {-1, 0, 1}
    direction: (i8, i8),
    pub speed: f32,
    pub radius: f32,
    score: u64,
    lives: u32,
    power: u32,
    /// Frames left during which damage is ignored
    damage_debounce: u32,
    /// Movement extents; the player is clamped to `[0, bounds]`
    bounds: Vec2,
    pub flipped: bool,
    #[serde(skip)]
    pub sprite: Option<SpriteHandle>,
}

impl PlayerCreature {
    pub fn new(pos: Vec2, speed: f32, radius: f32) -> Self {
        Self {
            pos,
            direction: (0, 0),
            speed,
            radius,
            score: 0,
            lives: PLAYER_LIVES,
            power: PLAYER_POWER,
            damage_debounce: 0,
            bounds: Vec2::new(
                ARENA_WIDTH - PLAYER_BOUNDS_MARGIN,
                ARENA_HEIGHT - PLAYER_BOUNDS_MARGIN,
            ),
            flipped: false,
            sprite: None,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn power(&self) -> u32 {
        self.power
    }

    pub fn damage_debounce(&self) -> u32 {
        self.damage_debounce
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    pub fn direction(&self) -> (i8, i8) {
        self.direction
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn set_lives(&mut self, lives: u32) {
        self.lives = lives;
    }

    pub fn set_power(&mut self, power: u32) {
        self.power = power;
    }

    /// Set the input direction; components are clamped to {-1, 0, 1}
    pub fn set_direction(&mut self, dx: i8, dy: i8) {
        self.direction = (dx.signum(), dy.signum());
        if dx != 0 {
            self.flipped = dx < 0;
        }
    }

    /// Constrain future movement to `[0, w] x [0, h]`
    pub fn set_bounds(&mut self, w: f32, h: f32) {
        self.bounds = Vec2::new(w.max(0.0), h.max(0.0));
    }

    /// Move along the input direction, clamped to bounds
    pub fn move_by(&mut self, dt: f32) {
        let dir = Vec2::new(self.direction.0 as f32, self.direction.1 as f32);
        self.pos += dir * self.speed * dt;
        let (lo_x, hi_x) = axis_range(self.radius, self.bounds.x);
        let (lo_y, hi_y) = axis_range(self.radius, self.bounds.y);
        self.pos.x = self.pos.x.clamp(lo_x, hi_x);
        self.pos.y = self.pos.y.clamp(lo_y, hi_y);
    }

    /// Add `amount * weight` to the score, returning the points gained
    pub fn add_to_score(&mut self, amount: u32, weight: u32) -> u64 {
        let gained = amount as u64 * weight as u64;
        self.score += gained;
        gained
    }

    /// Gain a life unless already at `max_lives`
    pub fn gain_life(&mut self, max_lives: u32) -> bool {
        if self.lives >= max_lives {
            return false;
        }
        self.lives += 1;
        true
    }

    /// Take a hit unless still within the debounce window
    ///
    /// Returns true if a life was lost. Every hit re-arms the window.
    pub fn lose_life(&mut self, debounce_frames: u32) -> bool {
        if self.damage_debounce > 0 {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.damage_debounce = debounce_frames;
        true
    }

    pub fn increase_power(&mut self, amount: u32) {
        self.power += amount;
    }

    /// Count down the debounce window (once per frame)
    pub fn reduce_damage_debounce(&mut self) {
        self.damage_debounce = self.damage_debounce.saturating_sub(1);
    }
}
