//! The aquarium arena
//!
//! Owns every non-player creature and power-up, the level script, and the
//! seeded RNG used for spawning. Other components refer to creatures by
//! [`CreatureId`] and borrow them through the accessors here.
//!
//! Additions and removals requested during a frame are buffered and applied
//! by [`Aquarium::reconcile`], so scans over the live set never observe a
//! half-updated collection.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::creature::{Creature, CreatureId, CreatureKind};
use super::event::GameEvent;
use super::level::AquariumLevel;
use super::power_up::{PowerUp, PowerUpId, PowerUpKind};
use crate::consts::*;
use crate::heading_from_angle;
use crate::settings::Settings;
use crate::sprites::{Canvas, NullSprites, SpriteSource};

/// Serializable view of the arena for inspection
#[derive(Debug, Clone, Serialize)]
pub struct AquariumSnapshot {
    pub level: usize,
    pub level_score: u64,
    pub target_score: u64,
    pub width: f32,
    pub height: f32,
    pub creatures: Vec<Creature>,
    pub power_ups: Vec<PowerUp>,
}

pub struct Aquarium {
    width: f32,
    height: f32,
    max_population: usize,
    power_up_spawn_chance: f64,
    /// Live creatures, sorted by id
    creatures: Vec<Creature>,
    /// Creatures joining at the next reconcile
    next_creatures: Vec<Creature>,
    /// Creatures leaving at the next reconcile
    removals: Vec<CreatureId>,
    power_ups: Vec<PowerUp>,
    levels: Vec<AquariumLevel>,
    current_level: usize,
    /// The last level was completed
    finished: bool,
    rng: Pcg32,
    next_creature_id: u32,
    next_power_up_id: u32,
    sprites: Box<dyn SpriteSource>,
}

impl Aquarium {
    /// Empty arena with no levels and placeholder sprites
    pub fn new(width: f32, height: f32, seed: u64) -> Self {
        Self {
            width,
            height,
            max_population: MAX_POPULATION,
            power_up_spawn_chance: POWER_UP_SPAWN_CHANCE,
            creatures: Vec::new(),
            next_creatures: Vec::new(),
            removals: Vec::new(),
            power_ups: Vec::new(),
            levels: Vec::new(),
            current_level: 0,
            finished: false,
            rng: Pcg32::seed_from_u64(seed),
            next_creature_id: 1,
            next_power_up_id: 1,
            sprites: Box::new(NullSprites),
        }
    }

    /// Arena configured from settings, with the scripted levels loaded
    pub fn from_settings(settings: &Settings) -> Self {
        let mut aquarium = Self::new(settings.arena.width, settings.arena.height, settings.seed);
        aquarium.set_max_population(settings.arena.max_population);
        aquarium.set_power_up_spawn_chance(settings.arena.power_up_spawn_chance);
        for level in settings.build_levels() {
            aquarium.add_level(level);
        }
        aquarium
    }

    /// Use the host's sprite lookup for entities spawned from now on
    pub fn with_sprites(mut self, sprites: Box<dyn SpriteSource>) -> Self {
        self.sprites = sprites;
        self
    }

    pub fn add_level(&mut self, level: AquariumLevel) {
        self.levels.push(level);
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Resize the arena; existing entities are only constrained as they move
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    pub fn max_population(&self) -> usize {
        self.max_population
    }

    /// Lowering the cap never removes creatures already swimming
    pub fn set_max_population(&mut self, max_population: usize) {
        self.max_population = max_population;
    }

    pub fn set_power_up_spawn_chance(&mut self, chance: f64) {
        self.power_up_spawn_chance = if chance.is_nan() {
            0.0
        } else {
            chance.clamp(0.0, 1.0)
        };
    }

    // --- Creatures ---

    fn allocate_creature_id(&mut self) -> CreatureId {
        let id = CreatureId(self.next_creature_id);
        self.next_creature_id += 1;
        id
    }

    /// Queue a creature to join at the next reconcile, giving it a fresh id
    ///
    /// The creature takes a slot in the current level's population if its
    /// species is below target; otherwise it swims uncounted.
    pub fn add_creature(&mut self, mut creature: Creature) -> CreatureId {
        creature.id = self.allocate_creature_id();
        creature.counted = self.claim_slot(creature.kind);
        let id = creature.id;
        self.next_creatures.push(creature);
        id
    }

    fn claim_slot(&mut self, kind: CreatureKind) -> bool {
        self.levels
            .get_mut(self.current_level)
            .is_some_and(|level| level.claim(kind))
    }

    /// Take a creature out of the live or queued set
    ///
    /// Returns its kind and whether it held a population slot.
    fn detach(&mut self, id: CreatureId) -> Option<(CreatureKind, bool)> {
        if let Some(pos) = self.next_creatures.iter().position(|c| c.id == id) {
            let creature = self.next_creatures.remove(pos);
            return Some((creature.kind, creature.counted));
        }
        let creature = self.creature(id)?;
        let detached = (creature.kind, creature.counted);
        self.removals.push(id);
        Some(detached)
    }

    /// Mark a creature for removal at the next reconcile
    ///
    /// Returns false if the creature is unknown or already leaving. Its
    /// population slot is freed without scoring, so the level replaces it.
    pub fn remove_creature(&mut self, id: CreatureId) -> bool {
        let Some((kind, counted)) = self.detach(id) else {
            return false;
        };
        if counted {
            if let Some(level) = self.levels.get_mut(self.current_level) {
                level.release(kind);
            }
        }
        true
    }

    /// Remove a creature that was eaten at `power`, crediting the level
    pub fn consume_creature(&mut self, id: CreatureId, power: u32) -> Option<CreatureKind> {
        if !self.is_live(id) {
            return None;
        }
        let (kind, counted) = self.detach(id)?;
        let level = self.current_level_mut();
        let gained = if counted {
            level.consume_population(kind, power)
        } else {
            level.credit(kind, power)
        };
        log::debug!("{} #{} consumed (+{} level score)", kind.as_str(), id.0, gained);
        Some(kind)
    }

    /// Drop every creature, including queued ones, and zero the level's counts
    pub fn clear_creatures(&mut self) {
        self.creatures.clear();
        self.next_creatures.clear();
        self.removals.clear();
        if let Some(level) = self.levels.get_mut(self.current_level) {
            level.population_reset();
        }
    }

    /// Apply queued removals and additions
    pub fn reconcile(&mut self) {
        if !self.removals.is_empty() {
            let removals = std::mem::take(&mut self.removals);
            self.creatures.retain(|c| !removals.contains(&c.id));
        }
        if !self.next_creatures.is_empty() {
            self.creatures.append(&mut self.next_creatures);
            self.creatures.sort_by_key(|c| c.id);
        }
    }

    /// Live creature by id (queued additions are not visible yet)
    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures
            .iter()
            .find(|c| c.id == id && !self.removals.contains(&c.id))
    }

    pub fn is_live(&self, id: CreatureId) -> bool {
        self.creature(id).is_some()
    }

    /// Creature at a storage index, including ones marked for removal
    pub fn get_creature_at(&self, index: usize) -> Option<&Creature> {
        self.creatures.get(index)
    }

    /// Stored creatures, including ones marked for removal
    pub fn creature_count(&self) -> usize {
        self.creatures.len()
    }

    /// Live creatures in id order, skipping ones marked for removal
    pub fn creatures(&self) -> impl Iterator<Item = &Creature> {
        self.creatures
            .iter()
            .filter(|c| !self.removals.contains(&c.id))
    }

    /// Creatures counted against the population cap
    pub fn live_population(&self) -> usize {
        self.creatures.len() - self.removals.len() + self.next_creatures.len()
    }

    /// Random in-bounds position for a body of `radius`
    fn random_position(rng: &mut Pcg32, radius: f32, bounds: Vec2) -> Vec2 {
        let x_hi = (bounds.x - radius).max(bounds.x / 2.0);
        let y_hi = (bounds.y - radius).max(bounds.y / 2.0);
        let x = rng.random_range(radius.min(bounds.x / 2.0)..=x_hi);
        let y = rng.random_range(radius.min(bounds.y / 2.0)..=y_hi);
        Vec2::new(x, y)
    }

    /// Queue a freshly built creature of `kind`
    fn place_creature(&mut self, kind: CreatureKind, counted: bool) -> CreatureId {
        let id = self.allocate_creature_id();
        let bounds = self.bounds();
        let pos = Self::random_position(&mut self.rng, kind.collision_radius(), bounds);
        let heading = heading_from_angle(self.rng.random_range(0.0..std::f32::consts::TAU));
        let mut creature =
            Creature::new(id, kind, pos, heading).with_sprite(self.sprites.creature_sprite(kind));
        creature.counted = counted;
        log::debug!("Spawned {} #{} at {:?}", kind.as_str(), id.0, pos);
        self.next_creatures.push(creature);
        id
    }

    /// Create a creature of `kind` at a random spot; it joins at the next reconcile
    ///
    /// Counts against the current level like [`Aquarium::add_creature`].
    pub fn spawn_creature(&mut self, kind: CreatureKind) -> CreatureId {
        let counted = self.claim_slot(kind);
        self.place_creature(kind, counted)
    }

    /// Spawn what the current level is missing, within the population cap
    ///
    /// Returns the first creature spawned, if any.
    pub fn repopulate(&mut self) -> Option<(CreatureId, CreatureKind)> {
        let room = self.max_population.saturating_sub(self.live_population());
        let kinds: Vec<CreatureKind> = self.current_level_mut().repopulate(room).collect();

        let mut first = None;
        for kind in kinds {
            // The level counted these as it yielded them
            let id = self.place_creature(kind, true);
            first.get_or_insert((id, kind));
        }
        first
    }

    // --- Power-ups ---

    pub fn add_power_up(&mut self, mut power_up: PowerUp) -> PowerUpId {
        power_up.id = PowerUpId(self.next_power_up_id);
        self.next_power_up_id += 1;
        let id = power_up.id;
        self.power_ups.push(power_up);
        id
    }

    /// Place a power-up of `kind` at a random spot
    pub fn spawn_power_up(&mut self, kind: PowerUpKind) -> PowerUpId {
        let bounds = self.bounds();
        let pos = Self::random_position(&mut self.rng, POWER_UP_RADIUS, bounds);
        let sprite = self.sprites.power_up_sprite(kind);
        let id = self.add_power_up(PowerUp::new(PowerUpId(0), kind, pos).with_sprite(sprite));
        log::info!("Spawned {} power-up #{} at {:?}", kind.as_str(), id.0, pos);
        id
    }

    /// Remove a power-up, handing it to the caller
    pub fn take_power_up(&mut self, id: PowerUpId) -> Option<PowerUp> {
        let index = self.power_ups.iter().position(|p| p.id == id)?;
        Some(self.power_ups.remove(index))
    }

    pub fn get_power_up_at(&self, index: usize) -> Option<&PowerUp> {
        self.power_ups.get(index)
    }

    pub fn power_up_count(&self) -> usize {
        self.power_ups.len()
    }

    pub fn power_ups(&self) -> impl Iterator<Item = &PowerUp> {
        self.power_ups.iter()
    }

    pub fn clear_power_ups(&mut self) {
        self.power_ups.clear();
    }

    /// One live power-up at a time, once the level score allows it
    fn maybe_spawn_power_up(&mut self) -> Option<PowerUpId> {
        if !self.power_ups.is_empty() || !self.current_level().can_spawn_power_up() {
            return None;
        }
        if !self.rng.random_bool(self.power_up_spawn_chance) {
            return None;
        }
        let id = self.spawn_power_up(PowerUpKind::Health);
        self.current_level_mut().mark_power_up_spawned();
        Some(id)
    }

    // --- Levels ---

    /// # Panics
    /// If no levels were added.
    pub fn current_level(&self) -> &AquariumLevel {
        match self.levels.get(self.current_level) {
            Some(level) => level,
            None => panic!("aquarium has no levels configured"),
        }
    }

    /// # Panics
    /// If no levels were added.
    pub fn current_level_mut(&mut self) -> &mut AquariumLevel {
        match self.levels.get_mut(self.current_level) {
            Some(level) => level,
            None => panic!("aquarium has no levels configured"),
        }
    }

    pub fn current_level_index(&self) -> usize {
        self.current_level
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// The last level has been completed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Empty the tank and move to the next level (or finish the run)
    fn advance_level(&mut self) -> GameEvent {
        let completed = self.current_level;
        self.clear_creatures();
        self.clear_power_ups();

        if completed + 1 < self.levels.len() {
            self.current_level += 1;
            let level = &mut self.levels[self.current_level];
            level.level_reset();
            log::info!(
                "Level {} complete, entering level {}",
                completed,
                level.number()
            );
            GameEvent::NewLevel {
                level: level.number(),
            }
        } else {
            self.finished = true;
            log::info!("Level {} complete, no levels left", completed);
            GameEvent::GameExit
        }
    }

    /// Start again from the first level
    pub fn restart(&mut self) {
        self.clear_creatures();
        self.clear_power_ups();
        for level in &mut self.levels {
            level.level_reset();
        }
        self.current_level = 0;
        self.finished = false;
    }

    /// Advance one frame
    ///
    /// Moves every creature, then either switches level (if the current one
    /// is complete) or tops the population back up and rolls for a power-up.
    ///
    /// # Panics
    /// If no levels were added.
    pub fn update(&mut self, dt: f32) -> GameEvent {
        assert!(!self.levels.is_empty(), "aquarium has no levels configured");
        if self.finished {
            return GameEvent::None;
        }
        if self.current_level().is_completed() {
            return self.advance_level();
        }

        let bounds = self.bounds();
        for creature in &mut self.creatures {
            creature.move_within(dt, bounds);
        }

        let event = match self.repopulate() {
            Some((creature, kind)) => GameEvent::CreatureAdded { creature, kind },
            None => GameEvent::None,
        };
        self.maybe_spawn_power_up();
        self.reconcile();
        event
    }

    /// Hand every entity with a sprite to the host canvas
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        for power_up in &self.power_ups {
            if let Some(sprite) = power_up.sprite {
                canvas.draw_sprite(sprite, power_up.pos, false);
            }
        }
        for creature in self.creatures() {
            if let Some(sprite) = creature.sprite {
                canvas.draw_sprite(sprite, creature.pos, creature.flipped);
            }
        }
    }

    pub fn snapshot(&self) -> AquariumSnapshot {
        let level = self.current_level();
        AquariumSnapshot {
            level: level.number(),
            level_score: level.level_score(),
            target_score: level.target_score(),
            width: self.width,
            height: self.height,
            creatures: self.creatures().cloned().collect(),
            power_ups: self.power_ups.clone(),
        }
    }
}
