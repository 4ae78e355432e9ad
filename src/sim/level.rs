//! Level scripts and population accounting
//!
//! A level names how many of each species the tank should sustain, how many
//! points finish the level, and how many points unlock a power-up.

use serde::{Deserialize, Serialize};

use super::creature::CreatureKind;

/// Target and running count for one species
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationNode {
    pub kind: CreatureKind,
    /// Target population
    pub population: u32,
    /// Live (or requested) population, always `<= population`
    current: u32,
}

impl PopulationNode {
    pub fn new(kind: CreatureKind, population: u32) -> Self {
        Self {
            kind,
            population,
            current: 0,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    /// How many more of this species the level wants
    pub fn missing(&self) -> u32 {
        self.population.saturating_sub(self.current)
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.population
    }
}

/// Where a level stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelState {
    /// At least one species is below its target
    Populating,
    /// Every species is at its target
    Sustained,
    /// The level score reached the target score
    Completed,
}

/// One scripted level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AquariumLevel {
    number: usize,
    nodes: Vec<PopulationNode>,
    level_score: u64,
    target_score: u64,
    /// Points between power-up spawns (0 disables power-ups)
    power_up_score: u64,
    /// Level score at which the next power-up becomes available
    next_power_up_at: u64,
}

impl AquariumLevel {
    /// Build a level from its population table
    ///
    /// # Panics
    /// A level without population nodes is a scripting bug.
    pub fn new(
        number: usize,
        target_score: u64,
        power_up_score: u64,
        nodes: Vec<PopulationNode>,
    ) -> Self {
        assert!(
            !nodes.is_empty(),
            "aquarium level {number} has no population nodes"
        );
        Self {
            number,
            nodes,
            level_score: 0,
            target_score,
            power_up_score,
            next_power_up_at: power_up_score,
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn nodes(&self) -> &[PopulationNode] {
        &self.nodes
    }

    pub fn level_score(&self) -> u64 {
        self.level_score
    }

    pub fn target_score(&self) -> u64 {
        self.target_score
    }

    pub fn power_up_score(&self) -> u64 {
        self.power_up_score
    }

    pub fn set_power_up_score(&mut self, score: u64) {
        self.power_up_score = score;
        self.next_power_up_at = if score == 0 {
            0
        } else {
            score.max(self.level_score.div_ceil(score) * score)
        };
    }

    /// Sum of all target populations
    pub fn total_population(&self) -> u32 {
        self.nodes.iter().map(|n| n.population).sum()
    }

    /// Sum of all running counts
    pub fn current_population(&self) -> u32 {
        self.nodes.iter().map(|n| n.current).sum()
    }

    /// A creature of `kind` left play after being eaten at `power`
    ///
    /// Returns the points credited to the level score.
    pub fn consume_population(&mut self, kind: CreatureKind, power: u32) -> u64 {
        self.release(kind);
        self.credit(kind, power)
    }

    /// Count a creature placed outside of [`AquariumLevel::repopulate`]
    ///
    /// Returns false when the level does not track `kind` or the species is
    /// already at its target; such a creature holds no slot.
    pub fn claim(&mut self, kind: CreatureKind) -> bool {
        match self.nodes.iter_mut().find(|n| n.kind == kind) {
            Some(node) if !node.is_full() => {
                node.current += 1;
                true
            }
            _ => false,
        }
    }

    /// Free the slot of a creature that left play without scoring
    pub fn release(&mut self, kind: CreatureKind) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.kind == kind) {
            node.current = node.current.saturating_sub(1);
        }
    }

    /// Score a creature of `kind` eaten at `power`, leaving the counts alone
    pub fn credit(&mut self, kind: CreatureKind, power: u32) -> u64 {
        let gained = kind.value() as u64 * power.max(1) as u64;
        self.level_score += gained;
        gained
    }

    /// Lazily request the missing creatures, at most `room` of them
    ///
    /// Each yielded kind is counted as live immediately, so the caller must
    /// spawn everything it pulls. Requests beyond `room` stay missing and are
    /// offered again on the next call.
    pub fn repopulate(&mut self, room: usize) -> Repopulation<'_> {
        Repopulation {
            nodes: &mut self.nodes,
            index: 0,
            room,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.level_score >= self.target_score
    }

    pub fn can_spawn_power_up(&self) -> bool {
        self.power_up_score > 0 && self.level_score >= self.next_power_up_at
    }

    /// Re-arm the power-up gate one threshold further up
    pub fn mark_power_up_spawned(&mut self) {
        if self.power_up_score == 0 {
            return;
        }
        while self.next_power_up_at <= self.level_score {
            self.next_power_up_at += self.power_up_score;
        }
    }

    pub fn state(&self) -> LevelState {
        if self.is_completed() {
            LevelState::Completed
        } else if self.nodes.iter().all(PopulationNode::is_full) {
            LevelState::Sustained
        } else {
            LevelState::Populating
        }
    }

    /// Zero the running counts, keeping the targets
    pub fn population_reset(&mut self) {
        for node in &mut self.nodes {
            node.current = 0;
        }
    }

    /// Zero the score and running counts, keeping the targets
    pub fn level_reset(&mut self) {
        self.level_score = 0;
        self.next_power_up_at = self.power_up_score;
        self.population_reset();
    }
}

/// Finite stream of creature kinds to spawn, produced by [`AquariumLevel::repopulate`]
pub struct Repopulation<'a> {
    nodes: &'a mut [PopulationNode],
    index: usize,
    room: usize,
}

impl Iterator for Repopulation<'_> {
    type Item = CreatureKind;

    fn next(&mut self) -> Option<CreatureKind> {
        if self.room == 0 {
            return None;
        }
        while let Some(node) = self.nodes.get_mut(self.index) {
            if node.current < node.population {
                node.current += 1;
                self.room -= 1;
                return Some(node.kind);
            }
            self.index += 1;
        }
        None
    }
}
