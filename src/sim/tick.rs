//! Fixed timestep simulation tick
//!
//! One call to [`tick`] advances the aquarium scene by one frame: input, player
//! movement, arena update, collisions, then the merged event for the frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aquarium::Aquarium;
use super::collision::{detect_aquarium_collisions, detect_power_up_collisions};
use super::creature::PlayerCreature;
use super::event::GameEvent;
use crate::settings::{PlayerSettings, ScoringRules, Settings};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Direction intent, each component in {-1, 0, 1}; `None` keeps the last one
    pub direction: Option<(i8, i8)>,
    /// Pause toggle
    pub pause: bool,
    /// Help overlay toggle
    pub toggle_help: bool,
    /// Leave the intro screen
    pub start: bool,
    /// Steer the player automatically (headless runs)
    pub autopilot: bool,
}

/// Scene phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// The player ran out of lives
    GameOver,
    /// Every level was completed
    Finished,
}

/// Lets one frame through after every `interval` skipped frames
#[derive(Debug, Clone)]
pub struct FrameGate {
    interval: u32,
    waited: u32,
}

impl FrameGate {
    /// An interval of 0 opens on every frame
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            waited: 0,
        }
    }

    /// Count one frame; true when the gate opens
    pub fn tick(&mut self) -> bool {
        if self.waited < self.interval {
            self.waited += 1;
            return false;
        }
        self.waited = 0;
        true
    }

    pub fn reset(&mut self) {
        self.waited = 0;
    }
}

/// The playable scene: the player plus the arena it swims in
pub struct AquariumScene {
    pub player: PlayerCreature,
    pub aquarium: Aquarium,
    pub rules: ScoringRules,
    player_settings: PlayerSettings,
    phase: GamePhase,
    help_visible: bool,
    last_event: GameEvent,
    collision_gate: FrameGate,
    /// Frames simulated (paused frames excluded)
    frame: u64,
}

impl AquariumScene {
    pub fn new(aquarium: Aquarium, player_settings: PlayerSettings, rules: ScoringRules) -> Self {
        let player = Self::spawn_player(&player_settings, aquarium.bounds());
        Self {
            player,
            aquarium,
            rules,
            player_settings,
            phase: GamePhase::Playing,
            help_visible: false,
            last_event: GameEvent::None,
            collision_gate: FrameGate::new(0),
            frame: 0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut scene = Self::new(
            Aquarium::from_settings(settings),
            settings.player.clone(),
            settings.scoring.clone(),
        );
        scene.collision_gate = FrameGate::new(settings.arena.collision_check_interval);
        scene
    }

    fn spawn_player(settings: &PlayerSettings, arena: Vec2) -> PlayerCreature {
        let mut player = PlayerCreature::new(arena / 2.0, settings.speed, settings.radius);
        player.set_lives(settings.lives);
        player.set_power(settings.power);
        player.set_bounds(
            arena.x - settings.bounds_margin,
            arena.y - settings.bounds_margin,
        );
        player
    }

    /// Window resize: constrains future movement, nothing is relocated now
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.aquarium.set_bounds(width, height);
        let margin = self.player_settings.bounds_margin;
        self.player.set_bounds(width - margin, height - margin);
    }

    /// New run from the first level with a fresh player
    pub fn restart(&mut self) {
        self.aquarium.restart();
        self.player = Self::spawn_player(&self.player_settings, self.aquarium.bounds());
        self.phase = GamePhase::Playing;
        self.last_event = GameEvent::None;
        self.collision_gate.reset();
        self.frame = 0;
        log::info!("Aquarium restarted");
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    /// Most significant event of the latest frame
    pub fn last_event(&self) -> GameEvent {
        self.last_event
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Advance the aquarium scene by one fixed timestep
pub fn tick(scene: &mut AquariumScene, input: &TickInput, dt: f32) {
    if input.toggle_help {
        scene.help_visible = !scene.help_visible;
    }

    // Handle pause toggle
    if input.pause {
        match scene.phase {
            GamePhase::Playing => {
                scene.phase = GamePhase::Paused;
                scene.last_event = GameEvent::None;
                log::info!("Paused at frame {}", scene.frame);
                return;
            }
            GamePhase::Paused => {
                scene.phase = GamePhase::Playing;
                log::info!("Resumed at frame {}", scene.frame);
            }
            _ => {}
        }
    }

    // Don't tick if paused or ended
    if scene.phase != GamePhase::Playing {
        scene.last_event = GameEvent::None;
        return;
    }

    let direction = if input.autopilot {
        Some(autopilot_direction(&scene.player, &scene.aquarium))
    } else {
        input.direction
    };
    if let Some((dx, dy)) = direction {
        scene.player.set_direction(dx, dy);
    }
    scene.player.move_by(dt);

    let mut event = scene.aquarium.update(dt);
    // A bite landing this frame starts the count on the next one
    let recovering = scene.player.damage_debounce() > 0;

    // Everything has moved; collide against post-move positions
    if scene.collision_gate.tick() {
        let hit = detect_aquarium_collisions(&mut scene.aquarium, &mut scene.player, &scene.rules);
        let pickup = detect_power_up_collisions(&mut scene.aquarium, &mut scene.player, &scene.rules);
        event = event.most_significant(hit).most_significant(pickup);
    }
    if recovering {
        scene.player.reduce_damage_debounce();
    }
    scene.aquarium.reconcile();

    if !scene.player.is_alive() {
        event = event.most_significant(GameEvent::GameOver);
        scene.phase = GamePhase::GameOver;
        log::info!(
            "Game over at frame {} with score {}",
            scene.frame,
            scene.player.score()
        );
    } else if event.is_game_exit() {
        scene.phase = GamePhase::Finished;
        log::info!("All levels complete with score {}", scene.player.score());
    }

    scene.last_event = event;
    scene.frame += 1;
}

/// Distance beyond which threats are ignored by the autopilot
const AUTOPILOT_DANGER_RANGE: f32 = 120.0;

/// Flee the nearest dangerous creature, else chase the nearest pickup or prey
fn autopilot_direction(player: &PlayerCreature, aquarium: &Aquarium) -> (i8, i8) {
    let power = player.power();
    let dist = |pos: Vec2| player.pos.distance_squared(pos);

    let threat = aquarium
        .creatures()
        .filter(|c| c.value > power)
        .filter(|c| {
            let reach = AUTOPILOT_DANGER_RANGE + c.radius + player.radius;
            dist(c.pos) < reach * reach
        })
        .min_by(|a, b| dist(a.pos).total_cmp(&dist(b.pos)));
    if let Some(threat) = threat {
        return steer(player.pos - threat.pos);
    }

    let pickup = aquarium
        .power_ups()
        .map(|p| p.pos)
        .min_by(|a, b| dist(*a).total_cmp(&dist(*b)));
    let prey = aquarium
        .creatures()
        .filter(|c| c.value <= power)
        .map(|c| c.pos)
        .min_by(|a, b| dist(*a).total_cmp(&dist(*b)));

    match pickup.or(prey) {
        Some(target) => steer(target - player.pos),
        None => (0, 0),
    }
}

fn steer(delta: Vec2) -> (i8, i8) {
    const DEAD_ZONE: f32 = 2.0;
    let axis = |v: f32| {
        if v > DEAD_ZONE {
            1
        } else if v < -DEAD_ZONE {
            -1
        } else {
            0
        }
    };
    (axis(delta.x), axis(delta.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::{LevelScript, PopulationEntry};
    use crate::sim::{CollisionOutcome, Creature, CreatureId, CreatureKind};

    fn quiet_settings() -> Settings {
        let mut settings = Settings::default();
        settings.arena.power_up_spawn_chance = 0.0;
        settings
    }

    fn scene() -> AquariumScene {
        AquariumScene::from_settings(&quiet_settings())
    }

    #[test]
    fn test_frame_gate() {
        let mut every = FrameGate::new(0);
        assert!((0..4).all(|_| every.tick()));

        let mut gate = FrameGate::new(5);
        let opened: Vec<bool> = (0..12).map(|_| gate.tick()).collect();
        assert_eq!(opened.iter().filter(|o| **o).count(), 2);
        assert!(opened[5] && opened[11]);
    }

    #[test]
    fn test_player_starts_centered_with_margin_bounds() {
        let scene = scene();
        assert_eq!(scene.player.pos, Vec2::new(512.0, 384.0));
        assert_eq!(scene.player.bounds(), Vec2::new(1004.0, 748.0));
        assert_eq!(scene.player.lives(), 3);
        assert_eq!(scene.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_direction_moves_player() {
        let mut scene = scene();
        let input = TickInput {
            direction: Some((1, 0)),
            ..Default::default()
        };
        tick(&mut scene, &input, SIM_DT);
        assert!(scene.player.pos.x > 512.0);
        assert_eq!(scene.player.pos.y, 384.0);

        // The intent persists without new input
        let x = scene.player.pos.x;
        tick(&mut scene, &TickInput::default(), SIM_DT);
        assert!(scene.player.pos.x > x);
    }

    #[test]
    fn test_first_tick_populates() {
        let mut scene = scene();
        // Too weak to eat anything, so the count is exact
        scene.player.set_power(0);
        tick(&mut scene, &TickInput::default(), SIM_DT);
        assert_eq!(scene.aquarium.creature_count(), 12);
        assert_eq!(scene.frame(), 1);
        assert!(!scene.last_event().is_none());
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut scene = scene();
        tick(&mut scene, &TickInput::default(), SIM_DT);
        let before: Vec<Vec2> = scene.aquarium.creatures().map(|c| c.pos).collect();

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut scene, &pause, SIM_DT);
        assert!(scene.is_paused());
        for _ in 0..10 {
            tick(&mut scene, &TickInput::default(), SIM_DT);
        }
        let after: Vec<Vec2> = scene.aquarium.creatures().map(|c| c.pos).collect();
        assert_eq!(before, after);
        assert_eq!(scene.frame(), 1);

        tick(&mut scene, &pause, SIM_DT);
        assert_eq!(scene.phase(), GamePhase::Playing);
        assert_eq!(scene.frame(), 2);
    }

    #[test]
    fn test_help_toggle() {
        let mut scene = scene();
        let help = TickInput {
            toggle_help: true,
            ..Default::default()
        };
        tick(&mut scene, &help, SIM_DT);
        assert!(scene.help_visible());
        tick(&mut scene, &help, SIM_DT);
        assert!(!scene.help_visible());
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut scene = scene();
        scene.player.set_lives(1);
        let pos = scene.player.pos;
        scene.aquarium.add_creature(Creature::new(
            CreatureId(0),
            CreatureKind::BiggerFish,
            pos,
            Vec2::Y,
        ));
        scene.aquarium.reconcile();

        tick(&mut scene, &TickInput::default(), SIM_DT);
        assert_eq!(scene.last_event(), GameEvent::GameOver);
        assert_eq!(scene.phase(), GamePhase::GameOver);
        assert_eq!(scene.player.lives(), 0);

        // Inert afterwards
        tick(&mut scene, &TickInput::default(), SIM_DT);
        assert!(scene.last_event().is_none());

        scene.restart();
        assert_eq!(scene.phase(), GamePhase::Playing);
        assert_eq!(scene.player.lives(), 3);
        assert_eq!(scene.aquarium.creature_count(), 0);
    }

    #[test]
    fn test_collision_throttled_by_gate() {
        let mut settings = quiet_settings();
        settings.arena.collision_check_interval = 5;
        let mut scene = AquariumScene::from_settings(&settings);
        let pos = scene.player.pos;
        scene.aquarium.add_creature(Creature::new(
            CreatureId(0),
            CreatureKind::SharkCreature,
            pos,
            Vec2::ZERO,
        ));
        scene.aquarium.reconcile();

        for _ in 0..5 {
            tick(&mut scene, &TickInput::default(), SIM_DT);
            assert!(!scene.last_event().is_collision_event());
        }
        tick(&mut scene, &TickInput::default(), SIM_DT);
        assert!(matches!(
            scene.last_event(),
            GameEvent::Collision {
                outcome: CollisionOutcome::Damaged { lives_left: 2 },
                ..
            }
        ));
    }

    #[test]
    fn test_debounce_covers_full_window() {
        let mut scene = scene();
        let pos = scene.player.pos;
        scene.aquarium.add_creature(Creature::new(
            CreatureId(0),
            CreatureKind::SharkCreature,
            pos,
            Vec2::ZERO,
        ));
        scene.aquarium.reconcile();
        let window = scene.rules.damage_debounce_frames;
        assert_eq!(window, 180);

        tick(&mut scene, &TickInput::default(), SIM_DT);
        assert_eq!(scene.player.lives(), 2);
        assert_eq!(scene.player.damage_debounce(), window);

        for _ in 0..window {
            tick(&mut scene, &TickInput::default(), SIM_DT);
            assert!(matches!(
                scene.last_event(),
                GameEvent::Collision {
                    outcome: CollisionOutcome::Debounced,
                    ..
                }
            ));
            assert_eq!(scene.player.lives(), 2);
        }
        assert_eq!(scene.player.damage_debounce(), 0);

        tick(&mut scene, &TickInput::default(), SIM_DT);
        assert_eq!(scene.player.lives(), 1);
    }

    #[test]
    fn test_set_bounds_applies_margin() {
        let mut scene = scene();
        scene.set_bounds(640.0, 480.0);
        assert_eq!(scene.aquarium.bounds(), Vec2::new(640.0, 480.0));
        assert_eq!(scene.player.bounds(), Vec2::new(620.0, 460.0));

        let input = TickInput {
            direction: Some((1, 1)),
            ..Default::default()
        };
        for _ in 0..240 {
            tick(&mut scene, &input, SIM_DT);
        }
        assert!(scene.player.pos.x <= 620.0 - scene.player.radius);
        assert!(scene.player.pos.y <= 460.0 - scene.player.radius);
    }

    #[test]
    fn test_steer_dead_zone() {
        assert_eq!(steer(Vec2::new(10.0, -10.0)), (1, -1));
        assert_eq!(steer(Vec2::new(1.0, -1.0)), (0, 0));
    }

    #[test]
    fn test_autopilot_eats_prey() {
        let mut settings = quiet_settings();
        settings.levels = vec![LevelScript {
            target_score: 3,
            power_up_score: 0,
            population: vec![PopulationEntry {
                kind: CreatureKind::NPCreature,
                count: 4,
            }],
        }];
        let mut scene = AquariumScene::from_settings(&settings);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..3600 {
            tick(&mut scene, &input, SIM_DT);
            if scene.phase() != GamePhase::Playing {
                break;
            }
        }
        assert!(scene.player.score() >= 3);
        assert_eq!(scene.phase(), GamePhase::Finished);
    }
}
