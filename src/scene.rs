//! Top-level scenes
//!
//! The host keeps one [`SceneManager`] and calls [`SceneManager::update_active`]
//! once per frame. Scenes never switch themselves; they raise a signal naming
//! the scene that should follow, and the manager looks it up by name.

use crate::sim::{AquariumScene, GamePhase, TickInput, tick};

/// Named top-level scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKind {
    GameIntro,
    AquariumGame,
    GameOver,
}

impl SceneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneKind::GameIntro => "GAME_INTRO",
            SceneKind::AquariumGame => "AQUARIUM_GAME",
            SceneKind::GameOver => "GAME_OVER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GAME_INTRO" => Some(SceneKind::GameIntro),
            "AQUARIUM_GAME" => Some(SceneKind::AquariumGame),
            "GAME_OVER" => Some(SceneKind::GameOver),
            _ => None,
        }
    }
}

/// A top-level scene driven by the manager
pub trait Scene {
    /// Lookup key in the scene table
    fn name(&self) -> &str;

    fn update(&mut self, input: &TickInput, dt: f32);

    /// Scene the manager should switch to, if this one is done
    fn signal(&self) -> Option<SceneKind>;

    /// Called when the scene becomes active
    fn enter(&mut self) {}
}

/// Title screen; waits for the start trigger
#[derive(Debug, Default)]
pub struct IntroScene {
    started: bool,
}

impl Scene for IntroScene {
    fn name(&self) -> &str {
        SceneKind::GameIntro.as_str()
    }

    fn update(&mut self, input: &TickInput, _dt: f32) {
        self.started |= input.start;
    }

    fn signal(&self) -> Option<SceneKind> {
        self.started.then_some(SceneKind::AquariumGame)
    }

    fn enter(&mut self) {
        self.started = false;
    }
}

/// Terminal scene shown once the run is over
#[derive(Debug, Default)]
pub struct GameOverScene;

impl Scene for GameOverScene {
    fn name(&self) -> &str {
        SceneKind::GameOver.as_str()
    }

    fn update(&mut self, _input: &TickInput, _dt: f32) {}

    fn signal(&self) -> Option<SceneKind> {
        None
    }
}

impl Scene for AquariumScene {
    fn name(&self) -> &str {
        SceneKind::AquariumGame.as_str()
    }

    fn update(&mut self, input: &TickInput, dt: f32) {
        tick(self, input, dt);
    }

    fn signal(&self) -> Option<SceneKind> {
        match self.phase() {
            GamePhase::GameOver | GamePhase::Finished => Some(SceneKind::GameOver),
            GamePhase::Playing | GamePhase::Paused => None,
        }
    }
}

/// String-keyed scene table with one active entry
#[derive(Default)]
pub struct SceneManager {
    scenes: Vec<Box<dyn Scene>>,
    active: Option<usize>,
}

impl SceneManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene; the first one added becomes active
    pub fn add_scene(&mut self, scene: Box<dyn Scene>) {
        self.scenes.push(scene);
        if self.active.is_none() {
            self.active = Some(self.scenes.len() - 1);
        }
    }

    pub fn has_scenes(&self) -> bool {
        !self.scenes.is_empty()
    }

    /// Switch to the scene registered under `name`
    ///
    /// Unknown names leave the active scene unchanged.
    pub fn transition(&mut self, name: &str) -> bool {
        let Some(index) = self.scenes.iter().position(|s| s.name() == name) else {
            log::warn!("No scene named {name}");
            return false;
        };
        if self.active != Some(index) {
            log::info!(
                "Scene {} -> {}",
                self.active_name().unwrap_or("<none>"),
                name
            );
        }
        self.active = Some(index);
        self.scenes[index].enter();
        true
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active_scene().map(|s| s.name())
    }

    pub fn active_scene(&self) -> Option<&dyn Scene> {
        self.active.map(|i| &*self.scenes[i])
    }

    /// Update the active scene, then follow its signal if it raised one
    pub fn update_active(&mut self, input: &TickInput, dt: f32) {
        let Some(index) = self.active else {
            return;
        };
        let scene = &mut self.scenes[index];
        scene.update(input, dt);
        if let Some(next) = scene.signal() {
            self.transition(next.as_str());
        }
    }
}
