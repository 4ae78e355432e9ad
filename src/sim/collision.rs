//! Collision detection and response
//!
//! Every body is a circle. [`check_collision`] is the pure overlap test; the
//! two `detect_*` drivers scan the arena for the player, apply the scoring
//! rules, and report what happened as a single [`GameEvent`].

use glam::Vec2;

use super::aquarium::Aquarium;
use super::creature::{Creature, PlayerCreature};
use super::event::{CollisionOutcome, GameEvent};
use super::power_up::{PowerUp, PowerUpKind};
use crate::settings::ScoringRules;
use crate::steps_crossed;

/// Anything with a circular collision body
pub trait Collider {
    fn center(&self) -> Vec2;
    fn collision_radius(&self) -> f32;
}

impl Collider for Creature {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn collision_radius(&self) -> f32 {
        self.radius
    }
}

impl Collider for PlayerCreature {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn collision_radius(&self) -> f32 {
        self.radius
    }
}

impl Collider for PowerUp {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn collision_radius(&self) -> f32 {
        self.radius
    }
}

/// True iff the centers are closer than the sum of the radii
#[inline]
pub fn check_collision<A, B>(a: &A, b: &B) -> bool
where
    A: Collider + ?Sized,
    B: Collider + ?Sized,
{
    let reach = a.collision_radius() + b.collision_radius();
    a.center().distance_squared(b.center()) < reach * reach
}

/// Resolve the player against the first overlapping creature (in id order)
///
/// A creature worth no more than the player's power is eaten: it leaves the
/// tank, the level and player scores go up, and crossing score steps grants
/// power or lives. A bigger creature costs the player a life, unless the
/// damage debounce is still running.
pub fn detect_aquarium_collisions(
    aquarium: &mut Aquarium,
    player: &mut PlayerCreature,
    rules: &ScoringRules,
) -> GameEvent {
    let hit = aquarium
        .creatures()
        .find(|creature| check_collision(&*player, *creature))
        .map(|creature| (creature.id, creature.kind, creature.value));
    let Some((id, kind, value)) = hit else {
        return GameEvent::None;
    };

    let outcome = if value <= player.power() {
        aquarium.consume_creature(id, player.power());

        let before = player.score();
        let score_gained = player.add_to_score(value, rules.score_weight);
        let after = player.score();

        let power_gained = steps_crossed(before, after, rules.power_step) as u32;
        player.increase_power(power_gained);

        let mut lives_gained = 0;
        for _ in 0..steps_crossed(before, after, rules.life_step) {
            if player.gain_life(rules.max_lives) {
                lives_gained += 1;
            }
        }
        if power_gained > 0 {
            log::info!("Player power up to {}", player.power());
        }

        CollisionOutcome::Consumed {
            score_gained,
            power_gained,
            lives_gained,
        }
    } else if player.lose_life(rules.damage_debounce_frames) {
        log::info!(
            "Player bitten by {} #{}, {} lives left",
            kind.as_str(),
            id.0,
            player.lives()
        );
        CollisionOutcome::Damaged {
            lives_left: player.lives(),
        }
    } else {
        CollisionOutcome::Debounced
    };

    let event = GameEvent::Collision {
        creature: id,
        kind,
        outcome,
    };
    log::debug!("{}", event);
    event
}

/// Pick up the first power-up the player overlaps and apply its effect
pub fn detect_power_up_collisions(
    aquarium: &mut Aquarium,
    player: &mut PlayerCreature,
    rules: &ScoringRules,
) -> GameEvent {
    let hit = aquarium
        .power_ups()
        .find(|power_up| check_collision(&*player, *power_up))
        .map(|power_up| power_up.id);
    let Some(power_up) = hit.and_then(|id| aquarium.take_power_up(id)) else {
        return GameEvent::None;
    };

    match power_up.kind {
        PowerUpKind::Health => {
            if !player.gain_life(rules.max_lives) {
                log::debug!("Health picked up at max lives ({})", player.lives());
            }
        }
    }
    log::info!(
        "Player picked up {} #{}",
        power_up.kind.as_str(),
        power_up.id.0
    );

    GameEvent::PowerUp {
        power_up: power_up.id,
        kind: power_up.kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::{AquariumLevel, CreatureId, CreatureKind, PopulationNode, PowerUpId};
    use proptest::prelude::*;

    fn tank() -> Aquarium {
        let mut aquarium = Aquarium::new(800.0, 600.0, 99);
        aquarium.set_power_up_spawn_chance(0.0);
        aquarium.add_level(AquariumLevel::new(
            0,
            100,
            0,
            vec![PopulationNode::new(CreatureKind::NPCreature, 1)],
        ));
        aquarium
    }

    fn place(aquarium: &mut Aquarium, kind: CreatureKind, pos: Vec2) -> CreatureId {
        let id = aquarium.add_creature(Creature::new(CreatureId(0), kind, pos, Vec2::X));
        aquarium.reconcile();
        id
    }

    fn player_at(pos: Vec2) -> PlayerCreature {
        PlayerCreature::new(pos, 100.0, 10.0)
    }

    #[test]
    fn test_check_collision_overlap() {
        let a = player_at(Vec2::new(0.0, 0.0));
        let mut b = player_at(Vec2::new(19.0, 0.0));
        assert!(check_collision(&a, &b));
        b.pos.x = 20.0;
        assert!(!check_collision(&a, &b));
    }

    #[test]
    fn test_no_overlap_no_event() {
        let mut aquarium = tank();
        place(&mut aquarium, CreatureKind::NPCreature, Vec2::new(400.0, 300.0));
        let mut player = player_at(Vec2::new(50.0, 50.0));
        let event = detect_aquarium_collisions(&mut aquarium, &mut player, &ScoringRules::default());
        assert!(event.is_none());
    }

    #[test]
    fn test_eat_smaller_creature() {
        let mut aquarium = tank();
        let id = place(&mut aquarium, CreatureKind::NPCreature, Vec2::new(100.0, 100.0));
        let mut player = player_at(Vec2::new(110.0, 100.0));
        player.set_power(2);

        let event = detect_aquarium_collisions(&mut aquarium, &mut player, &ScoringRules::default());
        assert_eq!(
            event,
            GameEvent::Collision {
                creature: id,
                kind: CreatureKind::NPCreature,
                outcome: CollisionOutcome::Consumed {
                    score_gained: 1,
                    power_gained: 0,
                    lives_gained: 0,
                },
            }
        );
        assert!(!aquarium.is_live(id));
        assert_eq!(aquarium.current_level().level_score(), 2);
        assert_eq!(player.score(), 1);
        assert_eq!(player.lives(), 3);
    }

    #[test]
    fn test_bitten_then_debounced() {
        let rules = ScoringRules::default();
        let mut aquarium = tank();
        let id = place(&mut aquarium, CreatureKind::SharkCreature, Vec2::new(100.0, 100.0));
        let mut player = player_at(Vec2::new(100.0, 110.0));
        assert_eq!(player.power(), 1);

        let event = detect_aquarium_collisions(&mut aquarium, &mut player, &rules);
        assert_eq!(
            event,
            GameEvent::Collision {
                creature: id,
                kind: CreatureKind::SharkCreature,
                outcome: CollisionOutcome::Damaged { lives_left: 2 },
            }
        );
        assert_eq!(player.damage_debounce(), rules.damage_debounce_frames);
        assert!(aquarium.is_live(id));

        player.reduce_damage_debounce();
        let event = detect_aquarium_collisions(&mut aquarium, &mut player, &rules);
        assert!(matches!(
            event,
            GameEvent::Collision {
                outcome: CollisionOutcome::Debounced,
                ..
            }
        ));
        assert_eq!(player.lives(), 2);
    }

    #[test]
    fn test_first_creature_by_id_wins() {
        let mut aquarium = tank();
        let first = place(&mut aquarium, CreatureKind::NPCreature, Vec2::new(100.0, 100.0));
        let _second = place(&mut aquarium, CreatureKind::NewNemoCreature, Vec2::new(105.0, 100.0));
        let mut player = player_at(Vec2::new(102.0, 100.0));

        let event = detect_aquarium_collisions(&mut aquarium, &mut player, &ScoringRules::default());
        assert_eq!(event.creature(), Some(first));
        assert_eq!(aquarium.creatures().count(), 1);

        // The eaten one is skipped even before reconcile
        let event = detect_aquarium_collisions(&mut aquarium, &mut player, &ScoringRules::default());
        assert_eq!(event.kind(), crate::sim::GameEventKind::Collision);
        assert_ne!(event.creature(), Some(first));
    }

    #[test]
    fn test_score_steps_grant_power_and_lives() {
        let rules = ScoringRules {
            power_step: 2,
            life_step: 4,
            max_lives: 10,
            ..ScoringRules::default()
        };
        let mut aquarium = tank();
        let mut player = player_at(Vec2::new(300.0, 300.0));
        player.set_power(5);

        place(&mut aquarium, CreatureKind::BiggerFish, Vec2::new(300.0, 300.0));
        let event = detect_aquarium_collisions(&mut aquarium, &mut player, &rules);
        assert!(matches!(
            event,
            GameEvent::Collision {
                outcome: CollisionOutcome::Consumed {
                    score_gained: 5,
                    power_gained: 2,
                    lives_gained: 1,
                },
                ..
            }
        ));
        assert_eq!(player.power(), 7);
        assert_eq!(player.lives(), 4);
    }

    #[test]
    fn test_health_power_up() {
        let rules = ScoringRules::default();
        let mut aquarium = tank();
        aquarium.add_power_up(PowerUp::new(PowerUpId(0), PowerUpKind::Health, Vec2::new(200.0, 200.0)));
        let mut player = player_at(Vec2::new(210.0, 200.0));
        player.set_lives(1);

        let event = detect_power_up_collisions(&mut aquarium, &mut player, &rules);
        assert!(event.is_power_up_event());
        assert_eq!(player.lives(), 2);
        assert_eq!(aquarium.power_up_count(), 0);

        let event = detect_power_up_collisions(&mut aquarium, &mut player, &rules);
        assert!(event.is_none());
    }

    #[test]
    fn test_health_at_max_lives_still_consumed() {
        let rules = ScoringRules::default();
        let mut aquarium = tank();
        aquarium.add_power_up(PowerUp::new(PowerUpId(0), PowerUpKind::Health, Vec2::new(200.0, 200.0)));
        let mut player = player_at(Vec2::new(200.0, 200.0));
        player.set_lives(rules.max_lives);

        assert!(detect_power_up_collisions(&mut aquarium, &mut player, &rules).is_power_up_event());
        assert_eq!(player.lives(), rules.max_lives);
        assert_eq!(aquarium.power_up_count(), 0);
    }

    #[test]
    fn test_collisions_after_movement() {
        // A fish swimming into a stationary player is caught on post-move positions
        let mut aquarium = tank();
        place(&mut aquarium, CreatureKind::NPCreature, Vec2::new(100.0, 300.0));
        let mut player = player_at(Vec2::new(150.0, 300.0));
        player.set_power(1);
        assert!(detect_aquarium_collisions(&mut aquarium, &mut player, &ScoringRules::default()).is_none());

        for _ in 0..10 {
            aquarium.update(SIM_DT);
        }
        let event = detect_aquarium_collisions(&mut aquarium, &mut player, &ScoringRules::default());
        assert!(event.is_collision_event());
    }

    proptest! {
        #[test]
        fn prop_check_collision_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0, ar in 0.0f32..80.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0, br in 0.0f32..80.0,
        ) {
            let a = PlayerCreature::new(Vec2::new(ax, ay), 0.0, ar);
            let b = Creature {
                radius: br,
                ..Creature::new(CreatureId(1), CreatureKind::NPCreature, Vec2::new(bx, by), Vec2::X)
            };
            prop_assert_eq!(check_collision(&a, &b), check_collision(&b, &a));
        }
    }
}
