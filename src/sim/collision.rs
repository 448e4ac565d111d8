//! Per-frame interaction pass
//!
//! Runs after every entity has moved. Order: player vs enemies (and
//! fall-outs), player vs collectibles, explosions vs enemies, then the level
//! completion check. A hit ends the pass early.

use super::enemy::Enemy;
use super::entities::EntityManager;
use super::geometry::Rect;
use super::state::{GameEvent, Progress, Transition};
use crate::consts::EXPLOSION_KILL_POINTS;

/// Candidate enemy positions after the player loses a life
pub const RESPAWN_POINTS: [(f32, f32); 7] = [
    (700.0, 500.0),
    (50.0, 500.0),
    (700.0, 200.0),
    (50.0, 200.0),
    (400.0, 200.0),
    (600.0, 400.0),
    (200.0, 400.0),
];
/// Respawn points must be at least this far (horizontally) from the player
pub const RESPAWN_MIN_DISTANCE: f32 = 200.0;

/// Resolve every interaction for this frame
pub fn check_all(entities: &mut EntityManager, progress: &mut Progress, events: &mut Vec<GameEvent>) -> Transition {
    if let Some(transition) = check_enemy_collisions(entities, events) {
        return transition;
    }

    progress.collectibles_collected += check_collectible_collisions(entities, events);
    check_projectile_collisions(entities, events);

    if progress.is_complete() {
        events.push(GameEvent::BestScore {
            score: entities.player.score,
        });
        return Transition::LevelComplete;
    }
    Transition::None
}

/// Enemy contact or a fall out of the world. A shield soaks one enemy hit.
pub fn check_enemy_collisions(entities: &mut EntityManager, events: &mut Vec<GameEvent>) -> Option<Transition> {
    let fell_out = std::mem::take(&mut entities.player_fell_out);
    let player_rect = *entities.player.rect();
    let hit = entities
        .enemies
        .iter()
        .any(|e| e.rect().intersects(&player_rect));

    if !fell_out && !hit {
        return None;
    }

    if !fell_out && entities.player.shield {
        entities.player.shield = false;
        respawn_enemies(&mut entities.enemies, &player_rect);
        log::info!("Shield absorbed a hit");
        return Some(Transition::None);
    }

    events.push(GameEvent::Damage);
    entities.player.take_damage();
    if !entities.player.is_alive() {
        events.push(GameEvent::GameOver {
            score: entities.player.score,
        });
        return Some(Transition::GameOver);
    }

    let player_rect = *entities.player.rect();
    respawn_enemies(&mut entities.enemies, &player_rect);
    Some(Transition::LifeLost)
}

/// Pick up every touched collectible. Returns how many were taken.
pub fn check_collectible_collisions(entities: &mut EntityManager, events: &mut Vec<GameEvent>) -> u32 {
    let player_rect = *entities.player.rect();
    let mut taken = 0;
    let mut points = 0;
    entities.collectibles.retain_mut(|c| {
        if c.collected || !c.rect.intersects(&player_rect) {
            return true;
        }
        let value = c.collect();
        points += value;
        taken += 1;
        events.push(GameEvent::Point { value });
        false
    });
    entities.player.add_points(points);
    taken
}

/// Remove enemies caught in an open blast window. Returns the kill count.
pub fn check_projectile_collisions(entities: &mut EntityManager, events: &mut Vec<GameEvent>) -> u32 {
    let blasts: Vec<Rect> = entities
        .projectiles
        .iter()
        .filter_map(|p| p.explosion_rect())
        .collect();
    if blasts.is_empty() {
        return 0;
    }

    let before = entities.enemies.len();
    entities
        .enemies
        .retain(|e| !blasts.iter().any(|b| b.intersects(e.rect())));
    let kills = (before - entities.enemies.len()) as u32;

    for _ in 0..kills {
        entities.player.add_points(EXPLOSION_KILL_POINTS);
        events.push(GameEvent::EnemyKilled);
        events.push(GameEvent::Point {
            value: EXPLOSION_KILL_POINTS,
        });
    }
    kills
}

/// Move every enemy to a spawn point far from the player, cycling through them
pub fn respawn_enemies(enemies: &mut [Enemy], player: &Rect) {
    let player_x = player.center_x();
    let far: Vec<(f32, f32)> = RESPAWN_POINTS
        .iter()
        .copied()
        .filter(|(x, _)| (x - player_x).abs() > RESPAWN_MIN_DISTANCE)
        .collect();
    let points: &[(f32, f32)] = if far.is_empty() { &RESPAWN_POINTS } else { &far };

    for (enemy, (x, y)) in enemies.iter_mut().zip(points.iter().cycle()) {
        enemy.reposition(*x, *y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::q_learning::QModel;
    use crate::config::PlayerColor;
    use crate::consts::*;
    use crate::sim::collectible::Collectible;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::level::EnemySpawn;
    use crate::sim::player::Player;
    use crate::sim::projectile::Projectile;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn manager() -> EntityManager {
        EntityManager::new(Player::spawned(PlayerColor::Blue), QModel::empty(0.1))
    }

    fn add_enemy(m: &mut EntityManager, kind: EnemyKind, x: f32, y: f32) {
        let spawn = EnemySpawn {
            kind,
            x,
            y,
            speed: ENEMY_SPEED,
        };
        m.spawn_enemy(&spawn, &mut Pcg32::seed_from_u64(x as u64));
    }

    #[test]
    fn test_no_contact_is_none() {
        let mut m = manager();
        add_enemy(&mut m, EnemyKind::Barrel, 600.0, 100.0);
        let mut progress = Progress::default();
        let mut events = Vec::new();
        assert_eq!(check_all(&mut m, &mut progress, &mut events), Transition::None);
        assert!(events.is_empty());
    }

    #[test]
    fn test_enemy_hit_loses_life_and_respawns_enemies() {
        let mut m = manager();
        add_enemy(&mut m, EnemyKind::Barrel, 105.0, 505.0);
        add_enemy(&mut m, EnemyKind::Monster, 300.0, 100.0);
        let mut events = Vec::new();
        let t = check_all(&mut m, &mut Progress::default(), &mut events);
        assert_eq!(t, Transition::LifeLost);
        assert_eq!(m.player.lives, PLAYER_START_LIVES - 1);
        assert_eq!(events, vec![GameEvent::Damage]);

        let px = m.player.rect().center_x();
        for enemy in &m.enemies {
            assert!((enemy.rect().x - px).abs() > RESPAWN_MIN_DISTANCE);
        }
        // Cycles through distinct far points
        assert_ne!(m.enemies[0].rect().position(), m.enemies[1].rect().position());
    }

    #[test]
    fn test_shield_absorbs_hit() {
        let mut m = manager();
        m.player.shield = true;
        add_enemy(&mut m, EnemyKind::Barrel, 105.0, 505.0);
        let mut events = Vec::new();
        let t = check_all(&mut m, &mut Progress::default(), &mut events);
        assert_eq!(t, Transition::None);
        assert_eq!(m.player.lives, PLAYER_START_LIVES);
        assert!(!m.player.shield);
        assert!(!m.enemies[0].rect().intersects(m.player.rect()));
    }

    #[test]
    fn test_fall_out_costs_a_life() {
        let mut m = manager();
        m.player_fell_out = true;
        let t = check_all(&mut m, &mut Progress::default(), &mut Vec::new());
        assert_eq!(t, Transition::LifeLost);
        assert!(!m.player_fell_out);
    }

    #[test]
    fn test_collecting_last_needed_completes_level() {
        let mut m = manager();
        m.collectibles.push(Collectible::new(110.0, 510.0, 50));
        let mut progress = Progress {
            collectibles_collected: COLLECTIBLES_PER_LEVEL - 1,
            ..Default::default()
        };
        let mut events = Vec::new();
        let t = check_all(&mut m, &mut progress, &mut events);
        assert_eq!(t, Transition::LevelComplete);
        assert!(m.collectibles.is_empty());
        assert_eq!(
            events,
            vec![GameEvent::Point { value: 50 }, GameEvent::BestScore { score: 50 }]
        );
    }

    #[test]
    fn test_explosion_kills_enemies_in_blast() {
        let mut m = manager();
        add_enemy(&mut m, EnemyKind::Barrel, 400.0, 300.0);
        add_enemy(&mut m, EnemyKind::Monster, 700.0, 100.0);
        let mut projectile = Projectile::new(Vec2::new(405.0, 305.0), Vec2::new(500.0, 305.0));
        projectile.explode();
        m.projectiles.push(projectile);

        let mut events = Vec::new();
        assert_eq!(check_projectile_collisions(&mut m, &mut events), 1);
        assert_eq!(m.enemies.len(), 1);
        assert_eq!(m.enemies[0].kind(), EnemyKind::Monster);
        assert_eq!(m.player.score, EXPLOSION_KILL_POINTS);
        assert!(events.contains(&GameEvent::EnemyKilled));
    }

    #[test]
    fn test_respawn_skips_points_near_player() {
        let mut m = manager();
        for x in [0.0, 30.0, 60.0] {
            add_enemy(&mut m, EnemyKind::Barrel, x, 0.0);
        }
        // Player at the spawn point: (50, _) and (200, _) are too close
        let player = *m.player.rect();
        respawn_enemies(&mut m.enemies, &player);
        let positions: Vec<Vec2> = m.enemies.iter().map(|e| e.rect().position()).collect();
        assert_eq!(
            positions,
            vec![Vec2::new(700.0, 500.0), Vec2::new(700.0, 200.0), Vec2::new(400.0, 200.0)]
        );
    }
}
