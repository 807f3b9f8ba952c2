//! Fixed timestep simulation tick
//!
//! One ordered pipeline over the state: burn fuses, detonate, destroy blocks,
//! move enemies, resolve hits, check for a win. Clearing explosions is not
//! part of the tick; the host clears each batch by generation when its display
//! time runs out.

use std::collections::BTreeSet;

use super::blast::{self, blast_cells};
use super::grid::Position;
use super::rng::RandomSource;
use super::state::{Bomb, GameEvent, GamePhase, SimulationState};

/// Advance the session by one tick period
pub fn tick(state: &mut SimulationState, rng: &mut dyn RandomSource) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Won/Lost are terminal, Initializing has nothing to advance
    if !state.is_running() {
        return events;
    }

    let dt = state.settings.tick_ms;
    state.time_ticks += 1;
    state.time_ms += u64::from(dt);

    // 1. Burn fuses
    for bomb in &mut state.bombs {
        bomb.remaining_ms -= i64::from(dt);
    }

    // 2-3. Detonate expired bombs and clear the soft blocks they reach
    let expired = take_expired_bombs(state);
    if !expired.is_empty() {
        let origins: Vec<(Position, u32)> = expired.iter().map(|b| (b.pos, b.range)).collect();
        let detonation = blast::detonate(&mut state.grid, &origins);

        for bomb in &expired {
            events.push(GameEvent::BombDetonated { pos: bomb.pos });
        }
        for &pos in &detonation.destroyed {
            events.push(GameEvent::BlockDestroyed { pos });
        }
        log::debug!(
            "Tick {}: {} bomb(s) detonated, {} cells, {} blocks destroyed",
            state.time_ticks,
            expired.len(),
            detonation.cells.len(),
            detonation.destroyed.len()
        );

        let generation = state.push_explosion(detonation.cells);
        events.push(GameEvent::ExplosionStarted {
            generation,
            clear_after_ms: state.settings.explosion_duration_ms,
        });
    }

    // 4. Enemies wander over the post-blast board
    if state.time_ticks % u64::from(state.settings.enemy_step_ticks.max(1)) == 0 {
        for enemy in &mut state.enemies {
            enemy.wander(&state.grid, rng);
        }
    }

    // 5. Anything standing in a live explosion is hit
    let lethal = state.explosion_cells();
    if lethal.contains(&state.player) {
        state.phase = GamePhase::Lost;
        events.push(GameEvent::PlayerKilled);
        log::info!(
            "Player caught at ({}, {}) on tick {}",
            state.player.row,
            state.player.col,
            state.time_ticks
        );
    }
    state.enemies.retain(|enemy| {
        if lethal.contains(&enemy.pos) {
            events.push(GameEvent::EnemyKilled {
                id: enemy.id,
                pos: enemy.pos,
            });
            false
        } else {
            true
        }
    });

    // 6. Win only if the player survived this tick
    if state.phase == GamePhase::Running && state.enemies.is_empty() {
        state.phase = GamePhase::Won;
        events.push(GameEvent::AllEnemiesCleared);
        log::info!("All enemies cleared on tick {}", state.time_ticks);
    }

    events
}

/// Pull every bomb whose fuse has run out. With chain reactions on, live bombs
/// inside those blasts go off too, repeatedly, until no more are caught.
fn take_expired_bombs(state: &mut SimulationState) -> Vec<Bomb> {
    let (mut expired, mut live): (Vec<Bomb>, Vec<Bomb>) = std::mem::take(&mut state.bombs)
        .into_iter()
        .partition(Bomb::is_expired);

    if state.settings.chain_reactions {
        while !expired.is_empty() && !live.is_empty() {
            let reached: BTreeSet<Position> = expired
                .iter()
                .flat_map(|b| blast_cells(&state.grid, b.pos, b.range))
                .collect();
            let (caught, rest): (Vec<Bomb>, Vec<Bomb>) =
                live.into_iter().partition(|b| reached.contains(&b.pos));
            live = rest;
            if caught.is_empty() {
                break;
            }
            expired.extend(caught);
        }
    }

    state.bombs = live;
    expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::actions::{move_player, place_bomb};
    use crate::sim::enemy::Enemy;
    use crate::sim::grid::{Cell, Direction, Grid, SPAWN};
    use crate::sim::rng::{RngState, SequenceRandom};

    fn enemy(id: u32, row: usize, col: usize) -> Enemy {
        Enemy {
            id,
            pos: Position::new(row, col),
            facing: Direction::Down,
        }
    }

    fn state_with(settings: Settings, grid: Grid, enemies: Vec<Enemy>) -> SimulationState {
        SimulationState::from_parts(settings, grid, enemies)
    }

    /// Ticks until the default fuse runs out
    fn fuse_ticks(settings: &Settings) -> u32 {
        settings.bomb_timer_ms.div_ceil(settings.tick_ms)
    }

    #[test]
    fn test_bomb_detonates_when_fuse_runs_out() {
        let settings = Settings::default();
        let mut state = state_with(settings.clone(), Grid::open(9), vec![enemy(0, 7, 7)]);
        // The enemy paces between (7,7) and (6,7), far from the blast
        let mut rng = SequenceRandom::directions(&[Direction::Up, Direction::Down]);

        move_player(&mut state, Direction::Right);
        move_player(&mut state, Direction::Right);
        place_bomb(&mut state);
        move_player(&mut state, Direction::Left);
        move_player(&mut state, Direction::Left);
        move_player(&mut state, Direction::Down);
        assert_eq!(state.player, Position::new(2, 1));

        for _ in 1..fuse_ticks(&settings) {
            let events = tick(&mut state, &mut rng);
            assert!(events.is_empty());
            assert_eq!(state.bombs.len(), 1);
        }

        let events = tick(&mut state, &mut rng);
        assert!(state.bombs.is_empty());
        assert!(events.contains(&GameEvent::BombDetonated {
            pos: Position::new(1, 3)
        }));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::ExplosionStarted { clear_after_ms, .. } if *clear_after_ms == settings.explosion_duration_ms
        )));
        assert!(state.is_exploding(Position::new(1, 3)));
        assert!(state.is_exploding(Position::new(1, 1)));
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_lane_bomb_wins() {
        // 15x15 open board, one enemy near (3,3), blast range 3 down column 3
        let settings = Settings {
            soft_block_density: 0.0,
            enemy_count: 1,
            blast_range: 3,
            ..Default::default()
        };
        let mut state = state_with(settings.clone(), Grid::open(15), vec![enemy(0, 3, 3)]);
        // The enemy shuffles between (2,3) and (3,3), both in the blast
        let mut rng = SequenceRandom::directions(&[Direction::Up, Direction::Down]);

        move_player(&mut state, Direction::Right);
        move_player(&mut state, Direction::Right);
        assert_eq!(state.player, Position::new(1, 3));
        place_bomb(&mut state);
        move_player(&mut state, Direction::Left);
        move_player(&mut state, Direction::Left);
        move_player(&mut state, Direction::Down);

        let mut all_events = Vec::new();
        for _ in 0..fuse_ticks(&settings) {
            all_events.extend(tick(&mut state, &mut rng));
        }

        assert_eq!(state.phase, GamePhase::Won);
        assert!(state.enemies.is_empty());
        assert_eq!(
            all_events
                .iter()
                .filter(|e| **e == GameEvent::AllEnemiesCleared)
                .count(),
            1
        );
        assert!(!all_events.contains(&GameEvent::PlayerKilled));

        // Terminal: nothing else happens
        assert!(tick(&mut state, &mut rng).is_empty());
    }

    #[test]
    fn test_standing_on_own_bomb_loses_once() {
        let settings = Settings::default();
        let mut state = state_with(settings.clone(), Grid::open(9), vec![enemy(0, 7, 7)]);
        let mut rng = RngState::new(5).to_rng();

        place_bomb(&mut state);
        let mut kills = 0;
        for _ in 0..fuse_ticks(&settings) + 5 {
            kills += tick(&mut state, &mut rng)
                .iter()
                .filter(|e| **e == GameEvent::PlayerKilled)
                .count();
        }
        assert_eq!(kills, 1);
        assert_eq!(state.phase, GamePhase::Lost);
        assert_eq!(state.time_ticks, u64::from(fuse_ticks(&settings)));
    }

    #[test]
    fn test_loss_beats_win_in_same_blast() {
        let settings = Settings::default();
        // Last enemy pinned at (1,2): Up is the border
        let mut state = state_with(settings.clone(), Grid::open(7), vec![enemy(0, 1, 2)]);
        let mut rng = SequenceRandom::directions(&[Direction::Up]);

        place_bomb(&mut state);
        let mut events = Vec::new();
        for _ in 0..fuse_ticks(&settings) {
            events.extend(tick(&mut state, &mut rng));
        }

        assert_eq!(state.phase, GamePhase::Lost);
        assert!(events.contains(&GameEvent::PlayerKilled));
        assert!(events.contains(&GameEvent::EnemyKilled {
            id: 0,
            pos: Position::new(1, 2)
        }));
        assert!(!events.contains(&GameEvent::AllEnemiesCleared));
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_enemy_walks_into_destroyed_block_and_dies() {
        let settings = Settings {
            bomb_timer_ms: 300,
            blast_range: 1,
            ..Default::default()
        };
        let grid = Grid::from_ascii(&[
            "#######",
            "#.....#",
            "#.#.#.#",
            "#..+..#",
            "#.#.#.#",
            "#.....#",
            "#######",
        ]);
        // Bomb at (3,2) reaches the soft block at (3,3); enemy at (3,4) steps left into it
        let mut state = state_with(
            settings,
            grid,
            vec![enemy(0, 3, 4), enemy(1, 5, 5)],
        );
        state.player = Position::new(3, 2);
        place_bomb(&mut state);
        state.player = Position::new(1, 5);

        let mut rng = SequenceRandom::directions(&[Direction::Left, Direction::Down]);
        let events = tick(&mut state, &mut rng);

        assert_eq!(state.grid.get(Position::new(3, 3)), Some(Cell::Empty));
        assert!(events.contains(&GameEvent::BlockDestroyed {
            pos: Position::new(3, 3)
        }));
        assert!(events.contains(&GameEvent::EnemyKilled {
            id: 0,
            pos: Position::new(3, 3)
        }));
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.phase, GamePhase::Running);
    }

    /// Bomb at (1,3) goes off on tick 1; enemy 0 reaches (2,3) on tick 3.
    /// Returns the events of tick 3.
    fn walk_into_old_blast(clear_first: bool) -> (SimulationState, Vec<GameEvent>) {
        let settings = Settings {
            bomb_timer_ms: 300,
            blast_range: 1,
            ..Default::default()
        };
        let mut state = state_with(
            settings,
            Grid::open(7),
            vec![enemy(0, 3, 3), enemy(1, 5, 5)],
        );
        state.player = Position::new(1, 3);
        place_bomb(&mut state);
        state.player = Position::new(5, 1);

        // Draws alternate enemy 0, enemy 1
        let mut rng = SequenceRandom::directions(&[
            Direction::Down,
            Direction::Up,
            Direction::Up,
            Direction::Down,
            Direction::Up,
            Direction::Up,
        ]);

        let first = tick(&mut state, &mut rng);
        assert!(!first.iter().any(|e| matches!(e, GameEvent::EnemyKilled { .. })));
        let generation = match first.last() {
            Some(GameEvent::ExplosionStarted { generation, .. }) => *generation,
            other => panic!("expected ExplosionStarted, got {other:?}"),
        };
        if clear_first {
            assert!(state.clear_explosion(generation));
        }

        tick(&mut state, &mut rng);
        assert_eq!(state.enemies[0].pos, Position::new(3, 3));
        let third = tick(&mut state, &mut rng);
        (state, third)
    }

    #[test]
    fn test_lingering_explosion_stays_lethal() {
        let (state, events) = walk_into_old_blast(false);
        assert_eq!(
            events,
            vec![GameEvent::EnemyKilled {
                id: 0,
                pos: Position::new(2, 3)
            }]
        );
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_cleared_explosion_is_harmless() {
        let (state, events) = walk_into_old_blast(true);
        assert!(events.is_empty());
        assert_eq!(state.enemies.len(), 2);
        assert_eq!(state.enemies[0].pos, Position::new(2, 3));
    }

    #[test]
    fn test_chain_reaction_toggle() {
        for chain in [false, true] {
            let settings = Settings {
                chain_reactions: chain,
                blast_range: 2,
                ..Default::default()
            };
            let mut state = state_with(settings, Grid::open(9), vec![enemy(0, 7, 7)]);
            let mut rng = SequenceRandom::directions(&[Direction::Up]);

            state.player = Position::new(1, 3);
            place_bomb(&mut state);
            // Second bomb inside the first one's blast, with a long fuse
            state.player = Position::new(1, 5);
            place_bomb(&mut state);
            state.bombs[1].remaining_ms = 10_000;
            state.bombs[0].remaining_ms = 1;
            state.player = Position::new(5, 1);

            let events = tick(&mut state, &mut rng);
            let detonated = events
                .iter()
                .filter(|e| matches!(e, GameEvent::BombDetonated { .. }))
                .count();
            if chain {
                assert_eq!(detonated, 2);
                assert!(state.bombs.is_empty());
                assert!(state.is_exploding(Position::new(1, 7)));
            } else {
                assert_eq!(detonated, 1);
                assert_eq!(state.bombs.len(), 1);
                assert!(!state.is_exploding(Position::new(1, 7)));
            }
        }
    }

    #[test]
    fn test_enemy_step_interval() {
        let settings = Settings {
            enemy_step_ticks: 2,
            ..Default::default()
        };
        let mut state = state_with(settings, Grid::open(7), vec![enemy(0, 3, 3)]);
        let mut rng = SequenceRandom::directions(&[Direction::Right]);

        tick(&mut state, &mut rng);
        assert_eq!(state.enemies[0].pos, Position::new(3, 3));
        tick(&mut state, &mut rng);
        assert_eq!(state.enemies[0].pos, Position::new(3, 4));
    }

    #[test]
    fn test_no_tick_when_not_running() {
        let mut state = state_with(Settings::default(), Grid::open(7), vec![enemy(0, 3, 3)]);
        state.phase = GamePhase::Won;
        let mut rng = SequenceRandom::directions(&[Direction::Right]);
        assert!(tick(&mut state, &mut rng).is_empty());
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.player, SPAWN);
    }

    #[test]
    fn test_determinism() {
        let settings = Settings::default();
        let mut rng1 = RngState::new(99999).to_rng();
        let mut rng2 = RngState::new(99999).to_rng();
        let mut state1 = SimulationState::new(&settings, &mut rng1).unwrap();
        let mut state2 = SimulationState::new(&settings, &mut rng2).unwrap();

        for i in 0..40 {
            if i % 9 == 0 {
                place_bomb(&mut state1);
                place_bomb(&mut state2);
            }
            tick(&mut state1, &mut rng1);
            tick(&mut state2, &mut rng2);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.enemies, state2.enemies);
        assert_eq!(state1.grid, state2.grid);
    }
}
