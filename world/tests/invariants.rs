use std::time::Duration;

use gate_runner_core::{Command, Direction, Outcome, Tile};
use gate_runner_world::{apply, load, query, GameConfig, World};
use proptest::prelude::*;

const ARENA: &str = "\
111111111
1C00000C1
100000001
1000C0001
10000000E
100000001
10C0P0001
111111111
";

#[derive(Clone, Debug)]
enum Input {
    Move(Direction),
    Shoot,
    Wait(u64),
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        3 => direction().prop_map(Input::Move),
        1 => Just(Input::Shoot),
        4 => (0u64..700).prop_map(Input::Wait),
    ]
}

fn risen_rows_are_walls(world: &World) -> bool {
    let map = query::map(world);
    let bottom = map.rows().saturating_sub(1);
    (query::wall_level(world)..bottom).all(|row| {
        map.row(row)
            .map_or(false, |tiles| tiles.iter().all(|tile| tile.is_wall()))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn play_preserves_world_invariants(
        seed in any::<u64>(),
        inputs in prop::collection::vec(input(), 1..200),
    ) {
        let config = GameConfig {
            rng_seed: seed,
            ..GameConfig::default()
        };
        let mut world = World::from_map_source(config, ARENA).expect("arena loads");
        let mut now = Duration::ZERO;
        let mut wall_level = query::wall_level(&world);

        for input in inputs {
            let before = (
                query::player_cell(&world),
                query::moves(&world),
                query::army(&world),
            );
            let mut events = Vec::new();
            let moved = matches!(input, Input::Move(_));
            let command = match input {
                Input::Move(direction) => Command::Move { direction },
                Input::Shoot => Command::Shoot { now },
                Input::Wait(millis) => {
                    now += Duration::from_millis(millis);
                    Command::Tick { now }
                }
            };
            apply(&mut world, command, &mut events);

            prop_assert!(query::army(&world) >= 0);
            prop_assert!(query::wall_level(&world) <= wall_level);
            wall_level = query::wall_level(&world);
            prop_assert!(risen_rows_are_walls(&world));

            if moved && events.is_empty() {
                let after = (
                    query::player_cell(&world),
                    query::moves(&world),
                    query::army(&world),
                );
                prop_assert_eq!(before, after);
            }

            if query::outcome(&world) == Outcome::InProgress {
                let cell = query::player_cell(&world);
                prop_assert!(query::is_legal_ground(&world, cell));
                prop_assert_ne!(query::tile(&world, cell), Some(Tile::Wall));
            }

            prop_assert!(query::projectiles(&world).count() <= query::config(&world).projectile_pool);
        }
    }

    #[test]
    fn arbitrary_grids_never_panic(
        rows in prop::collection::vec(
            prop::collection::vec(prop::sample::select(vec!['0', '1', 'C', 'E', 'P']), 3..9),
            1..9,
        ),
    ) {
        let source: String = rows
            .iter()
            .map(|row| row.iter().collect::<String>() + "\n")
            .collect();

        if let Ok(loaded) = load(&source) {
            let map = &loaded.map;
            prop_assert!(map.collectible_count() >= 1);
            prop_assert_eq!(map.tile(loaded.exit), Some(Tile::Exit));
            prop_assert_eq!(map.tile(loaded.player_start), Some(Tile::Floor));
            for (cell, tile) in map.cells() {
                if map.is_border(cell) {
                    prop_assert!(matches!(tile, Tile::Wall | Tile::Exit));
                }
            }
        }
    }
}
