use gate_runner_core::{CellCoord, GateId, Tile};
use gate_runner_world::{load, Campaign, CampaignError, Level, MapError};

#[test]
fn well_formed_map_loads() {
    let loaded = load("1111111\n1P0C0E1\n1000001\n1111111\n").expect("map must load");

    assert_eq!(loaded.player_start, CellCoord::new(1, 1));
    assert_eq!(loaded.exit, CellCoord::new(5, 1));
    assert_eq!(loaded.map.collectible_count(), 1);
    assert_eq!(loaded.map.gate_at(CellCoord::new(3, 1)), Some(GateId::new(0)));
    assert_eq!(loaded.map.tile(CellCoord::new(5, 1)), Some(Tile::Exit));
}

#[test]
fn trailing_newline_is_optional() {
    let with = load("11111\n1PCE1\n11111\n").expect("map must load");
    let without = load("11111\n1PCE1\n11111").expect("map must load");
    assert_eq!(with, without);
}

#[test]
fn ragged_rows_are_rejected() {
    let error = load("11111\n1PCE1\n1111\n").expect_err("ragged map");
    assert_eq!(
        error,
        MapError::NotRectangular {
            row: 2,
            expected: 5,
            found: 4
        }
    );
}

#[test]
fn unknown_symbols_are_rejected() {
    let error = load("11111\n1PXE1\n1C001\n11111").expect_err("bad symbol");
    assert_eq!(
        error,
        MapError::InvalidCharacter {
            cell: CellCoord::new(2, 1),
            symbol: 'X'
        }
    );
}

#[test]
fn open_border_is_rejected() {
    let error = load("11111\n0PCE1\n11111").expect_err("open border");
    assert_eq!(
        error,
        MapError::BorderViolation {
            cell: CellCoord::new(0, 1)
        }
    );
}

#[test]
fn exit_may_sit_on_the_border() {
    let loaded = load("11111\n1PC01\n1000E\n11111").expect("exit on border");
    assert_eq!(loaded.exit, CellCoord::new(4, 2));
}

#[test]
fn entity_counts_are_checked() {
    let two_players = load("111111\n1PPCE1\n111111").expect_err("two players");
    assert_eq!(
        two_players,
        MapError::BadEntityCount {
            players: 2,
            exits: 1,
            collectibles: 1
        }
    );

    let no_exit = load("11111\n1PC01\n11111").expect_err("no exit");
    assert!(matches!(no_exit, MapError::BadEntityCount { exits: 0, .. }));

    let no_collectibles = load("11111\n1P0E1\n11111").expect_err("no collectibles");
    assert!(matches!(
        no_collectibles,
        MapError::BadEntityCount {
            collectibles: 0,
            ..
        }
    ));
}

#[test]
fn empty_source_reports_missing_entities() {
    assert_eq!(
        load("").expect_err("empty map"),
        MapError::BadEntityCount {
            players: 0,
            exits: 0,
            collectibles: 0
        }
    );
}

#[test]
fn walled_off_collectible_is_unreachable() {
    let error = load("1111111\n1P0E1C1\n1111111").expect_err("sealed collectible");
    assert_eq!(
        error,
        MapError::Unreachable {
            cell: CellCoord::new(5, 1)
        }
    );
}

#[test]
fn walled_off_exit_is_unreachable() {
    let error = load("1111111\n1PC01E1\n1111111").expect_err("sealed exit");
    assert_eq!(
        error,
        MapError::Unreachable {
            cell: CellCoord::new(5, 1)
        }
    );
}

#[test]
fn checks_run_in_a_fixed_order() {
    // Ragged and carrying a bad symbol: shape wins.
    let error = load("11111\n1PXE1\n111\n").expect_err("broken map");
    assert!(matches!(error, MapError::NotRectangular { .. }));

    // Bad symbol on an open border: alphabet wins.
    let error = load("11111\nXPCE1\n11111").expect_err("broken map");
    assert!(matches!(error, MapError::InvalidCharacter { .. }));
}

#[test]
fn errors_describe_the_offending_cell() {
    let error = load("11111\n1PCE1\n11011").expect_err("open border");
    assert_eq!(
        error.to_string(),
        "border cell (2, 2) must be a wall or the exit"
    );
}

#[test]
fn large_winding_map_loads_without_recursion() {
    const SIZE: usize = 100;
    let mut rows = vec![vec!['1'; SIZE]; SIZE];
    // Serpentine corridor through every other interior row.
    for row in (1..SIZE - 1).step_by(2) {
        for column in 1..SIZE - 1 {
            rows[row][column] = '0';
        }
        if row + 2 < SIZE - 1 {
            let link = if (row / 2) % 2 == 0 { SIZE - 2 } else { 1 };
            rows[row + 1][link] = '0';
        }
    }
    rows[1][1] = 'P';
    rows[97][50] = 'C';
    rows[97][98] = 'E';
    let source: String = rows
        .iter()
        .map(|row| row.iter().collect::<String>() + "\n")
        .collect();

    let loaded = load(&source).expect("large map must load");
    assert_eq!(loaded.map.columns(), 100);
    assert_eq!(loaded.map.rows(), 100);
    assert_eq!(loaded.exit, CellCoord::new(98, 97));
}

#[test]
fn campaign_requires_a_level() {
    assert_eq!(
        Campaign::new(Vec::new()).expect_err("empty campaign"),
        CampaignError::Empty
    );
    let level = Level::parse("intro", "11111\n1PCE1\n11111").expect("valid level");
    assert_eq!(level.name(), "intro");
    assert_eq!(Campaign::single(level).len(), 1);
}
