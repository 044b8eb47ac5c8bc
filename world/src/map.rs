//! Level grid parsing, validation and the mutable tile map used during play.

use gate_runner_core::{CellCoord, Direction, GateId, Tile};
use thiserror::Error;

const WALL: char = '1';
const FLOOR: char = '0';
const COLLECTIBLE: char = 'C';
const EXIT: char = 'E';
const PLAYER: char = 'P';

/// Reasons a map source is rejected at load time.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MapError {
    /// A row's width differs from the first row.
    #[error("row {row} is {found} cells wide but the first row is {expected}")]
    NotRectangular {
        /// Zero-based index of the offending row.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// A cell holds a symbol outside the map alphabet.
    #[error("unexpected symbol {symbol:?} at {cell}")]
    InvalidCharacter {
        /// Location of the first invalid symbol in raster order.
        cell: CellCoord,
        /// The rejected symbol.
        symbol: char,
    },
    /// A border cell is neither a wall nor the exit.
    #[error("border cell {cell} must be a wall or the exit")]
    BorderViolation {
        /// Location of the first open border cell in raster order.
        cell: CellCoord,
    },
    /// The map does not hold exactly one player, one exit and some collectibles.
    #[error(
        "expected one player, one exit and at least one collectible, \
         found {players} player(s), {exits} exit(s) and {collectibles} collectible(s)"
    )]
    BadEntityCount {
        /// Number of player start symbols.
        players: u32,
        /// Number of exit symbols.
        exits: u32,
        /// Number of collectible symbols.
        collectibles: u32,
    },
    /// A collectible or the exit cannot be reached from the player start.
    #[error("cell {cell} cannot be reached from the player start")]
    Unreachable {
        /// Location of the first unreachable target in raster order.
        cell: CellCoord,
    },
}

/// Validated level returned by [`load`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedMap {
    /// Tile grid with the player start normalised to floor.
    pub map: GameMap,
    /// Cell where the player begins the level.
    pub player_start: CellCoord,
    /// Cell holding the level exit.
    pub exit: CellCoord,
}

/// Rectangular tile grid of a level together with its gate bindings.
///
/// Each collectible discovered during parsing receives a [`GateId`] equal to
/// its raster-order index. The binding is stored per cell and survives the
/// collectible being consumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameMap {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
    gates: Vec<Option<GateId>>,
    collectibles: Vec<CellCoord>,
}

impl GameMap {
    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile stored at `cell`, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.index(cell).map(|index| self.tiles[index])
    }

    /// Reports whether `cell` blocks movement. Cells outside the grid block.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.tile(cell).map_or(true, Tile::is_wall)
    }

    /// Gate permanently bound to `cell`, if the cell started as a collectible.
    #[must_use]
    pub fn gate_at(&self, cell: CellCoord) -> Option<GateId> {
        self.index(cell).and_then(|index| self.gates[index])
    }

    /// Cells that started as collectibles, indexed by gate id.
    #[must_use]
    pub fn collectible_cells(&self) -> &[CellCoord] {
        &self.collectibles
    }

    /// Number of collectibles the level started with.
    #[must_use]
    pub fn collectible_count(&self) -> usize {
        self.collectibles.len()
    }

    /// Tiles of a single row, left to right.
    #[must_use]
    pub fn row(&self, row: u32) -> Option<&[Tile]> {
        if row >= self.rows {
            return None;
        }
        let width = self.columns as usize;
        let start = row as usize * width;
        self.tiles.get(start..start + width)
    }

    /// Iterates every cell with its tile in raster order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, Tile)> + '_ {
        let columns = self.columns.max(1);
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *tile)
        })
    }

    /// Reports whether `cell` lies on the outer ring of the grid.
    #[must_use]
    pub fn is_border(&self, cell: CellCoord) -> bool {
        cell.column() == 0
            || cell.row() == 0
            || cell.column() + 1 == self.columns
            || cell.row() + 1 == self.rows
    }

    pub(crate) fn set_tile(&mut self, cell: CellCoord, tile: Tile) {
        if let Some(index) = self.index(cell) {
            self.tiles[index] = tile;
        }
    }

    /// Turns every cell of `row` into a wall.
    pub(crate) fn raise_row(&mut self, row: u32) {
        if row >= self.rows {
            return;
        }
        let width = self.columns as usize;
        let start = row as usize * width;
        self.tiles[start..start + width].fill(Tile::Wall);
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        Some(cell.row() as usize * self.columns as usize + cell.column() as usize)
    }
}

/// Parses and validates a level from its textual grid.
///
/// Checks run in a fixed order and the first failure is reported: shape,
/// alphabet, border, entity counts and finally reachability.
pub fn load(source: &str) -> Result<LoadedMap, MapError> {
    let lines = split_rows(source);
    if lines.is_empty() {
        return Err(MapError::BadEntityCount {
            players: 0,
            exits: 0,
            collectibles: 0,
        });
    }

    let grid: Vec<Vec<char>> = lines.iter().map(|line| line.chars().collect()).collect();
    let expected = grid[0].len();
    for (row, cells) in grid.iter().enumerate() {
        if cells.len() != expected {
            return Err(MapError::NotRectangular {
                row: to_u32(row),
                expected: to_u32(expected),
                found: to_u32(cells.len()),
            });
        }
    }

    let columns = to_u32(expected);
    let rows = to_u32(grid.len());
    let symbols = || {
        grid.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(column, symbol)| (CellCoord::new(to_u32(column), to_u32(row)), *symbol))
        })
    };

    if let Some((cell, symbol)) = symbols().find(|(_, symbol)| !is_map_symbol(*symbol)) {
        return Err(MapError::InvalidCharacter { cell, symbol });
    }

    let on_border = |cell: CellCoord| {
        cell.column() == 0 || cell.row() == 0 || cell.column() + 1 == columns || cell.row() + 1 == rows
    };
    if let Some((cell, _)) = symbols()
        .find(|(cell, symbol)| on_border(*cell) && *symbol != WALL && *symbol != EXIT)
    {
        return Err(MapError::BorderViolation { cell });
    }

    let mut players = Vec::new();
    let mut exits = Vec::new();
    let mut collectibles = Vec::new();
    for (cell, symbol) in symbols() {
        match symbol {
            PLAYER => players.push(cell),
            EXIT => exits.push(cell),
            COLLECTIBLE => collectibles.push(cell),
            _ => {}
        }
    }
    let (&[player_start], &[exit]) = (players.as_slice(), exits.as_slice()) else {
        return Err(bad_count(&players, &exits, &collectibles));
    };
    if collectibles.is_empty() {
        return Err(bad_count(&players, &exits, &collectibles));
    }

    let tiles: Vec<Tile> = symbols()
        .map(|(_, symbol)| match symbol {
            WALL => Tile::Wall,
            COLLECTIBLE => Tile::Collectible,
            EXIT => Tile::Exit,
            _ => Tile::Floor,
        })
        .collect();
    let mut gates = vec![None; tiles.len()];
    for (index, cell) in collectibles.iter().enumerate() {
        let slot = cell.row() as usize * expected + cell.column() as usize;
        gates[slot] = Some(GateId::new(to_u32(index)));
    }

    let map = GameMap {
        columns,
        rows,
        tiles,
        gates,
        collectibles,
    };

    let reached = flood_fill(&map, player_start);
    let unreachable = map
        .cells()
        .find(|(cell, tile)| {
            matches!(tile, Tile::Collectible | Tile::Exit)
                && map.index(*cell).map_or(true, |index| !reached[index])
        })
        .map(|(cell, _)| cell);
    if let Some(cell) = unreachable {
        return Err(MapError::Unreachable { cell });
    }

    Ok(LoadedMap {
        map,
        player_start,
        exit,
    })
}

fn split_rows(source: &str) -> Vec<&str> {
    let body = source.strip_suffix('\n').unwrap_or(source);
    if body.is_empty() {
        return Vec::new();
    }
    body.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

const fn is_map_symbol(symbol: char) -> bool {
    matches!(symbol, WALL | FLOOR | COLLECTIBLE | EXIT | PLAYER)
}

fn bad_count(players: &[CellCoord], exits: &[CellCoord], collectibles: &[CellCoord]) -> MapError {
    MapError::BadEntityCount {
        players: to_u32(players.len()),
        exits: to_u32(exits.len()),
        collectibles: to_u32(collectibles.len()),
    }
}

/// Marks every cell 4-connected to `start` through non-wall tiles.
fn flood_fill(map: &GameMap, start: CellCoord) -> Vec<bool> {
    let mut visited = vec![false; map.tiles.len()];
    let mut pending = Vec::new();

    if let Some(index) = map.index(start) {
        visited[index] = true;
        pending.push(start);
    }

    while let Some(cell) = pending.pop() {
        for direction in Direction::ALL {
            let Some(neighbor) = cell.step(direction, map.columns, map.rows) else {
                continue;
            };
            if map.is_wall(neighbor) {
                continue;
            }
            let Some(index) = map.index(neighbor) else {
                continue;
            };
            if visited[index] {
                continue;
            }
            visited[index] = true;
            pending.push(neighbor);
        }
    }

    visited
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "11111\n1P0C1\n10001\n1000E\n11111\n";

    #[test]
    fn player_start_becomes_floor() {
        let loaded = load(SMALL).expect("valid map");
        assert_eq!(loaded.player_start, CellCoord::new(1, 1));
        assert_eq!(loaded.exit, CellCoord::new(4, 3));
        assert_eq!(loaded.map.tile(loaded.player_start), Some(Tile::Floor));
        assert_eq!(loaded.map.columns(), 5);
        assert_eq!(loaded.map.rows(), 5);
    }

    #[test]
    fn gates_bind_in_raster_order() {
        let loaded = load("111111\n1C0PC1\n1C000E\n111111").expect("valid map");
        let map = &loaded.map;
        assert_eq!(
            map.collectible_cells(),
            &[
                CellCoord::new(1, 1),
                CellCoord::new(4, 1),
                CellCoord::new(1, 2)
            ]
        );
        assert_eq!(map.gate_at(CellCoord::new(4, 1)), Some(GateId::new(1)));
        assert_eq!(map.gate_at(CellCoord::new(2, 1)), None);
    }

    #[test]
    fn gate_binding_survives_consumption() {
        let mut map = load("111111\n1C0PC1\n1C000E\n111111").expect("valid map").map;
        map.set_tile(CellCoord::new(1, 1), Tile::Floor);
        assert_eq!(map.gate_at(CellCoord::new(1, 2)), Some(GateId::new(2)));
    }

    #[test]
    fn carriage_returns_are_ignored() {
        let loaded = load("11111\r\n1P0C1\r\n1000E\r\n11111\r\n").expect("valid map");
        assert_eq!(loaded.map.columns(), 5);
    }

    #[test]
    fn raising_a_row_walls_it_off() {
        let mut map = load(SMALL).expect("valid map").map;
        map.raise_row(3);
        assert!(map
            .row(3)
            .expect("row exists")
            .iter()
            .all(|tile| tile.is_wall()));
        assert_eq!(map.tile(CellCoord::new(3, 1)), Some(Tile::Collectible));
    }

    #[test]
    fn outside_cells_count_as_walls() {
        let map = load(SMALL).expect("valid map").map;
        assert!(map.is_wall(CellCoord::new(5, 1)));
        assert!(!map.is_wall(CellCoord::new(2, 2)));
    }
}
