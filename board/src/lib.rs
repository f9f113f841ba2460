#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Concrete tile board over a fixed, configured route.
//!
//! The route is authored as grid waypoints joined by axis-aligned runs and
//! never changes shape. Players may build walls and towers beside it, add
//! spawn points along it and pull the destination closer to the spawns.

mod towers;

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tile_defence_core::{Direction, EnemyHandle, PathGraph, Ray, TileId, TowerKind};
use tile_defence_game::{Board, TargetField};

use crate::towers::Tower;
pub use crate::towers::{LaserConfig, MortarConfig};

/// Column and row of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    /// Zero-based column, growing eastward.
    pub column: u32,
    /// Zero-based row, growing northward.
    pub row: u32,
}

impl GridCell {
    /// Creates a new grid cell.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// Layout and tower tunables of a [`TrackBoard`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Waypoints of the route, from the default spawn point to the default destination.
    pub route: Vec<GridCell>,
    /// Whether the grid overlay starts visible.
    pub show_grid: bool,
    /// Laser tower tunables.
    pub laser: LaserConfig,
    /// Mortar tower tunables.
    pub mortar: MortarConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: 11,
            rows: 11,
            route: vec![
                GridCell::new(0, 1),
                GridCell::new(9, 1),
                GridCell::new(9, 5),
                GridCell::new(1, 5),
                GridCell::new(1, 9),
                GridCell::new(10, 9),
            ],
            show_grid: true,
            laser: LaserConfig::default(),
            mortar: MortarConfig::default(),
        }
    }
}

/// Reasons a [`BoardConfig`] is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// Grid without tiles.
    #[error("board of {columns}x{rows} tiles has no room for a route")]
    EmptyGrid {
        /// Configured columns.
        columns: u32,
        /// Configured rows.
        rows: u32,
    },
    /// Grid with more tiles than tile ids can address.
    #[error("board of {columns}x{rows} tiles exceeds the addressable tile count")]
    GridTooLarge {
        /// Configured columns.
        columns: u32,
        /// Configured rows.
        rows: u32,
    },
    /// Waypoint outside the grid.
    #[error("waypoint {0:?} lies outside the board")]
    WaypointOutOfBounds(GridCell),
    /// Consecutive waypoints that share neither column nor row.
    #[error("route run from {from:?} to {to:?} is not axis-aligned")]
    DiagonalRun {
        /// Start of the run.
        from: GridCell,
        /// End of the run.
        to: GridCell,
    },
    /// Route that enters a cell twice.
    #[error("route visits {0:?} more than once")]
    RouteRevisitsCell(GridCell),
    /// Route with fewer than two cells.
    #[error("route must cover at least two cells, found {0}")]
    RouteTooShort(usize),
}

/// Board whose enemies follow one fixed route.
#[derive(Debug)]
pub struct TrackBoard {
    config: BoardConfig,
    route: Vec<TileId>,
    route_index: Vec<Option<usize>>,
    directions: Vec<Direction>,
    destination: usize,
    spawn_points: Vec<TileId>,
    walls: BTreeSet<TileId>,
    towers: BTreeMap<TileId, Tower>,
    show_grid: bool,
    show_paths: bool,
}

impl TrackBoard {
    /// Lays out the configured route with its default spawn point and destination.
    pub fn new(config: BoardConfig) -> Result<Self, BoardError> {
        if config.columns == 0 || config.rows == 0 {
            return Err(BoardError::EmptyGrid {
                columns: config.columns,
                rows: config.rows,
            });
        }
        let Some(tile_count) = config.columns.checked_mul(config.rows) else {
            return Err(BoardError::GridTooLarge {
                columns: config.columns,
                rows: config.rows,
            });
        };
        let cells = expand_route(&config)?;
        let tile_count = tile_count as usize;

        let mut route = Vec::with_capacity(cells.len());
        let mut route_index = vec![None; tile_count];
        for (index, cell) in cells.iter().enumerate() {
            let tile = tile_of(&config, *cell);
            let slot = &mut route_index[tile.get() as usize];
            if slot.is_some() {
                return Err(BoardError::RouteRevisitsCell(*cell));
            }
            *slot = Some(index);
            route.push(tile);
        }

        let mut directions: Vec<Direction> = cells
            .windows(2)
            .map(|pair| direction_between(pair[0], pair[1]))
            .collect();
        if let Some(last) = directions.last().copied() {
            directions.push(last);
        }

        let mut board = Self {
            show_grid: config.show_grid,
            config,
            route,
            route_index,
            directions,
            destination: 0,
            spawn_points: Vec::new(),
            walls: BTreeSet::new(),
            towers: BTreeMap::new(),
            show_paths: false,
        };
        board.clear();
        Ok(board)
    }

    /// Configuration the board was built from.
    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Tile located at `cell`, if it lies on the board.
    #[must_use]
    pub fn tile(&self, cell: GridCell) -> Option<TileId> {
        (cell.column < self.config.columns && cell.row < self.config.rows)
            .then(|| tile_of(&self.config, cell))
    }

    /// Grid cell of `tile`.
    #[must_use]
    pub fn cell(&self, tile: TileId) -> GridCell {
        GridCell::new(
            tile.get() % self.config.columns,
            tile.get() / self.config.columns,
        )
    }

    /// Route tiles from the default spawn point up to the active destination.
    #[must_use]
    pub fn active_route(&self) -> &[TileId] {
        &self.route[..=self.destination]
    }

    /// Tile units currently walk toward.
    #[must_use]
    pub fn destination(&self) -> TileId {
        self.route[self.destination]
    }

    /// Registered spawn points in the order they were added.
    #[must_use]
    pub fn spawn_points(&self) -> &[TileId] {
        &self.spawn_points
    }

    /// Whether a wall stands on `tile`.
    #[must_use]
    pub fn is_wall(&self, tile: TileId) -> bool {
        self.walls.contains(&tile)
    }

    /// Kind of tower built on `tile`.
    #[must_use]
    pub fn tower(&self, tile: TileId) -> Option<TowerKind> {
        self.towers.get(&tile).map(Tower::kind)
    }

    /// Unit the tower on `tile` is currently tracking.
    #[must_use]
    pub fn tower_target(&self, tile: TileId) -> Option<EnemyHandle> {
        self.towers.get(&tile).and_then(Tower::target)
    }

    /// Number of towers on the board.
    #[must_use]
    pub fn tower_count(&self) -> usize {
        self.towers.len()
    }

    fn route_position(&self, tile: TileId) -> Option<usize> {
        self.route_index.get(tile.get() as usize).copied().flatten()
    }

    /// Direction a unit leaves the route tile at `index` in, toward the active destination.
    ///
    /// Tiles past a pulled-in destination lead back along the route.
    fn heading(&self, index: usize) -> Option<Direction> {
        match index.cmp(&self.destination) {
            Ordering::Less => Some(self.directions[index]),
            Ordering::Greater => Some(self.directions[index - 1].opposite()),
            Ordering::Equal => None,
        }
    }

    fn is_buildable(&self, tile: TileId) -> bool {
        (tile.get() as usize) < self.route_index.len() && self.route_position(tile).is_none()
    }
}

impl PathGraph for TrackBoard {
    fn tile_position(&self, tile: TileId) -> Vec3 {
        let cell = self.cell(tile);
        let columns = self.config.columns as f32;
        let rows = self.config.rows as f32;
        Vec3::new(
            cell.column as f32 - (columns - 1.0) * 0.5,
            0.0,
            cell.row as f32 - (rows - 1.0) * 0.5,
        )
    }

    fn exit_point(&self, tile: TileId) -> Vec3 {
        let anchor = self.tile_position(tile);
        match self.route_position(tile).and_then(|index| self.heading(index)) {
            Some(direction) => anchor + direction.half_vector(),
            None => anchor,
        }
    }

    fn path_direction(&self, tile: TileId) -> Direction {
        match self.route_position(tile) {
            Some(index) => match self.heading(index) {
                Some(direction) => direction,
                None if index > 0 => self.directions[index - 1],
                None => Direction::North,
            },
            None => Direction::North,
        }
    }

    fn next_tile_on_path(&self, tile: TileId) -> Option<TileId> {
        let index = self.route_position(tile)?;
        match index.cmp(&self.destination) {
            Ordering::Less => Some(self.route[index + 1]),
            Ordering::Greater => Some(self.route[index - 1]),
            Ordering::Equal => None,
        }
    }
}

impl Board for TrackBoard {
    fn spawn_point_count(&self) -> usize {
        self.spawn_points.len()
    }

    fn spawn_point(&self, index: usize) -> Option<TileId> {
        self.spawn_points.get(index).copied()
    }

    fn tile_at(&self, ray: &Ray) -> Option<TileId> {
        let point = ray.ground_point()?;
        let column = (point.x + self.config.columns as f32 * 0.5).floor();
        let row = (point.z + self.config.rows as f32 * 0.5).floor();
        if column < 0.0 || row < 0.0 {
            return None;
        }
        self.tile(GridCell::new(column as u32, row as u32))
    }

    fn toggle_wall(&mut self, tile: TileId) {
        if !self.is_buildable(tile) || self.towers.contains_key(&tile) {
            log::debug!("wall refused on tile {}", tile.get());
            return;
        }
        if !self.walls.remove(&tile) {
            let _ = self.walls.insert(tile);
        }
    }

    fn toggle_tower(&mut self, tile: TileId, kind: TowerKind) {
        if !self.is_buildable(tile) {
            log::debug!("{kind:?} tower refused on tile {}", tile.get());
            return;
        }
        if self.tower(tile) == Some(kind) {
            let _ = self.towers.remove(&tile);
            return;
        }
        let _ = self.walls.remove(&tile);
        let anchor = self.tile_position(tile);
        let _ = self.towers.insert(tile, Tower::new(kind, anchor));
    }

    fn toggle_spawn_point(&mut self, tile: TileId) {
        if let Some(position) = self.spawn_points.iter().position(|spawn| *spawn == tile) {
            if self.spawn_points.len() == 1 {
                log::debug!("last spawn point on tile {} kept", tile.get());
                return;
            }
            let _ = self.spawn_points.remove(position);
            return;
        }
        match self.route_position(tile) {
            Some(index) if index < self.destination => self.spawn_points.push(tile),
            _ => log::debug!("spawn point refused on tile {}", tile.get()),
        }
    }

    fn toggle_destination(&mut self, tile: TileId) {
        let Some(index) = self.route_position(tile) else {
            log::debug!("destination refused on tile {}", tile.get());
            return;
        };
        let full = self.route.len() - 1;
        let target = if index == self.destination { full } else { index };
        if target == self.destination {
            return;
        }

        let route_index = &self.route_index;
        let reachable = |spawn: &TileId| {
            route_index
                .get(spawn.get() as usize)
                .copied()
                .flatten()
                .map_or(false, |position| position < target)
        };
        if !self.spawn_points.iter().any(reachable) {
            log::debug!("destination on tile {} would strand every spawn point", tile.get());
            return;
        }
        self.spawn_points.retain(reachable);
        self.destination = target;
        log::debug!("destination moved to tile {}", self.route[target].get());
    }

    fn show_grid(&self) -> bool {
        self.show_grid
    }

    fn set_show_grid(&mut self, show: bool) {
        self.show_grid = show;
    }

    fn show_paths(&self) -> bool {
        self.show_paths
    }

    fn set_show_paths(&mut self, show: bool) {
        self.show_paths = show;
    }

    fn clear(&mut self) {
        self.walls.clear();
        self.towers.clear();
        self.spawn_points.clear();
        self.spawn_points.push(self.route[0]);
        self.destination = self.route.len() - 1;
    }

    fn game_update(&mut self, dt: f32, field: &mut dyn TargetField) {
        let laser = self.config.laser;
        let mortar = self.config.mortar;
        for tower in self.towers.values_mut() {
            tower.game_update(dt, &laser, &mortar, field);
        }
    }
}

fn tile_of(config: &BoardConfig, cell: GridCell) -> TileId {
    TileId::new(cell.row * config.columns + cell.column)
}

fn direction_between(from: GridCell, to: GridCell) -> Direction {
    if to.row > from.row {
        Direction::North
    } else if to.row < from.row {
        Direction::South
    } else if to.column > from.column {
        Direction::East
    } else {
        Direction::West
    }
}

fn expand_route(config: &BoardConfig) -> Result<Vec<GridCell>, BoardError> {
    let in_bounds = |cell: GridCell| cell.column < config.columns && cell.row < config.rows;
    let mut cells: Vec<GridCell> = Vec::new();
    for waypoint in &config.route {
        if !in_bounds(*waypoint) {
            return Err(BoardError::WaypointOutOfBounds(*waypoint));
        }
        let Some(mut current) = cells.last().copied() else {
            cells.push(*waypoint);
            continue;
        };
        if current.column != waypoint.column && current.row != waypoint.row {
            return Err(BoardError::DiagonalRun {
                from: current,
                to: *waypoint,
            });
        }
        while current != *waypoint {
            current = match direction_between(current, *waypoint) {
                Direction::North => GridCell::new(current.column, current.row + 1),
                Direction::South => GridCell::new(current.column, current.row - 1),
                Direction::East => GridCell::new(current.column + 1, current.row),
                Direction::West => GridCell::new(current.column - 1, current.row),
            };
            cells.push(current);
        }
    }
    if cells.len() < 2 {
        return Err(BoardError::RouteTooShort(cells.len()));
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(columns: u32) -> BoardConfig {
        BoardConfig {
            columns,
            rows: 3,
            route: vec![GridCell::new(0, 1), GridCell::new(columns - 1, 1)],
            ..BoardConfig::default()
        }
    }

    #[test]
    fn default_layout_is_valid() {
        let board = TrackBoard::new(BoardConfig::default()).expect("default board");
        assert_eq!(board.active_route().len(), 9 + 4 + 8 + 4 + 9 + 1);
        assert_eq!(board.spawn_points(), &[board.active_route()[0]]);
        assert!(board.show_grid());
    }

    #[test]
    fn anchors_are_centred_on_the_origin() {
        let board = TrackBoard::new(straight(5)).expect("valid board");
        let first = board.tile(GridCell::new(0, 1)).expect("on board");
        let last = board.tile(GridCell::new(4, 1)).expect("on board");
        assert_eq!(board.tile_position(first), Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(board.tile_position(last), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(board.exit_point(first), Vec3::new(-1.5, 0.0, 0.0));
        assert_eq!(board.exit_point(last), board.tile_position(last));
        assert_eq!(board.path_direction(first), Direction::East);
        assert_eq!(board.next_tile_on_path(last), None);
    }

    #[test]
    fn invalid_routes_are_rejected() {
        let mut diagonal = straight(5);
        diagonal.route.push(GridCell::new(0, 2));
        assert!(matches!(
            TrackBoard::new(diagonal),
            Err(BoardError::DiagonalRun { .. })
        ));

        let mut revisit = straight(5);
        revisit.route.push(GridCell::new(2, 1));
        assert_eq!(
            TrackBoard::new(revisit).map(|_| ()),
            Err(BoardError::RouteRevisitsCell(GridCell::new(3, 1)))
        );

        let mut outside = straight(5);
        outside.route.push(GridCell::new(4, 7));
        assert_eq!(
            TrackBoard::new(outside).map(|_| ()),
            Err(BoardError::WaypointOutOfBounds(GridCell::new(4, 7)))
        );

        let single = BoardConfig {
            route: vec![GridCell::new(1, 1)],
            ..straight(5)
        };
        assert_eq!(
            TrackBoard::new(single).map(|_| ()),
            Err(BoardError::RouteTooShort(1))
        );
    }

    #[test]
    fn rays_pick_the_tile_underneath() {
        let board = TrackBoard::new(straight(5)).expect("valid board");
        let ray = Ray::looking_down_at(0.4, -0.4);
        assert_eq!(board.tile_at(&ray), board.tile(GridCell::new(2, 1)));
        assert_eq!(board.tile_at(&Ray::looking_down_at(-2.6, 0.0)), None);
        assert_eq!(board.tile_at(&Ray::looking_down_at(0.0, 1.6)), None);
    }

    #[test]
    fn walls_and_towers_share_off_route_tiles() {
        let mut board = TrackBoard::new(straight(5)).expect("valid board");
        let beside = board.tile(GridCell::new(2, 0)).expect("on board");
        let on_route = board.tile(GridCell::new(2, 1)).expect("on board");

        board.toggle_wall(on_route);
        assert!(!board.is_wall(on_route));

        board.toggle_wall(beside);
        assert!(board.is_wall(beside));
        board.toggle_tower(beside, TowerKind::Laser);
        assert!(!board.is_wall(beside), "towers replace walls");
        assert_eq!(board.tower(beside), Some(TowerKind::Laser));

        board.toggle_wall(beside);
        assert_eq!(board.tower(beside), Some(TowerKind::Laser));

        board.toggle_tower(beside, TowerKind::Mortar);
        assert_eq!(board.tower(beside), Some(TowerKind::Mortar));
        board.toggle_tower(beside, TowerKind::Mortar);
        assert_eq!(board.tower(beside), None);

        board.toggle_tower(on_route, TowerKind::Laser);
        assert_eq!(board.tower_count(), 0);
    }

    #[test]
    fn the_last_spawn_point_cannot_be_removed() {
        let mut board = TrackBoard::new(straight(5)).expect("valid board");
        let first = board.spawn_points()[0];
        let second = board.tile(GridCell::new(1, 1)).expect("on board");

        board.toggle_spawn_point(first);
        assert_eq!(board.spawn_points(), &[first]);

        board.toggle_spawn_point(second);
        assert_eq!(board.spawn_point_count(), 2);
        board.toggle_spawn_point(first);
        assert_eq!(board.spawn_points(), &[second]);

        board.toggle_spawn_point(board.destination());
        assert_eq!(board.spawn_point_count(), 1, "destination cannot spawn");
    }

    #[test]
    fn moving_the_destination_truncates_and_restores_the_route() {
        let mut board = TrackBoard::new(straight(6)).expect("valid board");
        let full_destination = board.destination();
        let third = board.tile(GridCell::new(2, 1)).expect("on board");
        let fourth = board.tile(GridCell::new(3, 1)).expect("on board");
        board.toggle_spawn_point(fourth);

        board.toggle_destination(third);
        assert_eq!(board.destination(), third);
        assert_eq!(board.active_route().len(), 3);
        assert_eq!(board.next_tile_on_path(third), None);
        assert_eq!(board.exit_point(third), board.tile_position(third));
        assert_eq!(board.spawn_points().len(), 1, "spawn beyond destination dropped");

        board.toggle_destination(third);
        assert_eq!(board.destination(), full_destination);

        let first = board.spawn_points()[0];
        board.toggle_destination(first);
        assert_eq!(board.destination(), full_destination, "would strand all spawns");
    }

    #[test]
    fn tiles_past_a_pulled_in_destination_lead_back_to_it() {
        let mut board = TrackBoard::new(straight(6)).expect("valid board");
        let tile = |column| board.tile(GridCell::new(column, 1)).expect("on board");
        let (second, third, fourth, last) = (tile(2), tile(3), tile(4), tile(5));

        board.toggle_destination(second);
        assert_eq!(board.next_tile_on_path(fourth), Some(third));
        assert_eq!(board.next_tile_on_path(third), Some(second));
        assert_eq!(board.next_tile_on_path(last), Some(fourth));
        assert_eq!(board.path_direction(third), Direction::West);
        assert_eq!(
            board.exit_point(third),
            board.tile_position(third) + Direction::West.half_vector()
        );
        assert_eq!(board.path_direction(second), Direction::East, "arrival heading");
        assert_eq!(board.next_tile_on_path(second), None);
    }

    #[test]
    fn grids_beyond_the_tile_id_range_are_rejected() {
        let config = BoardConfig {
            columns: u32::MAX,
            rows: 2,
            ..straight(5)
        };
        assert_eq!(
            TrackBoard::new(config).map(|_| ()),
            Err(BoardError::GridTooLarge {
                columns: u32::MAX,
                rows: 2,
            })
        );
    }

    #[test]
    fn clear_restores_the_default_layout() {
        let mut board = TrackBoard::new(straight(6)).expect("valid board");
        let beside = board.tile(GridCell::new(1, 2)).expect("on board");
        board.toggle_wall(beside);
        board.toggle_tower(board.tile(GridCell::new(2, 2)).expect("on board"), TowerKind::Laser);
        board.toggle_spawn_point(board.tile(GridCell::new(1, 1)).expect("on board"));
        board.toggle_destination(board.tile(GridCell::new(3, 1)).expect("on board"));

        board.clear();
        assert!(!board.is_wall(beside));
        assert_eq!(board.tower_count(), 0);
        assert_eq!(board.spawn_point_count(), 1);
        assert_eq!(board.active_route().len(), 6);
    }
}
