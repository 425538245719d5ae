//! Static tile grid - the walls, floors and item spawns the actors move through.
//!
//! The grid is loaded once when the engine starts and never mutated.
//! Cell `(x, y)` covers the world rectangle
//! `[x * cell_size, (x + 1) * cell_size) × [y * cell_size, (y + 1) * cell_size)`.

use serde::{Deserialize, Serialize};

use crate::components::{Aabb, Vec2};
use crate::config::ConfigError;

/// Default grid dimensions and cell size
pub const MAP_WIDTH: u32 = 30;
pub const MAP_HEIGHT: u32 = 25;
pub const CELL_SIZE: f32 = 32.0;

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Open ground (grass)
    Open,
    Floor,
    Wall,
    /// Floor with a pickup on it at world start
    ItemSpawn,
    /// Returned for queries outside the grid
    OutOfBounds,
}

impl CellKind {
    /// Decode a layout code (0 = open, 1 = floor, 2 = wall, 3 = item)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CellKind::Open),
            1 => Some(CellKind::Floor),
            2 => Some(CellKind::Wall),
            3 => Some(CellKind::ItemSpawn),
            _ => None,
        }
    }
}

/// Whether a cell kind stops bodies. Off-grid cells block so nothing escapes the map.
pub fn is_blocking(kind: CellKind) -> bool {
    matches!(kind, CellKind::Wall | CellKind::OutOfBounds)
}

/// Immutable 2D grid of cell kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: u32,
    height: u32,
    cell_size: f32,
    cells: Vec<CellKind>,
}

impl TileGrid {
    /// Build a grid from row-major layout codes
    pub fn from_codes(
        width: u32,
        height: u32,
        cell_size: f32,
        codes: &[u8],
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidGrid(format!(
                "grid must be non-empty, got {}x{}",
                width, height
            )));
        }
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(ConfigError::InvalidGrid(format!(
                "cell size must be positive, got {}",
                cell_size
            )));
        }
        let expected = width as usize * height as usize;
        if codes.len() != expected {
            return Err(ConfigError::InvalidGrid(format!(
                "expected {} cells for {}x{}, got {}",
                expected,
                width,
                height,
                codes.len()
            )));
        }

        let mut cells = Vec::with_capacity(expected);
        for (i, &code) in codes.iter().enumerate() {
            let kind = CellKind::from_code(code).ok_or(ConfigError::UnknownCellCode {
                x: i as u32 % width,
                y: i as u32 / width,
                code,
            })?;
            cells.push(kind);
        }

        Ok(Self {
            width,
            height,
            cell_size,
            cells,
        })
    }

    /// Build a grid from rows of layout codes; all rows must have the same length
    pub fn from_rows(cell_size: f32, rows: &[Vec<u8>]) -> Result<Self, ConfigError> {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
        if let Some((y, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() as u32 != width)
        {
            return Err(ConfigError::InvalidGrid(format!(
                "row {} has {} cells, expected {}",
                y,
                row.len(),
                width
            )));
        }
        let codes: Vec<u8> = rows.iter().flatten().copied().collect();
        Self::from_codes(width, height, cell_size, &codes)
    }

    /// The built-in 30x25 map
    pub fn default_layout() -> Self {
        Self {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            cell_size: CELL_SIZE,
            cells: DEFAULT_LAYOUT
                .iter()
                .flatten()
                .map(|&code| CellKind::from_code(code).unwrap_or(CellKind::Wall))
                .collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell kind at grid coordinates, `OutOfBounds` outside the grid
    pub fn cell_at(&self, x: i32, y: i32) -> CellKind {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return CellKind::OutOfBounds;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    pub fn is_blocking_at(&self, x: i32, y: i32) -> bool {
        is_blocking(self.cell_at(x, y))
    }

    /// World rectangle covered by the grid
    pub fn world_bounds(&self) -> Aabb {
        Aabb::new(
            Vec2::ZERO,
            Vec2::new(
                self.width as f32 * self.cell_size,
                self.height as f32 * self.cell_size,
            ),
        )
    }

    /// Top-left corner of a cell; spawn points use this convention
    pub fn grid_to_world(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(x as f32 * self.cell_size, y as f32 * self.cell_size)
    }

    pub fn cell_center(&self, x: i32, y: i32) -> Vec2 {
        let half = self.cell_size * 0.5;
        self.grid_to_world(x, y) + Vec2::new(half, half)
    }

    pub fn cell_rect(&self, x: i32, y: i32) -> Aabb {
        let min = self.grid_to_world(x, y);
        Aabb::new(min, min + Vec2::new(self.cell_size, self.cell_size))
    }

    /// Inclusive range of cells an AABB touches: `(min_x, min_y, max_x, max_y)`
    pub fn cells_overlapping(&self, aabb: &Aabb) -> (i32, i32, i32, i32) {
        let cs = self.cell_size;
        let min_x = (aabb.min.x / cs).floor() as i32;
        let min_y = (aabb.min.y / cs).floor() as i32;
        // A box ending exactly on a cell edge does not touch the next cell
        let max_x = ((aabb.max.x / cs).ceil() as i32 - 1).max(min_x);
        let max_y = ((aabb.max.y / cs).ceil() as i32 - 1).max(min_y);
        (min_x, min_y, max_x, max_y)
    }

    /// Grid coordinates of every item spawn, row-major
    pub fn item_spawns(&self) -> Vec<(u32, u32)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, kind)| **kind == CellKind::ItemSpawn)
            .map(|(i, _)| (i as u32 % self.width, i as u32 / self.width))
            .collect()
    }

    pub fn contains_cell(&self, x: i32, y: i32) -> bool {
        self.cell_at(x, y) != CellKind::OutOfBounds
    }
}

/// Layout document: rows of cell codes plus the cell size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutFile {
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    pub rows: Vec<Vec<u8>>,
}

fn default_cell_size() -> f32 {
    CELL_SIZE
}

impl LayoutFile {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_grid(self) -> Result<TileGrid, ConfigError> {
        TileGrid::from_rows(self.cell_size, &self.rows)
    }
}

// 0 = open, 1 = floor, 2 = wall, 3 = item
#[rustfmt::skip]
const DEFAULT_LAYOUT: [[u8; MAP_WIDTH as usize]; MAP_HEIGHT as usize] = [
    [2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 2, 2, 2, 2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 2, 1, 1, 1, 1, 1, 2, 0, 0, 0, 0, 0, 0, 0, 2, 1, 1, 1, 1, 2, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 2, 1, 1, 3, 1, 1, 2, 0, 0, 0, 0, 0, 0, 0, 2, 1, 1, 1, 1, 2, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 2, 1, 1, 1, 1, 1, 2, 2, 2, 0, 0, 0, 0, 0, 2, 1, 1, 3, 1, 2, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 2, 1, 1, 1, 1, 1, 1, 1, 2, 0, 0, 0, 0, 0, 2, 2, 1, 2, 2, 2, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 2, 2, 2, 1, 2, 2, 2, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 2, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 1, 1, 1, 1, 1, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 1, 3, 1, 1, 3, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 2, 2, 2, 2, 2, 0, 0, 0, 0, 0, 2, 1, 1, 1, 1, 1, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 2, 1, 1, 1, 2, 0, 0, 0, 0, 0, 2, 1, 1, 1, 1, 1, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 2, 1, 3, 1, 2, 2, 2, 0, 0, 0, 2, 2, 2, 2, 1, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 2, 1, 1, 1, 1, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 2, 2, 2, 1, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
    [2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
];
