//! Tile map with obstructions and line of sight
//!
//! The behaviour core only needs the [`LineOfSight`] predicate; `TileMap` is
//! the grid implementation used by the launcher and the tests.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SkirmishError};
use crate::core::types::TilePosition;

/// File looked up inside a map directory
pub const MAP_FILE_NAME: &str = "map.txt";

/// Geometry collaborator: can `from` see `to`?
pub trait LineOfSight {
    fn has_line_of_sight(&self, from: TilePosition, to: TilePosition) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Open,
    Obstacle,
}

impl Tile {
    pub fn blocks_los(&self) -> bool {
        matches!(self, Tile::Obstacle)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileMap {
    pub width: u32,
    pub height: u32,
    tiles: Vec<Tile>,
}

impl TileMap {
    /// Create a map with open terrain
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Open; (width * height) as usize],
        }
    }

    /// Parse a text grid: `.` open, `#` obstacle, one row per line
    pub fn from_text(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();

        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(SkirmishError::Map("map has no tiles".into()));
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(SkirmishError::Map(format!(
                    "row {} has {} tiles, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }
            for (x, c) in row.chars().enumerate() {
                let tile = match c {
                    '.' => Tile::Open,
                    '#' => Tile::Obstacle,
                    other => {
                        return Err(SkirmishError::Map(format!(
                            "unknown tile {:?} at {},{}",
                            other, x, y
                        )))
                    }
                };
                tiles.push(tile);
            }
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
            tiles,
        })
    }

    /// Load `map.txt` from a map directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(MAP_FILE_NAME);
        let text = fs::read_to_string(&path)
            .map_err(|e| SkirmishError::Map(format!("Failed to read map {:?}: {}", path, e)))?;
        Self::from_text(&text)
    }

    pub fn in_bounds(&self, position: TilePosition) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    pub fn tile(&self, position: TilePosition) -> Option<Tile> {
        if !self.in_bounds(position) {
            return None;
        }
        let index = position.y as usize * self.width as usize + position.x as usize;
        self.tiles.get(index).copied()
    }

    pub fn set_tile(&mut self, position: TilePosition, tile: Tile) {
        if self.in_bounds(position) {
            let index = position.y as usize * self.width as usize + position.x as usize;
            self.tiles[index] = tile;
        }
    }
}

impl LineOfSight for TileMap {
    fn has_line_of_sight(&self, from: TilePosition, to: TilePosition) -> bool {
        let line = from.line_to(&to);

        // Check all tiles except start and end
        for position in line.iter().skip(1).take(line.len().saturating_sub(2)) {
            match self.tile(*position) {
                Some(tile) if tile.blocks_los() => return false,
                None => return false,
                _ => {}
            }
        }

        true
    }
}
