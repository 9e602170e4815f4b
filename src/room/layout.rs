use crate::room::grid::{self, Door, TileGrid, MAX_DIMENSION, MIN_DIMENSION};
use crate::room::rotation::Rotation;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

/// Persisted room layout: the raw heightmap in its wire form (rows
/// joined by `\r`) plus the door descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomLayout {
    pub name: String,
    pub heightmap: String,
    pub door: DoorSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorSpec {
    pub x: u16,
    pub y: u16,
    pub direction: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutValidationError {
    SizeOutOfBounds { width: usize, height: usize },
    InvalidCharacter { row: usize, column: usize, ch: char },
    NoWalkableTile,
    DoorNotWalkable { x: u16, y: u16 },
}

impl fmt::Display for LayoutValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutValidationError::SizeOutOfBounds { width, height } => write!(
                f,
                "heightmap is {}x{}, dimensions must be {}..{} per side",
                width, height, MIN_DIMENSION, MAX_DIMENSION
            ),
            LayoutValidationError::InvalidCharacter { row, column, ch } => write!(
                f,
                "invalid character '{}' at row {} column {}",
                ch, row, column
            ),
            LayoutValidationError::NoWalkableTile => {
                write!(f, "heightmap contains no walkable tile")
            }
            LayoutValidationError::DoorNotWalkable { x, y } => {
                write!(f, "door at ({},{}) is not on a walkable tile", x, y)
            }
        }
    }
}

impl std::error::Error for LayoutValidationError {}

impl RoomLayout {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read layout {}: {}", path.display(), err))?;
        serde_yaml::from_str(&content)
            .map_err(|err| format!("failed to parse layout {}: {}", path.display(), err))
    }

    pub fn door(&self) -> Door {
        Door {
            x: self.door.x,
            y: self.door.y,
            rotation: Rotation::from_value(self.door.direction),
        }
    }

    pub fn build_grid(&self) -> TileGrid {
        TileGrid::parse(&self.heightmap, self.door())
    }

    /// Authoring-time validation with a specific reason. Never mutates
    /// anything; an invalid edit leaves the existing layout untouched.
    pub fn validate(&self) -> Result<(), LayoutValidationError> {
        let rows = grid::split_heightmap(&self.heightmap);
        let height = rows.len();
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        if width < usize::from(MIN_DIMENSION)
            || width > usize::from(MAX_DIMENSION)
            || height < usize::from(MIN_DIMENSION)
            || height > usize::from(MAX_DIMENSION)
        {
            return Err(LayoutValidationError::SizeOutOfBounds { width, height });
        }

        for (row_index, row) in rows.iter().enumerate() {
            for (column_index, ch) in row.chars().enumerate() {
                if !grid::is_void_char(ch) && grid::char_height(ch).is_none() {
                    return Err(LayoutValidationError::InvalidCharacter {
                        row: row_index + 1,
                        column: column_index + 1,
                        ch,
                    });
                }
            }
        }

        let parsed = self.build_grid();
        if !parsed.tiles().any(|tile| !tile.is_void()) {
            return Err(LayoutValidationError::NoWalkableTile);
        }
        match parsed.tile(self.door.x, self.door.y) {
            Some(tile) if !tile.is_void() => Ok(()),
            _ => Err(LayoutValidationError::DoorNotWalkable {
                x: self.door.x,
                y: self.door.y,
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64) / (total as f64)
        }
    }
}

/// Parsed-grid cache keyed by layout name. Rooms sharing a layout model
/// reuse one parsed grid instead of re-reading the heightmap.
pub struct LayoutCache {
    cache: LruCache<String, Arc<TileGrid>>,
    stats: CacheStats,
}

impl LayoutCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least one");
        LayoutCache {
            cache: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn get_or_parse(&mut self, layout: &RoomLayout) -> Arc<TileGrid> {
        if let Some(grid) = self.cache.get(&layout.name) {
            self.stats.hits += 1;
            return Arc::clone(grid);
        }
        self.stats.misses += 1;
        let grid = Arc::new(layout.build_grid());
        if self.cache.put(layout.name.clone(), Arc::clone(&grid)).is_some() {
            self.stats.evictions += 1;
        }
        grid
    }

    /// Drops a cached grid after a layout edit so the next lookup
    /// re-parses.
    pub fn invalidate(&mut self, name: &str) -> bool {
        self.cache.pop(name).is_some()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
