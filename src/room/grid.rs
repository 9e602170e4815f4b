use crate::room::rotation::Rotation;

pub const MIN_DIMENSION: u16 = 2;
pub const MAX_DIMENSION: u16 = 64;

/// Row delimiter of the persisted heightmap format. A `\n` directly after
/// the delimiter is tolerated and stripped.
pub const ROW_DELIMITER: char = '\r';

/// Wire-relative height sentinel for void tiles and blocked tiles that
/// cannot be stacked on.
pub const HEIGHT_SENTINEL: i16 = 32767;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Open,
    Blocked,
    Invalid,
    Sit,
    Lay,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub x: u16,
    pub y: u16,
    pub base_height: u8,
    pub state: TileState,
    pub stack_height: f32,
    pub allow_stack: bool,
}

impl Tile {
    fn void(x: u16, y: u16) -> Self {
        Tile {
            x,
            y,
            base_height: 0,
            state: TileState::Invalid,
            stack_height: 0.0,
            allow_stack: false,
        }
    }

    pub fn is_void(&self) -> bool {
        self.state == TileState::Invalid
    }

    /// Wire-relative stack height: floor(height * 256), or the sentinel
    /// for void tiles and blocked non-stackable tiles.
    pub fn relative_height(&self) -> i16 {
        if self.state == TileState::Invalid
            || (self.state == TileState::Blocked && !self.allow_stack)
        {
            return HEIGHT_SENTINEL;
        }
        (self.stack_height * 256.0).floor() as i16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Door {
    pub x: u16,
    pub y: u16,
    pub rotation: Rotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: u16,
    height: u16,
    tiles: Vec<Tile>,
    door: Door,
    door_z: f32,
}

/// Height encoded by a heightmap character, or None for void (`x`) and any
/// character outside the legacy alphabet. The parser treats unknown
/// characters as void; the authoring-time validation pass rejects them.
pub fn char_height(ch: char) -> Option<u8> {
    match ch {
        '0'..='9' => Some(ch as u8 - b'0'),
        'a'..='w' | 'y'..='z' => Some(ch as u8 - b'a' + 10),
        'A'..='W' | 'Y'..='Z' => Some(ch as u8 - b'A' + 10),
        _ => None,
    }
}

pub fn is_void_char(ch: char) -> bool {
    ch == 'x' || ch == 'X'
}

pub fn split_heightmap(heightmap: &str) -> Vec<&str> {
    heightmap
        .split(ROW_DELIMITER)
        .map(|row| row.strip_prefix('\n').unwrap_or(row))
        .filter(|row| !row.is_empty())
        .collect()
}

impl TileGrid {
    pub fn parse(heightmap: &str, door: Door) -> Self {
        let rows = split_heightmap(heightmap);
        Self::from_rows(&rows, door)
    }

    /// Builds the grid from pre-split rows. Width is fixed by the first
    /// row; every row stops populating at the first length mismatch and
    /// the remaining cells stay void. The legacy server behaved this way
    /// instead of rejecting the map, and persisted maps depend on it.
    pub fn from_rows(rows: &[&str], door: Door) -> Self {
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0) as u16;
        let height = rows.len() as u16;

        let mut tiles = Vec::with_capacity(usize::from(width) * usize::from(height));
        for y in 0..height {
            for x in 0..width {
                tiles.push(Tile::void(x, y));
            }
        }

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if x as u16 >= width {
                    break;
                }
                let Some(base_height) = char_height(ch) else {
                    continue;
                };
                let index = y * usize::from(width) + x;
                tiles[index] = Tile {
                    x: x as u16,
                    y: y as u16,
                    base_height,
                    state: TileState::Open,
                    stack_height: f32::from(base_height),
                    allow_stack: true,
                };
            }
        }

        let mut grid = TileGrid {
            width,
            height,
            tiles,
            door,
            door_z: 0.0,
        };
        grid.door_z = grid.compute_door_z();
        grid
    }

    /// Spawn-reference height: the tile one step ahead of the door in its
    /// facing direction when that tile exists and is non-void, otherwise
    /// the door tile's own height.
    fn compute_door_z(&self) -> f32 {
        if let Some(ahead) = self.neighbor(self.door.x, self.door.y, self.door.rotation) {
            if !ahead.is_void() {
                return f32::from(ahead.base_height);
            }
        }
        match self.tile(self.door.x, self.door.y) {
            Some(tile) if !tile.is_void() => f32::from(tile.base_height),
            _ => 0.0,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn door(&self) -> Door {
        self.door
    }

    pub fn door_z(&self) -> f32 {
        self.door_z
    }

    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    pub fn tile(&self, x: u16, y: u16) -> Option<&Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.tiles
            .get(usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    pub fn tile_mut(&mut self, x: u16, y: u16) -> Option<&mut Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let width = usize::from(self.width);
        self.tiles
            .get_mut(usize::from(y) * width + usize::from(x))
    }

    pub fn neighbor(&self, x: u16, y: u16, rotation: Rotation) -> Option<&Tile> {
        let (dx, dy) = rotation.delta();
        let nx = i32::from(x) + dx;
        let ny = i32::from(y) + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        self.tile(nx as u16, ny as u16)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn east_door(x: u16, y: u16) -> Door {
        Door {
            x,
            y,
            rotation: Rotation::East,
        }
    }

    #[test]
    fn parses_rows_and_heights() {
        let grid = TileGrid::from_rows(&["0000", "0220", "000x"], east_door(0, 0));
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.tile(1, 1).expect("tile").base_height, 2);
        assert_eq!(grid.tile(1, 1).expect("tile").state, TileState::Open);
        assert_eq!(grid.tile(3, 2).expect("tile").state, TileState::Invalid);
    }

    #[test]
    fn letters_map_to_extended_heights() {
        let grid = TileGrid::from_rows(&["a0", "0Z"], east_door(0, 0));
        assert_eq!(grid.tile(0, 0).expect("tile").base_height, 10);
        assert_eq!(grid.tile(1, 1).expect("tile").base_height, 35);
    }

    #[test]
    fn short_row_leaves_tail_void() {
        let grid = TileGrid::from_rows(&["0000", "00", "0000"], east_door(0, 0));
        assert_eq!(grid.tile(1, 1).expect("tile").state, TileState::Open);
        assert_eq!(grid.tile(2, 1).expect("tile").state, TileState::Invalid);
        assert_eq!(grid.tile(3, 1).expect("tile").state, TileState::Invalid);
    }

    #[test]
    fn long_row_cut_at_first_row_width() {
        let grid = TileGrid::from_rows(&["00", "000000"], east_door(0, 0));
        assert_eq!(grid.width(), 2);
        assert!(grid.tile(2, 1).is_none());
    }

    #[test]
    fn parse_splits_on_carriage_return() {
        let grid = TileGrid::parse("00\r\n11\r22", east_door(0, 0));
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.tile(0, 1).expect("tile").base_height, 1);
        assert_eq!(grid.tile(1, 2).expect("tile").base_height, 2);
    }

    #[test]
    fn out_of_bounds_lookup_is_none() {
        let grid = TileGrid::from_rows(&["00", "00"], east_door(0, 0));
        assert!(grid.tile(2, 0).is_none());
        assert!(grid.tile(0, 2).is_none());
    }

    #[test]
    fn door_z_uses_tile_ahead_when_walkable() {
        let grid = TileGrid::from_rows(&["03", "00"], east_door(0, 0));
        assert_eq!(grid.door_z(), 3.0);
    }

    #[test]
    fn door_z_falls_back_to_door_tile() {
        let grid = TileGrid::from_rows(&["2x", "00"], east_door(0, 0));
        assert_eq!(grid.door_z(), 2.0);

        let door = Door {
            x: 1,
            y: 0,
            rotation: Rotation::East,
        };
        let edge = TileGrid::from_rows(&["02", "00"], door);
        assert_eq!(edge.door_z(), 2.0);
    }

    #[test]
    fn relative_height_floors_and_uses_sentinel() {
        let mut grid = TileGrid::from_rows(&["00", "0x"], east_door(0, 0));
        assert_eq!(grid.tile(1, 1).expect("tile").relative_height(), HEIGHT_SENTINEL);

        let tile = grid.tile_mut(0, 0).expect("tile");
        tile.stack_height = 2.5;
        assert_eq!(tile.relative_height(), 640);

        tile.state = TileState::Blocked;
        tile.allow_stack = false;
        assert_eq!(tile.relative_height(), HEIGHT_SENTINEL);

        tile.allow_stack = true;
        assert_eq!(tile.relative_height(), 640);
    }
}
