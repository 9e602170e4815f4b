use crate::room::furniture::FurnitureQuery;
use crate::room::grid::{TileGrid, TileState};

/// Recomputes every tile's runtime state from the furniture overlay. Used
/// after bulk item loads and layout rebuilds.
pub fn refresh_all(grid: &mut TileGrid, furniture: &dyn FurnitureQuery) {
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            refresh_tile(grid, furniture, x, y);
        }
    }
}

/// Recomputes the footprint of a single placed, moved or removed item.
/// Rotations 2 and 6 turn the item a quarter onto its side, so width and
/// length swap.
pub fn refresh_footprint(
    grid: &mut TileGrid,
    furniture: &dyn FurnitureQuery,
    x: u16,
    y: u16,
    width: u16,
    length: u16,
    rotation: u8,
) {
    let (width, length) = if rotation == 2 || rotation == 6 {
        (length, width)
    } else {
        (width, length)
    };
    for dy in 0..length {
        for dx in 0..width {
            refresh_tile(grid, furniture, x.saturating_add(dx), y.saturating_add(dy));
        }
    }
}

fn refresh_tile(grid: &mut TileGrid, furniture: &dyn FurnitureQuery, x: u16, y: u16) {
    let Some(tile) = grid.tile(x, y) else {
        return;
    };
    // Void tiles never change, whatever sits on them.
    if tile.state == TileState::Invalid {
        return;
    }
    let base_height = tile.base_height;

    let items = furniture.items_at(x, y);
    let Some(tile) = grid.tile_mut(x, y) else {
        return;
    };

    if items.is_empty() {
        tile.state = TileState::Open;
        tile.stack_height = f32::from(base_height);
        tile.allow_stack = true;
        return;
    }

    // A layable item owns the whole tile regardless of what is stacked
    // with it, and avatars lie at the item's placement height.
    if let Some(layable) = items.iter().find(|item| item.layable) {
        tile.state = TileState::Lay;
        tile.stack_height = layable.height;
        tile.allow_stack = layable.stackable;
        return;
    }

    // Items arrive ordered by top height descending.
    let top = items[0];
    tile.state = if top.walkable {
        TileState::Open
    } else if top.sittable {
        TileState::Sit
    } else {
        TileState::Blocked
    };
    tile.stack_height = top.top_height;
    tile.allow_stack = top.stackable;
}

/// Height an avatar ends up at on the tile. Seats and beds place the
/// avatar at the item's raw height rather than on top of it.
pub fn destination_height(
    grid: &TileGrid,
    furniture: &dyn FurnitureQuery,
    x: u16,
    y: u16,
) -> f32 {
    let Some(tile) = grid.tile(x, y) else {
        return 0.0;
    };
    match tile.state {
        TileState::Sit | TileState::Lay => furniture
            .items_at(x, y)
            .first()
            .map(|item| item.height)
            .unwrap_or(tile.stack_height),
        _ => tile.stack_height,
    }
}
