use std::cmp::Ordering;
use std::collections::HashMap;

/// One furniture item as reported for a single tile. `height` is the raw
/// placement height of the item; `top_height` includes the item's own
/// thickness and is what an avatar standing on it stands at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FurnitureItem {
    pub height: f32,
    pub top_height: f32,
    pub walkable: bool,
    pub sittable: bool,
    pub layable: bool,
    pub stackable: bool,
}

impl FurnitureItem {
    pub fn solid(height: f32, top_height: f32) -> Self {
        FurnitureItem {
            height,
            top_height,
            walkable: false,
            sittable: false,
            layable: false,
            stackable: false,
        }
    }

    pub fn walkable(height: f32, top_height: f32) -> Self {
        FurnitureItem {
            walkable: true,
            stackable: true,
            ..Self::solid(height, top_height)
        }
    }

    pub fn seat(height: f32, top_height: f32) -> Self {
        FurnitureItem {
            sittable: true,
            ..Self::solid(height, top_height)
        }
    }

    pub fn bed(height: f32, top_height: f32) -> Self {
        FurnitureItem {
            layable: true,
            ..Self::solid(height, top_height)
        }
    }
}

/// Furniture lookup consumed by the tile state engine and by destination
/// height resolution. Implementations report items ordered by top height
/// descending.
pub trait FurnitureQuery: Send {
    fn items_at(&self, x: u16, y: u16) -> Vec<FurnitureItem>;
}

/// Query for a room with no furniture overlay.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFurniture;

impl FurnitureQuery for NoFurniture {
    fn items_at(&self, _x: u16, _y: u16) -> Vec<FurnitureItem> {
        Vec::new()
    }
}

/// In-memory furniture index keyed by tile. Backs rooms without a live
/// item system, the layout scan, and tests.
#[derive(Debug, Default, Clone)]
pub struct RoomFurniture {
    items: HashMap<(u16, u16), Vec<FurnitureItem>>,
}

impl RoomFurniture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, x: u16, y: u16, item: FurnitureItem) {
        self.items.entry((x, y)).or_default().push(item);
    }

    pub fn remove_at(&mut self, x: u16, y: u16) {
        self.items.remove(&(x, y));
    }
}

impl FurnitureQuery for RoomFurniture {
    fn items_at(&self, x: u16, y: u16) -> Vec<FurnitureItem> {
        let mut items = self
            .items
            .get(&(x, y))
            .cloned()
            .unwrap_or_default();
        items.sort_by(|a, b| {
            b.top_height
                .partial_cmp(&a.top_height)
                .unwrap_or(Ordering::Equal)
        });
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_ordered_by_top_height_descending() {
        let mut furniture = RoomFurniture::new();
        furniture.place(3, 4, FurnitureItem::walkable(0.0, 0.5));
        furniture.place(3, 4, FurnitureItem::solid(0.5, 2.0));
        furniture.place(3, 4, FurnitureItem::seat(0.0, 1.0));

        let items = furniture.items_at(3, 4);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].top_height, 2.0);
        assert_eq!(items[1].top_height, 1.0);
        assert_eq!(items[2].top_height, 0.5);
    }

    #[test]
    fn empty_tile_reports_no_items() {
        let furniture = RoomFurniture::new();
        assert!(furniture.items_at(0, 0).is_empty());
        assert!(NoFurniture.items_at(0, 0).is_empty());
    }
}
