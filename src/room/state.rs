use crate::room::furniture::FurnitureQuery;
use crate::room::grid::TileGrid;
use crate::room::pathfind;
use crate::room::rotation::Rotation;
use crate::room::tiles;
use crate::room::unit::UnitState;
use std::time::{Duration, Instant};

/// One unit's row in a status broadcast. Positions are the previous
/// position on purpose: clients animate from there toward the target
/// carried in the status string.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitStatusUpdate {
    pub unit_id: u32,
    pub prev_x: u16,
    pub prev_y: u16,
    pub prev_z: f32,
    pub head_rotation: Rotation,
    pub body_rotation: Rotation,
    pub statuses: String,
}

/// Produced interface toward the wire layer. One call per dirty tick.
pub trait Broadcast: Send {
    fn unit_statuses(&mut self, updates: &[UnitStatusUpdate]);
}

/// Sink for rooms nothing is listening to.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBroadcast;

impl Broadcast for NullBroadcast {
    fn unit_statuses(&mut self, _updates: &[UnitStatusUpdate]) {}
}

pub struct RoomState {
    pub id: u32,
    grid: TileGrid,
    furniture: Box<dyn FurnitureQuery>,
    broadcast: Box<dyn Broadcast>,
    units: Vec<UnitState>,
    next_unit_id: u32,
}

impl RoomState {
    pub fn new(
        id: u32,
        mut grid: TileGrid,
        furniture: Box<dyn FurnitureQuery>,
        broadcast: Box<dyn Broadcast>,
    ) -> Self {
        tiles::refresh_all(&mut grid, furniture.as_ref());
        RoomState {
            id,
            grid,
            furniture,
            broadcast,
            units: Vec::new(),
            next_unit_id: 0,
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn occupant_count(&self) -> usize {
        self.units.len()
    }

    pub fn unit(&self, id: u32) -> Option<&UnitState> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub fn unit_mut(&mut self, id: u32) -> Option<&mut UnitState> {
        self.units.iter_mut().find(|unit| unit.id == id)
    }

    /// Spawns a unit at the door, facing the door's direction. Ids are
    /// sequential and never reused while the room is active.
    pub fn add_occupant(&mut self, name: &str, motto: &str) -> u32 {
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        let door = self.grid.door();
        let unit = UnitState::new(
            id,
            name,
            motto,
            door.x,
            door.y,
            self.grid.door_z(),
            door.rotation,
        );
        self.units.push(unit);
        id
    }

    pub fn remove_occupant(&mut self, id: u32) -> bool {
        let Some(index) = self.units.iter().position(|unit| unit.id == id) else {
            return false;
        };
        self.units[index].clear();
        self.units.remove(index);
        true
    }

    /// Resolves a walk request. Any walk request ends AFK, motto restore
    /// and effect removal included, before the request itself is judged.
    pub fn request_walk(&mut self, id: u32, x: u16, y: u16) -> bool {
        let Some(index) = self.units.iter().position(|unit| unit.id == id) else {
            return false;
        };
        let unit = &mut self.units[index];
        unit.clear_afk();

        if unit.teleporting {
            let z = tiles::destination_height(&self.grid, self.furniture.as_ref(), x, y);
            unit.teleport_to(x, y, z);
            return true;
        }
        if !unit.can_walk {
            return false;
        }

        let path = pathfind::find_path(&self.grid, (unit.x, unit.y), (x, y), true);
        if path.is_empty() {
            return false;
        }
        unit.set_path(path, (x, y));
        true
    }

    pub fn stop_walking(&mut self, id: u32) -> bool {
        match self.unit_mut(id) {
            Some(unit) => {
                unit.stop_walking();
                true
            }
            None => false,
        }
    }

    pub fn look_at(&mut self, id: u32, x: u16, y: u16, now: Instant) -> bool {
        match self.unit_mut(id) {
            Some(unit) => unit.look_at(x, y, now),
            None => false,
        }
    }

    pub fn sit(&mut self, id: u32) -> bool {
        let Some(index) = self.units.iter().position(|unit| unit.id == id) else {
            return false;
        };
        let unit = &mut self.units[index];
        if unit.walking {
            return false;
        }
        let height = tiles::destination_height(&self.grid, self.furniture.as_ref(), unit.x, unit.y);
        unit.sit(height);
        true
    }

    pub fn set_afk(&mut self, id: u32, enabled: bool, now: Instant) -> bool {
        match self.unit_mut(id) {
            Some(unit) => unit.set_afk(enabled, now),
            None => false,
        }
    }

    pub fn set_dance(&mut self, id: u32, style: Option<u8>) -> bool {
        match self.unit_mut(id) {
            Some(unit) => unit.set_dance(style),
            None => false,
        }
    }

    pub fn apply_effect(&mut self, id: u32, effect: u32, duration: Option<Duration>) -> bool {
        match self.unit_mut(id) {
            Some(unit) => {
                unit.apply_effect(effect, duration);
                true
            }
            None => false,
        }
    }

    pub fn raise_sign(&mut self, id: u32, sign: u8) -> bool {
        match self.unit_mut(id) {
            Some(unit) => {
                unit.raise_sign(sign);
                true
            }
            None => false,
        }
    }

    /// Swaps the furniture backing and recomputes the whole grid, as
    /// after a bulk item load.
    pub fn replace_furniture(&mut self, furniture: Box<dyn FurnitureQuery>) {
        self.furniture = furniture;
        tiles::refresh_all(&mut self.grid, self.furniture.as_ref());
    }

    /// Full recompute after the furniture system changed out from under
    /// the room. Runs between ticks, invoked by the action handler.
    pub fn furniture_changed(&mut self) {
        tiles::refresh_all(&mut self.grid, self.furniture.as_ref());
    }

    /// Footprint recompute after a single item placement, move or
    /// removal.
    pub fn furniture_changed_at(&mut self, x: u16, y: u16, width: u16, length: u16, rotation: u8) {
        tiles::refresh_footprint(
            &mut self.grid,
            self.furniture.as_ref(),
            x,
            y,
            width,
            length,
            rotation,
        );
    }

    /// Rebuilds the grid after a layout edit. Units keep their positions;
    /// the caller is expected to have moved them onto valid tiles.
    pub fn rebuild_layout(&mut self, mut grid: TileGrid) {
        tiles::refresh_all(&mut grid, self.furniture.as_ref());
        self.grid = grid;
    }

    /// One scheduler tick: advance every unit in occupancy order, gather
    /// the dirty ones into a single batch, broadcast once, then sync
    /// previous positions in batch order.
    pub fn tick(&mut self, now: Instant) {
        let mut batch = Vec::new();
        for (index, unit) in self.units.iter_mut().enumerate() {
            let dirty = unit.process_tick(&self.grid, self.furniture.as_ref(), now);
            if dirty || unit.needs_update {
                unit.needs_update = false;
                batch.push(index);
            }
        }
        if batch.is_empty() {
            return;
        }

        let updates: Vec<UnitStatusUpdate> = batch
            .iter()
            .map(|&index| {
                let unit = &self.units[index];
                UnitStatusUpdate {
                    unit_id: unit.id,
                    prev_x: unit.prev_x,
                    prev_y: unit.prev_y,
                    prev_z: unit.prev_z,
                    head_rotation: unit.head_rotation,
                    body_rotation: unit.body_rotation,
                    statuses: unit.statuses.serialize(),
                }
            })
            .collect();
        self.broadcast.unit_statuses(&updates);

        for &index in &batch {
            self.units[index].sync_previous_position();
        }
    }
}
