use crate::room::state::RoomState;
use crate::telemetry::logging;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

/// Fixed tick period of the room simulation.
pub const TICK_MILLIS: u64 = 500;

#[derive(Debug)]
pub struct RoomControl {
    running: AtomicBool,
}

impl Default for RoomControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomControl {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// A panic during a tick poisons the room mutex; the next tick keeps
/// going with the inner state rather than silencing the room for good.
fn lock_room(room: &Arc<Mutex<RoomState>>) -> MutexGuard<'_, RoomState> {
    match room.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn spawn_room_tick_loop(
    room_id: u32,
    room: Arc<Mutex<RoomState>>,
    control: Arc<RoomControl>,
    tick_millis: u64,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let period = Duration::from_millis(tick_millis.max(1));
        while control.is_running() {
            let started = Instant::now();
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                let mut room = lock_room(&room);
                room.tick(started);
            }));
            if outcome.is_err() {
                logging::log_error(&format!("room {}: tick panicked", room_id));
            }
            let elapsed = started.elapsed();
            match period.checked_sub(elapsed) {
                Some(remaining) => thread::sleep(remaining),
                None => logging::log_lag(&format!(
                    "room {}: tick took {}ms",
                    room_id,
                    elapsed.as_millis()
                )),
            }
        }
    })
}

/// Tick driver for one active room. The tick body runs to completion
/// before the loop sleeps out the rest of the period, so two ticks of
/// the same room never overlap.
#[derive(Debug)]
pub struct RoomScheduler {
    control: Arc<RoomControl>,
    handle: Option<thread::JoinHandle<()>>,
}

impl RoomScheduler {
    pub fn start(room_id: u32, room: Arc<Mutex<RoomState>>, tick_millis: u64) -> Self {
        let control = Arc::new(RoomControl::new());
        let handle = spawn_room_tick_loop(room_id, room, Arc::clone(&control), tick_millis);
        RoomScheduler {
            control,
            handle: Some(handle),
        }
    }

    /// Stops the loop and joins the thread. An in-flight tick completes
    /// before this returns.
    pub fn stop(&mut self) {
        self.control.request_stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                logging::log_error("room tick thread panicked outside a tick");
            }
        }
    }
}

impl Drop for RoomScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

struct RoomHandle {
    state: Arc<Mutex<RoomState>>,
    scheduler: Option<RoomScheduler>,
}

/// Routes occupancy events to per-room schedulers: the first occupant
/// starts a room's ticking, the last one leaving stops it. Rooms share
/// no state, so this map is the only cross-room synchronization point.
pub struct RoomService {
    rooms: HashMap<u32, RoomHandle>,
    tick_millis: u64,
}

impl Default for RoomService {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomService {
    pub fn new() -> Self {
        Self::with_tick_millis(TICK_MILLIS)
    }

    pub fn with_tick_millis(tick_millis: u64) -> Self {
        RoomService {
            rooms: HashMap::new(),
            tick_millis,
        }
    }

    pub fn insert_room(&mut self, room: RoomState) {
        let id = room.id;
        self.rooms.insert(
            id,
            RoomHandle {
                state: Arc::new(Mutex::new(room)),
                scheduler: None,
            },
        );
    }

    pub fn remove_room(&mut self, room_id: u32) -> bool {
        match self.rooms.remove(&room_id) {
            Some(mut handle) => {
                if let Some(scheduler) = handle.scheduler.as_mut() {
                    scheduler.stop();
                }
                true
            }
            None => false,
        }
    }

    pub fn room(&self, room_id: u32) -> Option<&Arc<Mutex<RoomState>>> {
        self.rooms.get(&room_id).map(|handle| &handle.state)
    }

    pub fn is_active(&self, room_id: u32) -> bool {
        self.rooms
            .get(&room_id)
            .is_some_and(|handle| handle.scheduler.is_some())
    }

    pub fn enter(&mut self, room_id: u32, name: &str, motto: &str) -> Option<u32> {
        let handle = self.rooms.get_mut(&room_id)?;
        let unit_id = lock_room(&handle.state).add_occupant(name, motto);
        if handle.scheduler.is_none() {
            handle.scheduler = Some(RoomScheduler::start(
                room_id,
                Arc::clone(&handle.state),
                self.tick_millis,
            ));
        }
        Some(unit_id)
    }

    pub fn leave(&mut self, room_id: u32, unit_id: u32) -> bool {
        let Some(handle) = self.rooms.get_mut(&room_id) else {
            return false;
        };
        let remaining = {
            let mut room = lock_room(&handle.state);
            if !room.remove_occupant(unit_id) {
                return false;
            }
            room.occupant_count()
        };
        if remaining == 0 {
            if let Some(mut scheduler) = handle.scheduler.take() {
                scheduler.stop();
            }
        }
        true
    }
}
