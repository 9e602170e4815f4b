mod config;
pub mod room;
pub mod telemetry;

pub use room::furniture::{FurnitureItem, FurnitureQuery, NoFurniture, RoomFurniture};
pub use room::grid::{Door, Tile, TileGrid, TileState};
pub use room::layout::{DoorSpec, LayoutCache, LayoutValidationError, RoomLayout};
pub use room::pathfind::{find_path, PathStep};
pub use room::rotation::Rotation;
pub use room::scheduler::{RoomScheduler, RoomService, TICK_MILLIS};
pub use room::state::{Broadcast, NullBroadcast, RoomState, UnitStatusUpdate};
pub use room::unit::{StatusMap, UnitState};

use std::path::Path;

pub fn run(args: &[String]) -> Result<(), String> {
    let config = config::AppConfig::from_args(args)?;
    telemetry::logging::init(&config.root)?;

    let layouts_dir = config.root.join("layouts");
    let report = scan_layouts(&layouts_dir)?;
    telemetry::logging::log_room(&format!(
        "layout scan: files={}, valid={}, errors={}",
        report.files,
        report.valid,
        report.errors.len()
    ));

    println!("holo: layout scan");
    println!("- root: {}", config.root.display());
    println!("- layout files: {}", report.files);
    println!("- valid layouts: {}", report.valid);
    println!("- tick interval: {}ms", config.tick_millis);
    if !report.errors.is_empty() {
        for err in &report.errors {
            eprintln!("holo: layout validate {}", err);
        }
        return Err(format!("{} invalid layout(s)", report.errors.len()));
    }
    Ok(())
}

struct LayoutScanReport {
    files: usize,
    valid: usize,
    errors: Vec<String>,
}

fn scan_layouts(dir: &Path) -> Result<LayoutScanReport, String> {
    let entries = std::fs::read_dir(dir)
        .map_err(|err| format!("failed to read layouts dir {}: {}", dir.display(), err))?;

    let mut report = LayoutScanReport {
        files: 0,
        valid: 0,
        errors: Vec::new(),
    };
    let mut cache = LayoutCache::new(64);
    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read layouts dir entry: {}", err))?;
        let path = entry.path();
        let extension = path.extension().and_then(|ext| ext.to_str());
        if extension != Some("yaml") && extension != Some("yml") {
            continue;
        }
        report.files += 1;

        let layout = match RoomLayout::load(&path) {
            Ok(layout) => layout,
            Err(err) => {
                report.errors.push(err);
                continue;
            }
        };
        match layout.validate() {
            Ok(()) => {
                let grid = cache.get_or_parse(&layout);
                telemetry::logging::log_room(&format!(
                    "layout {}: {}x{}, door ({},{})",
                    layout.name,
                    grid.width(),
                    grid.height(),
                    grid.door().x,
                    grid.door().y
                ));
                report.valid += 1;
            }
            Err(err) => {
                report
                    .errors
                    .push(format!("{}: {}", path.display(), err));
            }
        }
    }
    Ok(report)
}
