use crate::room::scheduler::TICK_MILLIS;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct AppConfig {
    pub root: PathBuf,
    pub tick_millis: u64,
}

impl AppConfig {
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        if args.len() < 2 {
            return Err("usage: holo <asset-root> [tick_millis]".to_string());
        }

        let root = Path::new(&args[1]).to_path_buf();
        let tick_millis = if args.len() > 2 {
            parse_tick_millis(&args[2])?
        } else {
            match std::env::var("HOLO_TICK_MILLIS") {
                Ok(value) if !value.trim().is_empty() => parse_tick_millis(&value)?,
                _ => TICK_MILLIS,
            }
        };
        Ok(Self { root, tick_millis })
    }
}

fn parse_tick_millis(value: &str) -> Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(format!("invalid tick interval '{}'", value)),
    }
}
