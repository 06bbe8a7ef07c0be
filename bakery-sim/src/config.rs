//! The configuration for the simulation, given from environment variables and lazy 
//! initialized when needed.

use std::path::{Path, PathBuf};
use std::env;

use once_cell::race::OnceBool;
use once_cell::sync::OnceCell;

use tracing::warn;


/// Return true if ticks should run as fast as possible instead of 20 per second.
/// 
/// To enable this feature, set `BAKERY_FAST=1`.
pub fn fast() -> bool {
    static ENV: OnceBool = OnceBool::new();
    ENV.get_or_init(|| {
        env::var_os("BAKERY_FAST")
            .map(|s| s.as_encoded_bytes() == b"1")
            .unwrap_or(false)
    })
}

/// Return the number of ticks to run before saving and exiting, 400 by default.
/// 
/// Set with `BAKERY_MAX_TICKS=<ticks>`.
pub fn max_ticks() -> u64 {
    static ENV: OnceCell<u64> = OnceCell::new();
    *ENV.get_or_init(|| {
        let Some(raw) = env::var_os("BAKERY_MAX_TICKS") else { return 400 };
        match raw.to_str().and_then(|s| s.parse().ok()) {
            Some(ticks) => ticks,
            None => {
                warn!("invalid BAKERY_MAX_TICKS {raw:?}, using 400");
                400
            }
        }
    })
}

/// Return the path of the file where block entities are loaded from and saved to,
/// `crafting_bowls.dat` by default.
/// 
/// Set with `BAKERY_SAVE_PATH=<path>`.
pub fn save_path() -> &'static Path {
    static ENV: OnceCell<PathBuf> = OnceCell::new();
    ENV.get_or_init(|| {
        env::var_os("BAKERY_SAVE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("crafting_bowls.dat"))
    })
}
