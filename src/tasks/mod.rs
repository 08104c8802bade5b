//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of the
//! process.
//!
//! # Tasks
//! - Cache sweep: removes stale cache entries at a fixed interval
//! - Statistics roll: closes the statistics window and folds it into the peak

mod roll;
mod sweep;

pub use roll::spawn_roll_task;
pub use sweep::spawn_sweep_task;
