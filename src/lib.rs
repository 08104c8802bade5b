//! Wiki Mediator - a caching mediator service for wiki queries
//!
//! Serves line-delimited JSON requests over TCP, answering from bounded
//! time-expiring caches and falling back to a wiki backend on misses.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod mediator;
pub mod models;
pub mod server;
pub mod stats;
pub mod tasks;

pub use config::Config;
pub use error::{Result, WikiError};
pub use mediator::WikiMediator;
pub use server::ConnectionDispatcher;
pub use tasks::{spawn_roll_task, spawn_sweep_task};
