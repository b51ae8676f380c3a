//! Background tasks spawned by the server.
//!
//! - [`engagement_worker`] - Drains the queued engagement channel
//! - [`ranking_scheduler`] - Periodic ranking sweeps

pub mod engagement_worker;
pub mod ranking_scheduler;

pub use engagement_worker::run_engagement_worker;
pub use ranking_scheduler::{run_ranking_scheduler, run_sweep};
