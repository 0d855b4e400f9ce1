use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod notify;
pub mod sim;
pub mod stats;
pub mod status;

pub use config::EngineConfig;
pub use engine::{PersistedEffect, StatusEngine};
pub use entity::{EntityArena, EntityId, EntitySpec, SpatialQuery};
pub use error::{EngineError, EngineResult};
pub use notify::{NullObserver, Recorder, StatusObserver, TickOutcome};
pub use stats::{DerivedStats, StatId};
pub use status::{
    Applied, ClearReason, EffectDatabase, EffectKind, EndCause, Rejected, StartFlags,
    StartOutcome, StartRequest, TimerQueue, TimerService,
};

use std::sync::Once;
static INIT: Once = Once::new();
static mut GUARD: Option<tracing_appender::non_blocking::WorkerGuard> = None;
pub fn setup_logger() {
    INIT.call_once(|| {
        let file_appender = RollingFileAppender::new(Rotation::HOURLY, "logs", "status.log");

        let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .with_writer(non_blocking)
            .pretty()
            .init();

        unsafe {
            GUARD = Some(_guard);
        }
    });
}
