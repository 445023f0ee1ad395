//! Application layer - orchestration of the scheduler and draw engine.
//!
//! - `HorizonMaintainer` keeps the rolling window of future games full
//! - `LifecyclePromoter` promotes due games on half-hour boundaries
//! - `DrawEngine` runs one timed draw loop per running game
//! - `RetentionTrimmer` bounds table growth

mod draw_engine;
mod horizon;
mod promoter;
mod retention;

pub use draw_engine::{DrawEngine, DrawEngineConfig, DrawOutcome};
pub use horizon::{HorizonMaintainer, HorizonReport};
pub use promoter::LifecyclePromoter;
pub use retention::{RetentionTrimmer, DEFAULT_RETENTION_CAP};
