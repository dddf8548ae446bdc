//! Stage reporting for chunk generation.
//!
//! The pipeline calls [`ProgressSink::stage`] as it enters each stage. A
//! loading screen can listen; the default is to ignore it.

/// Stage names reported by the chunk pipeline, in order.
pub mod stage {
    /// Climate sampling and height synthesis.
    pub const SURFACE: &str = "surface";
    /// Cave field preparation and carving.
    pub const CAVES: &str = "caves";
    /// Ocean flooding.
    pub const WATER: &str = "water";
    /// Chunk finished.
    pub const DONE: &str = "done";
}

/// Receives stage notifications. Shared across batch workers.
pub trait ProgressSink: Send + Sync {
    /// Called when a stage begins.
    fn stage(&self, name: &str);
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    #[inline]
    fn stage(&self, _name: &str) {}
}

/// Forwards notifications to `tracing` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn stage(&self, name: &str) {
        tracing::debug!("Terrain stage: {}", name);
    }
}
