//! HTTP adapters - the inbound read/trigger surface.

pub mod games;
