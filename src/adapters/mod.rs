//! Adapters - implementations of ports against real infrastructure.

pub mod http;
pub mod memory;
pub mod postgres;
pub mod socket;

pub use memory::{InMemoryGameStore, RecordingPublisher};
pub use postgres::PostgresGameStore;
pub use socket::{SocketPublisher, SocketPublisherConfig};
