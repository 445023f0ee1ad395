//! Socket sink adapters.

mod push_publisher;

pub use push_publisher::{SocketPublisher, SocketPublisherConfig};
