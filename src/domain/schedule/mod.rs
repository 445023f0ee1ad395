//! Schedule domain module - half-hour slot arithmetic.

mod slots;

pub use slots::{next_slot, upcoming_slots, HORIZON_SLOTS};
