//! Bingo Caller - timed bingo session scheduler and number-draw engine.
//!
//! Keeps a rolling window of future half-hour games scheduled, promotes
//! each game to running at its exact start time, draws unique numbers on
//! a fixed interval until the 1..=75 pool is exhausted, and announces
//! every draw on an external event channel.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
