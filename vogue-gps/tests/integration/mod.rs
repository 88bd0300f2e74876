//! Integration tests for vogue-gps against the in-memory mock device
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration -- --nocapture
//! RUST_LOG=vogue_gps=trace cargo test --test integration schedule
//! ```

mod fixes;
mod harness;
mod schedule;
