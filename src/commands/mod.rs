//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `sync.rs` — credentials, device fetch, policy patch, report.
//!
//! ## Principles
//! - Delegate business logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod sync;

pub use sync::handle_sync;
