//! Shared data model layer (structs/constants only).
//!
//! ## Files
//! - `models.rs` — devices, host map, report/output structs.
//! - `constants.rs` — API defaults and policy-file constants.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! Changes in these structs can affect `--json` outputs.
//! Keep schema-impacting changes synchronized with `docs/contracts/*`.

pub mod constants;
pub mod models;
