//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `inventory.rs` — device directory seam, short-name rule, host map.
//! - `tailscale.rs` — credential selection + Tailscale API client.
//! - `policy.rs` — read/patch/write of the HuJSON policy file.
//! - `output.rs` — JSON/text output helpers and error codes.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod inventory;
pub mod output;
pub mod policy;
pub mod tailscale;
