// handlers/mod.rs - Handlers grouped by security tier
//
// Public (no auth) → Protected (JWT auth + resolved tenant database)
pub mod public;
pub mod protected;

pub use public::*;
pub use protected::*;
