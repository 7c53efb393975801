// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Middleware: none beyond the global trace/CORS layers

pub mod auth;

pub use auth::*;
