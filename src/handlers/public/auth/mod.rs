// handlers/public/auth/mod.rs - Token acquisition (no authentication required)

pub mod login; // POST /login - authenticate and get JWT

pub use login::login_post;
