pub mod user;

pub use user::Usuario;
