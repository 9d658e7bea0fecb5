pub mod auth;
pub mod facility;
pub mod health;
pub mod reservation;
pub mod slot;
pub mod user;
pub mod v1;
