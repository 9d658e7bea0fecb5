pub mod facility;
pub mod reservation;
pub mod slot;
pub mod user;
