pub mod combine;
pub mod health;
