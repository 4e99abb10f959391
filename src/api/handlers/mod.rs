pub mod appointment;
pub mod availability;
pub mod health;
pub mod hold;
pub mod schedule;
pub mod tenant;
