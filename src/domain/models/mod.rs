pub mod appointment;
pub mod interval;
pub mod schedule;
pub mod tenant;
