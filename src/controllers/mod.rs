pub mod slot_controller;
pub mod vehicle_controller;
