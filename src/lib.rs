//! Parking Management
//!
//! Servicio de gestión de un estacionamiento pequeño: alta de plazas,
//! registro de vehículos con cola de espera y cálculo de tarifas.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
