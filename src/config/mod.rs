//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, variables de entorno
//! y parámetros del estacionamiento.

pub mod database;
pub mod environment;
pub mod parking;

pub use environment::*;
pub use parking::ParkingConfig;
