//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Cada variable tiene un
//! valor por defecto; un valor presente pero inválido es un error de arranque.

use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use super::parking::ParkingConfig;
use crate::services::fee_calculator::DEFAULT_RATE_PER_HOUR;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub parking: ParkingConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            parking: ParkingConfig::default(),
        }
    }
}

impl EnvironmentConfig {
    /// Cargar desde las variables de entorno del proceso
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Cargar usando una función de búsqueda arbitraria (útil en tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let rate_per_hour: i64 = parse_or(&lookup, "PARKING_RATE_PER_HOUR", DEFAULT_RATE_PER_HOUR)?;
        if rate_per_hour <= 0 {
            return Err(anyhow!("PARKING_RATE_PER_HOUR must be positive, got {}", rate_per_hour));
        }
        let offset_minutes: i32 = parse_or(&lookup, "DISPLAY_UTC_OFFSET_MINUTES", 0)?;
        let parking = ParkingConfig::with_offset_minutes(rate_per_hour, offset_minutes)
            .ok_or_else(|| anyhow!("DISPLAY_UTC_OFFSET_MINUTES out of range: {}", offset_minutes))?;

        Ok(Self {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            host: lookup("HOST").unwrap_or(defaults.host),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            parking,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got '{}'", key, raw)),
        None => Ok(default),
    }
}
