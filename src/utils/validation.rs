//! Utilidades de validación
//!
//! Funciones helper para validar números de plaza y matrículas,
//! usables tanto desde `#[validate(custom = ...)]` como desde los servicios.

use validator::ValidationError;

/// Número máximo de plaza admitido por el estacionamiento
pub const MAX_SLOT_NUMBER: i32 = 20;

/// Número mínimo de plaza
pub const MIN_SLOT_NUMBER: i32 = 1;

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar longitud mínima y máxima
pub fn validate_length(value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        let mut error = ValidationError::new("length");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &len);
        return Err(error);
    }
    Ok(())
}

/// Validar formato de matrícula: letras, dígitos, guiones y espacios
pub fn validate_vehicle_number(value: &str) -> Result<(), ValidationError> {
    validate_not_empty(value)?;
    validate_length(value.trim(), 1, 20)?;

    let valid_chars = value
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ' ');
    if !valid_chars {
        let mut error = ValidationError::new("vehicle_number");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"letters, digits, '-' or ' '".to_string());
        return Err(error);
    }
    Ok(())
}

/// Normalizar la matrícula para comparaciones de unicidad
pub fn normalize_vehicle_number(value: &str) -> String {
    value.trim().to_uppercase()
}
