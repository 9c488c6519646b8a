use super::ApiError;

pub fn validate_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Checkbox-style form flag.
pub fn parse_flag(value: &str) -> Result<bool, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "" | "0" | "false" | "off" | "no" => Ok(false),
        other => Err(ApiError::validation(format!("Invalid flag value: {other}"))),
    }
}
