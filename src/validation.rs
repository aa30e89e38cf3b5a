use crate::error::ApiError;

pub fn check_required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn check_email(field: &str, value: &str) -> Result<(), ApiError> {
    check_required(field, value)?;
    if value.len() > 254 || !value.contains('@') {
        return Err(ApiError::Validation(format!(
            "{field} must be a valid email address"
        )));
    }
    Ok(())
}

pub fn check_terms_agreed(agreed: bool) -> Result<(), ApiError> {
    if !agreed {
        return Err(ApiError::Validation(
            "terms must be agreed to before submitting".into(),
        ));
    }
    Ok(())
}
