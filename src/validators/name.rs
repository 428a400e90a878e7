use super::ValidationError;

pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::NameEmpty);
    }

    let len = trimmed.chars().count();
    if len < 2 {
        return Err(ValidationError::NameTooShort);
    }

    if len > 100 {
        return Err(ValidationError::NameTooLong);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_display_name("Jo").is_ok());
        assert!(validate_display_name("Julia Child").is_ok());
        assert!(validate_display_name("José García").is_ok());
        assert!(validate_display_name("名前").is_ok());
    }

    #[test]
    fn test_name_empty() {
        assert_eq!(validate_display_name("").unwrap_err(), ValidationError::NameEmpty);
        assert_eq!(validate_display_name("   ").unwrap_err(), ValidationError::NameEmpty);
    }

    #[test]
    fn test_name_too_short() {
        assert_eq!(validate_display_name("J").unwrap_err(), ValidationError::NameTooShort);
        assert_eq!(validate_display_name(" J ").unwrap_err(), ValidationError::NameTooShort);
    }

    #[test]
    fn test_name_too_long() {
        let long_name = "a".repeat(101);
        assert_eq!(
            validate_display_name(&long_name).unwrap_err(),
            ValidationError::NameTooLong
        );
    }
}
