use validator::{ValidationError, ValidationErrors};

/// Flatten validator output into a single `"; "`-joined message.
///
/// Fields without a custom message fall back to `"<field> is invalid"`, so the
/// caller never receives an empty string for a failed validation.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(m) => m.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Trimmed, lowercased email used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimum password length enforced on every password change.
pub const MIN_PASSWORD_LEN: usize = 8;

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        let mut err = ValidationError::new("password_length");
        err.message = Some(format!("Password must be at least {MIN_PASSWORD_LEN} characters").into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Signup {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(custom(function = "validate_password"))]
        password: String,
        #[validate(length(min = 1))]
        first_name: String,
    }

    #[test]
    fn messages_are_joined_in_field_order() {
        let s = Signup {
            email: "nope".into(),
            password: "short".into(),
            first_name: "".into(),
        };
        let err = s.validate().unwrap_err();
        assert_eq!(
            format_validation_errors(&err),
            "Invalid email format; first_name is invalid; Password must be at least 8 characters"
        );
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}
