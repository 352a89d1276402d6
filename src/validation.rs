//! Checks to run on form input before bothering the server.

use crate::endpoints::Registration;

/// The shortest password the server will accept.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Imię i nazwisko są wymagane")]
    MissingName,
    #[error("Email jest wymagany")]
    MissingEmail,
    #[error("Hasło musi mieć co najmniej 8 znaków")]
    PasswordTooShort,
    #[error("Hasła nie są identyczne")]
    PasswordMismatch,
}

/// Make sure a [`Registration`] is worth sending.
pub fn validate_registration(
    registration: &Registration,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    if registration.first_name.trim().is_empty()
        || registration.last_name.trim().is_empty()
    {
        return Err(ValidationError::MissingName);
    }
    if registration.email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !long_enough(&registration.password) {
        return Err(ValidationError::PasswordTooShort);
    }
    if registration.password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }

    Ok(())
}

/// Check the new password entered on the password reset form.
pub fn validate_new_password(
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if !long_enough(password) {
        return Err(ValidationError::PasswordTooShort);
    }

    Ok(())
}

fn long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}
