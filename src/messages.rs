//! User-facing messages used when the server doesn't provide one.

/// The server couldn't be reached or sent back something unintelligible.
pub const CONNECTION_ERROR: &str = "Błąd połączenia z serwerem";

/// A request was rejected without an explanation.
pub const GENERIC_ERROR: &str = "Wystąpił błąd";

pub const PROFILE_REFRESH_FAILED: &str =
    "Nie udało się odświeżyć danych użytkownika";

pub const EMAIL_VERIFICATION_FAILED: &str =
    "Wystąpił błąd podczas weryfikacji";

pub const MISSING_VERIFICATION_TOKEN: &str = "Brak tokenu weryfikacyjnego";

pub const RESEND_VERIFICATION_FAILED: &str =
    "Nie udało się wysłać emaila ponownie";
