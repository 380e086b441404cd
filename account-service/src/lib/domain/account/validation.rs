//! Input validation and sanitization.
//!
//! Every public payload passes through a pure function
//! `raw input -> Result<command, ValidationErrors>` before any lookup or
//! persistence. Fields are collected rather than failing fast, so a client gets
//! every problem in one response. Unknown fields are captured with
//! `#[serde(flatten)]` and rejected.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::LoginCommand;
use crate::domain::account::models::Password;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::ResetPasswordCommand;
use crate::domain::account::models::UpdateProfileCommand;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_COUNTRY_LENGTH: usize = 100;
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";
pub const DELETE_CONFIRMATION: &str = "DELETE_MY_ACCOUNT";

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "12345678",
    "qwerty123",
    "password123",
    "password1!",
    "passw0rd!",
    "welcome1!",
    "qwerty123!",
];

/// Deployment-specific validation knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub max_email_length: usize,
    pub block_disposable_emails: bool,
    /// Lower-cased domains rejected when `block_disposable_emails` is set
    pub disposable_domains: Vec<String>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_email_length: 254,
            block_disposable_emails: true,
            disposable_domains: vec![
                "10minutemail.com".to_string(),
                "tempmail.org".to_string(),
                "guerrillamail.com".to_string(),
            ],
        }
    }
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field-level failure of one payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.iter().map(|e| e.field.as_str()).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Raw registration payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

/// Raw login payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

/// Raw forgot-password payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPasswordInput {
    pub email: Option<String>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

/// Raw reset-password payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordInput {
    pub token: Option<String>,
    pub new_password: Option<String>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

/// Raw refresh payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshInput {
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

/// Raw profile update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdateInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

/// Raw account deletion payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteAccountInput {
    pub confirm_delete: Option<String>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

/// Accumulates field errors for one payload.
#[derive(Default)]
struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn reject_unknown(&mut self, unknown: &BTreeMap<String, Value>) {
        for field in unknown.keys() {
            self.fail(field, "Unexpected field");
        }
    }

    fn required(&mut self, field: &str, value: Option<String>) -> Option<String> {
        match value {
            Some(v) if !v.trim().is_empty() => Some(v),
            _ => {
                self.fail(field, format!("{} is required", field));
                None
            }
        }
    }

    /// Record the outcome of a field check, keeping the value on success.
    fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.fail(field, message);
                None
            }
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

impl ValidationPolicy {
    /// Validate a registration payload.
    ///
    /// Applies the full email policy and password strength rules; names and
    /// country are sanitized.
    pub fn registration(&self, input: RegistrationInput) -> Result<RegisterCommand, ValidationErrors> {
        let mut checks = Checks::default();
        checks.reject_unknown(&input.unknown);

        let email = checks
            .required("email", input.email)
            .and_then(|raw| checks.check("email", self.email(&raw, true)));
        let password = checks
            .required("password", input.password)
            .and_then(|raw| checks.check("password", password_strength(&raw).map(|_| raw)));
        let first_name = checks
            .required("first_name", input.first_name)
            .and_then(|raw| checks.check("first_name", person_name(&raw)));
        let last_name = checks
            .required("last_name", input.last_name)
            .and_then(|raw| checks.check("last_name", person_name(&raw)));
        let country = match input.country {
            Some(raw) if !raw.trim().is_empty() => {
                checks.check("country", country(&raw)).map(Some)
            }
            _ => Some(None),
        };

        checks.finish()?;

        match (email, password, first_name, last_name, country) {
            (Some(email), Some(password), Some(first_name), Some(last_name), Some(country)) => {
                Ok(RegisterCommand {
                    email,
                    password: Password::new(password),
                    first_name,
                    last_name,
                    country,
                })
            }
            _ => Err(ValidationErrors::single("body", "Invalid registration payload")),
        }
    }

    /// Validate a login payload.
    ///
    /// Only the address grammar is checked; strength rules do not apply to
    /// existing passwords.
    pub fn login(&self, input: LoginInput) -> Result<LoginCommand, ValidationErrors> {
        let mut checks = Checks::default();
        checks.reject_unknown(&input.unknown);

        let email = checks
            .required("email", input.email)
            .and_then(|raw| checks.check("email", self.email(&raw, false)));
        let password = checks.required("password", input.password).and_then(|raw| {
            let length = raw.chars().count();
            checks.check(
                "password",
                if length > MAX_PASSWORD_LENGTH {
                    Err(format!(
                        "password must be at most {} characters",
                        MAX_PASSWORD_LENGTH
                    ))
                } else {
                    Ok(raw)
                },
            )
        });

        checks.finish()?;

        match (email, password) {
            (Some(email), Some(password)) => Ok(LoginCommand {
                email,
                password: Password::new(password),
            }),
            _ => Err(ValidationErrors::single("body", "Invalid login payload")),
        }
    }

    pub fn forgot_password(&self, input: ForgotPasswordInput) -> Result<EmailAddress, ValidationErrors> {
        let mut checks = Checks::default();
        checks.reject_unknown(&input.unknown);

        let email = checks
            .required("email", input.email)
            .and_then(|raw| checks.check("email", self.email(&raw, false)));

        checks.finish()?;
        email.ok_or_else(|| ValidationErrors::single("email", "email is required"))
    }

    pub fn reset_password(
        &self,
        input: ResetPasswordInput,
    ) -> Result<ResetPasswordCommand, ValidationErrors> {
        let mut checks = Checks::default();
        checks.reject_unknown(&input.unknown);

        let token = checks.required("token", input.token);
        let new_password = checks
            .required("new_password", input.new_password)
            .and_then(|raw| checks.check("new_password", password_strength(&raw).map(|_| raw)));

        checks.finish()?;

        match (token, new_password) {
            (Some(token), Some(new_password)) => Ok(ResetPasswordCommand {
                token: token.trim().to_string(),
                new_password: Password::new(new_password),
            }),
            _ => Err(ValidationErrors::single("body", "Invalid reset payload")),
        }
    }

    pub fn refresh(&self, input: RefreshInput) -> Result<String, ValidationErrors> {
        let mut checks = Checks::default();
        checks.reject_unknown(&input.unknown);
        let token = checks.required("refresh_token", input.refresh_token);
        checks.finish()?;
        token
            .map(|t| t.trim().to_string())
            .ok_or_else(|| ValidationErrors::single("refresh_token", "refresh_token is required"))
    }

    /// Validate a profile update. Absent fields are left unchanged.
    pub fn profile_update(
        &self,
        input: ProfileUpdateInput,
    ) -> Result<UpdateProfileCommand, ValidationErrors> {
        let mut checks = Checks::default();
        checks.reject_unknown(&input.unknown);

        let first_name = input
            .first_name
            .and_then(|raw| checks.check("first_name", person_name(&raw)));
        let last_name = input
            .last_name
            .and_then(|raw| checks.check("last_name", person_name(&raw)));
        let email = input
            .email
            .and_then(|raw| checks.check("email", self.email(&raw, true)));
        let country = input
            .country
            .and_then(|raw| checks.check("country", country(&raw)));

        checks.finish()?;

        Ok(UpdateProfileCommand {
            first_name,
            last_name,
            email,
            country,
        })
    }

    pub fn delete_account(&self, input: DeleteAccountInput) -> Result<(), ValidationErrors> {
        let mut checks = Checks::default();
        checks.reject_unknown(&input.unknown);

        if input.confirm_delete.as_deref() != Some(DELETE_CONFIRMATION) {
            checks.fail(
                "confirm_delete",
                format!("confirm_delete must be \"{}\"", DELETE_CONFIRMATION),
            );
        }

        checks.finish()
    }

    /// Normalize and check an address against grammar, length and (optionally)
    /// the disposable-domain denylist.
    fn email(&self, raw: &str, check_disposable: bool) -> Result<EmailAddress, String> {
        let email = EmailAddress::parse(raw).map_err(|_| "Invalid email address".to_string())?;

        if email.as_str().len() > self.max_email_length {
            return Err(format!(
                "email must be at most {} characters",
                self.max_email_length
            ));
        }

        if check_disposable && self.block_disposable_emails && self.is_disposable(&email) {
            return Err("Disposable email addresses are not allowed".to_string());
        }

        Ok(email)
    }

    fn is_disposable(&self, email: &EmailAddress) -> bool {
        let domain = email.domain();
        self.disposable_domains.iter().any(|blocked| {
            domain == blocked
                || domain
                    .strip_suffix(blocked.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// Check password strength rules.
pub fn password_strength(password: &str) -> Result<(), String> {
    let length = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(format!(
            "password must be between {} and {} characters",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        ));
    }

    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    if !(has_lower && has_upper && has_digit && has_symbol) {
        return Err(format!(
            "password must contain a lowercase letter, an uppercase letter, a digit and one of {}",
            PASSWORD_SYMBOLS
        ));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.iter().any(|common| *common == lowered) {
        return Err("password is too common".to_string());
    }

    Ok(())
}

/// Sanitize and check a first or last name.
pub fn person_name(raw: &str) -> Result<String, String> {
    let name =
        strip_markup(raw).ok_or_else(|| "name contains an unterminated tag".to_string())?;
    let name = collapse_whitespace(&name);
    let length = name.chars().count();

    if length == 0 || length > MAX_NAME_LENGTH {
        return Err(format!(
            "name must be between 1 and {} characters",
            MAX_NAME_LENGTH
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '\'' || c == '-')
    {
        return Err("name may only contain letters, spaces, apostrophes and hyphens".to_string());
    }

    Ok(name)
}

/// Sanitize and check a country name.
pub fn country(raw: &str) -> Result<String, String> {
    let country =
        strip_markup(raw).ok_or_else(|| "country contains an unterminated tag".to_string())?;
    let country = collapse_whitespace(&country);
    let length = country.chars().count();

    if length == 0 || length > MAX_COUNTRY_LENGTH {
        return Err(format!(
            "country must be between 1 and {} characters",
            MAX_COUNTRY_LENGTH
        ));
    }

    if !country
        .chars()
        .all(|c| c.is_alphabetic() || matches!(c, ' ' | '\'' | '-' | '.' | '(' | ')' | ','))
    {
        return Err("country contains invalid characters".to_string());
    }

    Ok(country)
}

/// Remove markup tags; `None` when a `<` is never closed.
fn strip_markup(raw: &str) -> Option<String> {
    let mut output = String::with_capacity(raw.len());
    let mut in_tag = false;

    for c in raw.chars() {
        match (in_tag, c) {
            (false, '<') => in_tag = true,
            (true, '>') => in_tag = false,
            (false, _) => output.push(c),
            (true, _) => {}
        }
    }

    (!in_tag).then_some(output)
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Display name from a provider profile, clipped to the stored name rules.
///
/// Falls back to `fallback` when nothing usable remains.
pub fn provider_name(raw: Option<&str>, fallback: &str) -> String {
    let stripped = raw.and_then(strip_markup).unwrap_or_default();
    let cleaned: String = collapse_whitespace(&stripped)
        .chars()
        .filter(|c| c.is_alphabetic() || matches!(c, ' ' | '\'' | '-'))
        .take(MAX_NAME_LENGTH)
        .collect();
    let cleaned = cleaned.trim().to_string();

    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}
