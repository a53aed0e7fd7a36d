//! Form schemas for the urlencoded form actions.
//!
//! Each form validates itself before any service call. A failed check turns
//! into a 400 that echoes the submitted form (secrets are never serialized)
//! together with per-field messages.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{de::DeserializeOwned, ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::application::ApplicationInput;
use crate::models::download::{DownloadRequest, DownloadType};
use crate::models::platform::{PlatformInput, PlatformType};
use crate::models::settings::{MonetizationSettings, SystemSettings};
use crate::models::user::Role;
use crate::services::user_service::{ProfileInput, UserInput};

const MIN_PASSWORD_LEN: usize = 8;
const MAX_NAME_LEN: usize = 100;

/// Validation messages keyed by field, in the order they were raised.
#[derive(Debug, Default, Clone)]
pub struct FieldErrors {
    entries: Vec<(&'static str, String)>,
}

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.entries.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    /// All messages joined with `", "`
    pub fn message(&self) -> String {
        self.entries
            .iter()
            .map(|(_, m)| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn grouped(&self) -> Vec<(&'static str, Vec<&str>)> {
        let mut groups: Vec<(&'static str, Vec<&str>)> = Vec::new();
        for (field, message) in &self.entries {
            match groups.iter_mut().find(|(f, _)| f == field) {
                Some((_, messages)) => messages.push(message),
                None => groups.push((*field, vec![message.as_str()])),
            }
        }
        groups
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let groups = self.grouped();
        let mut map = serializer.serialize_map(Some(groups.len()))?;
        for (field, messages) in groups {
            map.serialize_entry(field, &messages)?;
        }
        map.end()
    }
}

/// A form that failed validation.
#[derive(Debug)]
pub struct FormFailure {
    pub form: Value,
    pub errors: FieldErrors,
}

impl IntoResponse for FormFailure {
    fn into_response(self) -> Response {
        let message = self.errors.message();
        tracing::debug!(message = %message, "Form validation failed");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "form": self.form,
                "errors": self.errors,
                "message": message,
            })),
        )
            .into_response()
    }
}

/// Self-validating form.
pub trait Validate: Serialize {
    fn validate(&self, errors: &mut FieldErrors);

    fn check(&self) -> std::result::Result<(), FormFailure> {
        self.check_with(|_| {})
    }

    /// Validate, then apply extra rules that depend on the calling action.
    fn check_with<F>(&self, extra: F) -> std::result::Result<(), FormFailure>
    where
        F: FnOnce(&mut FieldErrors),
    {
        let mut errors = FieldErrors::default();
        self.validate(&mut errors);
        extra(&mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormFailure {
                form: serde_json::to_value(self).unwrap_or(Value::Null),
                errors,
            })
        }
    }
}

/// `application/x-www-form-urlencoded` body whose rejection uses the JSON error shape.
pub struct FormBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for FormBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Ok(Self(value))
    }
}

// Rules

pub fn required(errors: &mut FieldErrors, field: &'static str, value: &str, label: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, format!("{} is required", label));
        false
    } else {
        true
    }
}

pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

fn email(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if required(errors, field, value, "Email") && !is_valid_email(value) {
        errors.add(field, "Please enter a valid email address");
    }
}

fn min_length(errors: &mut FieldErrors, field: &'static str, value: &str, min: usize, label: &str) {
    if value.chars().count() < min {
        errors.add(field, format!("{} must be at least {} characters", label, min));
    }
}

fn max_length(errors: &mut FieldErrors, field: &'static str, value: &str, max: usize, label: &str) {
    if value.chars().count() > max {
        errors.add(field, format!("{} must be at most {} characters", label, max));
    }
}

pub fn is_valid_url(value: &str) -> bool {
    match reqwest::Url::parse(value.trim()) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn number_in_range(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    min: u32,
    max: u32,
    label: &str,
) -> Option<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) if (min..=max).contains(&n) => Some(n),
        _ => {
            errors.add(field, format!("{} must be a number between {} and {}", label, min, max));
            None
        }
    }
}

/// HTML checkboxes submit a value only when ticked.
pub fn checked(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("on" | "true" | "1" | "yes")
    )
}

/// Trimmed value, `None` when blank.
pub fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// Authentication

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

impl Validate for LoginForm {
    fn validate(&self, errors: &mut FieldErrors) {
        email(errors, "email", &self.email);
        required(errors, "password", &self.password, "Password");
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GoogleLoginForm {
    #[serde(default, skip_serializing)]
    pub credential: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

impl Validate for GoogleLoginForm {
    fn validate(&self, errors: &mut FieldErrors) {
        required(errors, "credential", &self.credential, "Google credential");
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing)]
    pub confirm_password: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

impl Validate for RegisterForm {
    fn validate(&self, errors: &mut FieldErrors) {
        if required(errors, "name", &self.name, "Name") {
            max_length(errors, "name", self.name.trim(), MAX_NAME_LEN, "Name");
        }
        email(errors, "email", &self.email);
        if required(errors, "password", &self.password, "Password") {
            min_length(errors, "password", &self.password, MIN_PASSWORD_LEN, "Password");
        }
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub email: String,
}

impl Validate for ForgotPasswordForm {
    fn validate(&self, errors: &mut FieldErrors) {
        email(errors, "email", &self.email);
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ResetPasswordForm {
    #[serde(default, skip_serializing)]
    pub token: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing)]
    pub confirm_password: String,
}

impl Validate for ResetPasswordForm {
    fn validate(&self, errors: &mut FieldErrors) {
        required(errors, "token", &self.token, "Reset token");
        if required(errors, "password", &self.password, "Password") {
            min_length(errors, "password", &self.password, MIN_PASSWORD_LEN, "Password");
        }
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }
    }
}

// Account

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PasswordForm {
    #[serde(default, skip_serializing)]
    pub current_password: String,
    #[serde(default, skip_serializing)]
    pub new_password: String,
    #[serde(default, skip_serializing)]
    pub confirm_password: String,
}

impl Validate for PasswordForm {
    fn validate(&self, errors: &mut FieldErrors) {
        required(errors, "current_password", &self.current_password, "Current password");
        if required(errors, "new_password", &self.new_password, "New password") {
            min_length(errors, "new_password", &self.new_password, MIN_PASSWORD_LEN, "New password");
            if self.new_password == self.current_password {
                errors.add("new_password", "New password must differ from the current one");
            }
        }
        if self.new_password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl Validate for ProfileForm {
    fn validate(&self, errors: &mut FieldErrors) {
        if required(errors, "name", &self.name, "Name") {
            max_length(errors, "name", self.name.trim(), MAX_NAME_LEN, "Name");
        }
        email(errors, "email", &self.email);
    }
}

impl ProfileForm {
    pub fn to_input(&self) -> ProfileInput {
        ProfileInput {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

// Admin records

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PlatformForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(rename = "type", default)]
    pub platform_type: String,
    #[serde(default)]
    pub url_pattern: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<String>,
    #[serde(default)]
    pub is_premium: Option<String>,
}

impl Validate for PlatformForm {
    fn validate(&self, errors: &mut FieldErrors) {
        required(errors, "name", &self.name, "Name");
        if required(errors, "slug", &self.slug, "Slug") && !is_slug(self.slug.trim()) {
            errors.add(
                "slug",
                "Slug may only contain lowercase letters, digits and hyphens",
            );
        }
        if PlatformType::parse(self.platform_type.trim()).is_none() {
            errors.add("type", "Type must be one of video, audio, image, mixed");
        }
    }
}

impl PlatformForm {
    pub fn to_input(&self) -> PlatformInput {
        PlatformInput {
            name: self.name.trim().to_string(),
            slug: self.slug.trim().to_string(),
            platform_type: PlatformType::parse(self.platform_type.trim()).unwrap_or_default(),
            url_pattern: optional(&self.url_pattern),
            is_active: checked(&self.is_active),
            is_premium: checked(&self.is_premium),
            description: optional(&self.description),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApplicationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub platform_id: Option<String>,
    #[serde(default)]
    pub banner_ad_unit_id: Option<String>,
    #[serde(default)]
    pub interstitial_ad_unit_id: Option<String>,
    #[serde(default)]
    pub rewarded_ad_unit_id: Option<String>,
    #[serde(default)]
    pub ads_enabled: Option<String>,
    #[serde(default)]
    pub is_premium_only: Option<String>,
}

fn is_package_name(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    parts.len() >= 2
        && parts.iter().all(|p| {
            p.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

impl Validate for ApplicationForm {
    fn validate(&self, errors: &mut FieldErrors) {
        required(errors, "name", &self.name, "Name");
        if required(errors, "package_name", &self.package_name, "Package name")
            && !is_package_name(self.package_name.trim())
        {
            errors.add("package_name", "Package name must look like com.example.app");
        }
    }
}

impl ApplicationForm {
    pub fn to_input(&self) -> ApplicationInput {
        ApplicationInput {
            name: self.name.trim().to_string(),
            package_name: self.package_name.trim().to_string(),
            platform_id: optional(&self.platform_id),
            banner_ad_unit_id: optional(&self.banner_ad_unit_id),
            interstitial_ad_unit_id: optional(&self.interstitial_ad_unit_id),
            rewarded_ad_unit_id: optional(&self.rewarded_ad_unit_id),
            ads_enabled: checked(&self.ads_enabled),
            is_premium_only: checked(&self.is_premium_only),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub is_active: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl Validate for UserForm {
    fn validate(&self, errors: &mut FieldErrors) {
        required(errors, "name", &self.name, "Name");
        email(errors, "email", &self.email);
        if !matches!(self.role.trim(), "admin" | "user") {
            errors.add("role", "Role must be admin or user");
        }
        if let Some(password) = optional(&self.password) {
            min_length(errors, "password", &password, MIN_PASSWORD_LEN, "Password");
        }
    }
}

impl UserForm {
    /// New accounts must be given a password.
    pub fn require_password(&self, errors: &mut FieldErrors) {
        if optional(&self.password).is_none() {
            errors.add("password", "Password is required");
        }
    }

    pub fn to_input(&self) -> UserInput {
        UserInput {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            role: if self.role.trim() == "admin" {
                Role::Admin
            } else {
                Role::User
            },
            is_active: checked(&self.is_active),
            password: optional(&self.password),
        }
    }
}

// Downloads

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type", default)]
    pub download_type: Option<String>,
    #[serde(default)]
    pub platform_id: Option<String>,
}

impl DownloadForm {
    fn parsed_type(&self) -> Option<DownloadType> {
        match optional(&self.download_type) {
            None => Some(DownloadType::Video),
            Some(t) => DownloadType::parse(&t),
        }
    }

    pub fn to_request(&self) -> DownloadRequest {
        DownloadRequest {
            url: self.url.trim().to_string(),
            download_type: self.parsed_type().unwrap_or(DownloadType::Video),
            platform_id: optional(&self.platform_id),
        }
    }
}

impl Validate for DownloadForm {
    fn validate(&self, errors: &mut FieldErrors) {
        if required(errors, "url", &self.url, "URL") && !is_valid_url(self.url.trim()) {
            errors.add("url", "Please enter a valid URL");
        }
        if self.parsed_type().is_none() {
            errors.add("type", "Type must be one of video, audio, thumbnail");
        }
    }
}

// Settings

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WebsiteSettingsForm {
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub site_description: String,
    #[serde(default)]
    pub default_language: String,
    #[serde(default)]
    pub contact_email: Option<String>,
}

/// Website keys written by the form; logo and favicon are managed by upload.
#[derive(Debug, Serialize)]
pub struct WebsiteSettingsUpdate {
    pub site_name: String,
    pub site_description: String,
    pub default_language: String,
    pub contact_email: Option<String>,
}

impl Validate for WebsiteSettingsForm {
    fn validate(&self, errors: &mut FieldErrors) {
        if required(errors, "site_name", &self.site_name, "Site name") {
            max_length(errors, "site_name", self.site_name.trim(), MAX_NAME_LEN, "Site name");
        }
        required(errors, "site_description", &self.site_description, "Site description");
        required(errors, "default_language", &self.default_language, "Default language");
        if let Some(contact) = optional(&self.contact_email) {
            if !is_valid_email(&contact) {
                errors.add("contact_email", "Please enter a valid email address");
            }
        }
    }
}

impl WebsiteSettingsForm {
    pub fn to_update(&self) -> WebsiteSettingsUpdate {
        WebsiteSettingsUpdate {
            site_name: self.site_name.trim().to_string(),
            site_description: self.site_description.trim().to_string(),
            default_language: self.default_language.trim().to_string(),
            contact_email: optional(&self.contact_email),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EmailSettingsForm {
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default)]
    pub smtp_port: String,
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default, skip_serializing)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub encryption: String,
    #[serde(default)]
    pub from_email: String,
    #[serde(default)]
    pub from_name: String,
}

/// Email keys written by the form. A blank password keeps the stored one.
#[derive(Serialize)]
pub struct EmailSettingsUpdate {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_password: Option<String>,
    pub encryption: String,
    pub from_email: String,
    pub from_name: String,
}

impl Validate for EmailSettingsForm {
    fn validate(&self, errors: &mut FieldErrors) {
        required(errors, "smtp_host", &self.smtp_host, "SMTP host");
        number_in_range(errors, "smtp_port", &self.smtp_port, 1, 65535, "SMTP port");
        if !matches!(self.encryption.trim(), "none" | "ssl" | "tls") {
            errors.add("encryption", "Encryption must be one of none, ssl, tls");
        }
        email(errors, "from_email", &self.from_email);
        required(errors, "from_name", &self.from_name, "Sender name");
    }
}

impl EmailSettingsForm {
    pub fn to_update(&self) -> EmailSettingsUpdate {
        EmailSettingsUpdate {
            smtp_host: self.smtp_host.trim().to_string(),
            smtp_port: self.smtp_port.trim().parse().unwrap_or(587),
            smtp_username: self.smtp_username.trim().to_string(),
            smtp_password: optional(&self.smtp_password),
            encryption: self.encryption.trim().to_string(),
            from_email: self.from_email.trim().to_string(),
            from_name: self.from_name.trim().to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SystemSettingsForm {
    #[serde(default)]
    pub maintenance_mode: Option<String>,
    #[serde(default)]
    pub registration_enabled: Option<String>,
    #[serde(default)]
    pub max_downloads_per_day: String,
    #[serde(default)]
    pub max_file_size_mb: String,
    #[serde(default)]
    pub download_expiry_hours: String,
}

impl Validate for SystemSettingsForm {
    fn validate(&self, errors: &mut FieldErrors) {
        number_in_range(
            errors,
            "max_downloads_per_day",
            &self.max_downloads_per_day,
            1,
            10_000,
            "Daily download limit",
        );
        number_in_range(errors, "max_file_size_mb", &self.max_file_size_mb, 1, 10_240, "Maximum file size");
        number_in_range(
            errors,
            "download_expiry_hours",
            &self.download_expiry_hours,
            1,
            720,
            "Download expiry",
        );
    }
}

impl SystemSettingsForm {
    pub fn to_settings(&self) -> SystemSettings {
        let defaults = SystemSettings::default();
        SystemSettings {
            maintenance_mode: checked(&self.maintenance_mode),
            registration_enabled: checked(&self.registration_enabled),
            max_downloads_per_day: self
                .max_downloads_per_day
                .trim()
                .parse()
                .unwrap_or(defaults.max_downloads_per_day),
            max_file_size_mb: self
                .max_file_size_mb
                .trim()
                .parse()
                .unwrap_or(defaults.max_file_size_mb),
            download_expiry_hours: self
                .download_expiry_hours
                .trim()
                .parse()
                .unwrap_or(defaults.download_expiry_hours),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MonetizationSettingsForm {
    #[serde(default)]
    pub ads_enabled: Option<String>,
    #[serde(default)]
    pub adsense_publisher_id: Option<String>,
    #[serde(default)]
    pub header_ad_slot: Option<String>,
    #[serde(default)]
    pub sidebar_ad_slot: Option<String>,
    #[serde(default)]
    pub premium_enabled: Option<String>,
}

fn is_publisher_id(value: &str) -> bool {
    let digits = value
        .strip_prefix("ca-pub-")
        .or_else(|| value.strip_prefix("pub-"))
        .unwrap_or("");
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

impl Validate for MonetizationSettingsForm {
    fn validate(&self, errors: &mut FieldErrors) {
        match optional(&self.adsense_publisher_id) {
            Some(id) if !is_publisher_id(&id) => {
                errors.add("adsense_publisher_id", "Publisher ID must look like ca-pub-1234567890");
            }
            None if checked(&self.ads_enabled) => {
                errors.add("adsense_publisher_id", "Publisher ID is required when ads are enabled");
            }
            _ => {}
        }
    }
}

impl MonetizationSettingsForm {
    pub fn to_settings(&self) -> MonetizationSettings {
        MonetizationSettings {
            ads_enabled: checked(&self.ads_enabled),
            adsense_publisher_id: optional(&self.adsense_publisher_id),
            header_ad_slot: optional(&self.header_ad_slot),
            sidebar_ad_slot: optional(&self.sidebar_ad_slot),
            premium_enabled: checked(&self.premium_enabled),
        }
    }
}
