//! Error taxonomy. `EngineError` is the single type every public engine
//! operation returns; it exposes a stable `code()` so a future caller (an
//! HTTP façade, a CLI) can map it onto its own status scheme without
//! matching on display text. Adapter-local errors stay narrow (`thiserror`
//! enums of their own) and convert into `EngineError` at the boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("http error ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("internal server error: {0}")]
    Internal(String),

    #[error("theme already exists: {keyword}")]
    ThemeExists { keyword: String },
    #[error("theme not found: {id}")]
    ThemeNotFound { id: i64 },

    #[error("posting window is not configured")]
    PostingWindowMissing,
    #[error("target group is not configured")]
    TargetGroupNotConfigured,
    #[error("invalid timezone: {name}")]
    InvalidTimezone { name: String },

    #[error("suggestion not found: {id}")]
    SuggestionNotFound { id: i64 },
    #[error("suggestion {id} is not pending (current status: {status})")]
    SuggestionNotPending { id: i64, status: String },
    #[error("suggestion {id} has no usable link")]
    SuggestionMissingLinks { id: i64 },

    #[error("shopee api credentials are not configured")]
    ShopeeApiCredentialsMissing,
    #[error("shopee api unreachable: {0}")]
    ShopeeApiUnreachable(String),
    #[error("shopee api returned an invalid response: {0}")]
    ShopeeApiInvalidResponse(String),
    #[error("shopee api login failed: {0}")]
    ShopeeApiLoginFailed(String),
    #[error("shopee api http error ({status}): {message}")]
    ShopeeApiHttpError { status: u16, message: String },
    #[error("shopee api error: {0}")]
    ShopeeApiError(String),

    #[error("whatsapp api key is not configured")]
    WaApiKeyMissing,
    #[error("whatsapp api unreachable: {0}")]
    WaApiUnreachable(String),
    #[error("whatsapp api returned an invalid response: {0}")]
    WaApiInvalidResponse(String),
    #[error("whatsapp api http error ({status}): {message}")]
    WaApiHttpError { status: u16, message: String },
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable identifier for this error, matching the
    /// abstract taxonomy a caller is expected to branch on.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Http { .. } => "http_error",
            Self::Internal(_) => "internal_server_error",
            Self::ThemeExists { .. } => "theme_exists",
            Self::ThemeNotFound { .. } => "theme_not_found",
            Self::PostingWindowMissing => "posting_window_missing",
            Self::TargetGroupNotConfigured => "target_group_not_configured",
            Self::InvalidTimezone { .. } => "invalid_timezone",
            Self::SuggestionNotFound { .. } => "suggestion_not_found",
            Self::SuggestionNotPending { .. } => "suggestion_not_pending",
            Self::SuggestionMissingLinks { .. } => "suggestion_missing_links",
            Self::ShopeeApiCredentialsMissing => "shopee_api_credentials_missing",
            Self::ShopeeApiUnreachable(_) => "shopee_api_unreachable",
            Self::ShopeeApiInvalidResponse(_) => "shopee_api_invalid_response",
            Self::ShopeeApiLoginFailed(_) => "shopee_api_login_failed",
            Self::ShopeeApiHttpError { .. } => "shopee_api_http_error",
            Self::ShopeeApiError(_) => "shopee_api_error",
            Self::WaApiKeyMissing => "wa_api_key_missing",
            Self::WaApiUnreachable(_) => "wa_api_unreachable",
            Self::WaApiInvalidResponse(_) => "wa_api_invalid_response",
            Self::WaApiHttpError { .. } => "wa_api_http_error",
        }
    }
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("value out of range for column {column}: {value}")]
    OutOfRange { column: &'static str, value: i64 },
    #[error("row not found: {0}")]
    NotFound(String),
}

impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => EngineError::NotFound(what),
            other => EngineError::Internal(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("credentials missing")]
    CredentialsMissing,
    #[error("unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("login failed: {0}")]
    LoginFailed(String),
    #[error("http error ({status}): {message}")]
    HttpError { status: u16, message: String },
    #[error("{0}")]
    Other(String),
}

impl From<CatalogError> for EngineError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::CredentialsMissing => EngineError::ShopeeApiCredentialsMissing,
            CatalogError::Unreachable(e) => EngineError::ShopeeApiUnreachable(e.to_string()),
            CatalogError::InvalidResponse(m) => EngineError::ShopeeApiInvalidResponse(m),
            CatalogError::LoginFailed(m) => EngineError::ShopeeApiLoginFailed(m),
            CatalogError::HttpError { status, message } => EngineError::ShopeeApiHttpError { status, message },
            CatalogError::Other(m) => EngineError::ShopeeApiError(m),
        }
    }
}

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("api key missing")]
    KeyMissing,
    #[error("unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("http error ({status}): {message}")]
    HttpError { status: u16, message: String },
}

impl From<MessagingError> for EngineError {
    fn from(err: MessagingError) -> Self {
        match err {
            MessagingError::KeyMissing => EngineError::WaApiKeyMissing,
            MessagingError::Unreachable(e) => EngineError::WaApiUnreachable(e.to_string()),
            MessagingError::InvalidResponse(m) => EngineError::WaApiInvalidResponse(m),
            MessagingError::HttpError { status, message } => EngineError::WaApiHttpError { status, message },
        }
    }
}
