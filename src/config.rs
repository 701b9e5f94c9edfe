use crate::error::EngineError;
use crate::time::ClockTime;

fn normalize_database_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("postgres://") {
        return format!("postgresql://{rest}");
    }
    url.to_string()
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,

    // =========================
    // Automation engine cadence
    // =========================
    /// Whether the tick driver runs the generator and dispatcher at all.
    pub automation_enabled: bool,
    /// Interval between ticks. Floored at 5 seconds.
    pub tick_seconds: u64,
    /// IANA timezone used for posting-window and daily-cap boundaries.
    pub timezone: String,
    /// How often auto-generation is allowed to run, independent of tick cadence.
    pub suggestion_interval_minutes: i64,

    // =========================
    // Defaults seeded by bootstrap
    // =========================
    pub default_group_id: String,
    pub default_group_name: String,
    pub default_daily_target: i64,
    pub default_daily_limit: i64,
    pub default_start_time: ClockTime,
    pub default_end_time: ClockTime,
    pub default_theme_keywords: Vec<String>,
    pub default_message_template: String,
    pub default_price_prefix: String,

    // =========================
    // Generation tuning
    // =========================
    pub product_dedup_days: i64,
    pub suggestion_fetch_limit_per_theme: u32,
    pub suggestion_max_per_run: u32,

    // =========================
    // Upstream catalog (Shopee-style offer API)
    // =========================
    pub shopee_api_base_url: String,
    pub shopee_api_username: String,
    pub shopee_api_password: String,
    pub shopee_api_timeout_seconds: f64,

    // =========================
    // Messaging (WhatsApp-style API)
    // =========================
    pub wa_api_base_url: String,
    pub wa_api_key: String,
    pub wa_api_timeout_seconds: f64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, EngineError> {
        let database_url = normalize_database_url(&env_string("DATABASE_URL", "sqlite://promoflow_dev.db"));

        let tick_seconds = env_parse("AUTOMATION_TICK_SECONDS", 30u64).max(5);

        let timezone = env_string("AUTOMATION_TIMEZONE", "America/Sao_Paulo");
        crate::time::parse_timezone(&timezone)?;

        let default_start_time = ClockTime::parse(&env_string("AUTOMATION_DEFAULT_START_TIME", "09:00"))?;
        let default_end_time = ClockTime::parse(&env_string("AUTOMATION_DEFAULT_END_TIME", "22:00"))?;

        let default_theme_keywords = env_string(
            "AUTOMATION_DEFAULT_THEME_KEYWORDS",
            "iphone,notebook,fone bluetooth,ssd,smartwatch",
        )
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

        Ok(Self {
            database_url,

            automation_enabled: env_bool("AUTOMATION_ENABLED", true),
            tick_seconds,
            timezone,
            suggestion_interval_minutes: env_parse("AUTOMATION_SUGGESTION_INTERVAL_MINUTES", 30),

            default_group_id: env_string("AUTOMATION_DEFAULT_GROUP_ID", ""),
            default_group_name: env_string("AUTOMATION_DEFAULT_GROUP_NAME", "Teste dos Posts Automaticos"),
            default_daily_target: env_parse("AUTOMATION_DEFAULT_DAILY_TARGET", 15),
            default_daily_limit: env_parse("AUTOMATION_DEFAULT_DAILY_LIMIT", 15),
            default_start_time,
            default_end_time,
            default_theme_keywords,
            default_message_template: env_string(
                "AUTOMATION_DEFAULT_MESSAGE_TEMPLATE",
                "🔥 {productName}\n💰 A partir de R$ {formattedPrice}\n🔗 {shortLink}",
            ),
            default_price_prefix: env_string("AUTOMATION_DEFAULT_PRICE_PREFIX", "R$"),

            product_dedup_days: env_parse("PRODUCT_DEDUP_DAYS", 7),
            suggestion_fetch_limit_per_theme: env_parse("SUGGESTION_FETCH_LIMIT_PER_THEME", 12),
            suggestion_max_per_run: env_parse("SUGGESTION_MAX_PER_RUN", 30),

            shopee_api_base_url: env_string("SHOPEE_API_BASE_URL", "https://promoshare-api.onrender.com"),
            shopee_api_username: env_string("SHOPEE_API_USERNAME", ""),
            shopee_api_password: env_string("SHOPEE_API_PASSWORD", ""),
            shopee_api_timeout_seconds: env_parse("SHOPEE_API_TIMEOUT_SECONDS", 20.0),

            wa_api_base_url: env_string("WA_API_BASE_URL", "https://promoshare-whatsapp-api.onrender.com"),
            wa_api_key: env_string("WA_API_KEY", ""),
            wa_api_timeout_seconds: env_parse("WA_API_TIMEOUT_SECONDS", 20.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_postgres_scheme() {
        assert_eq!(normalize_database_url("postgres://u:p@host/db"), "postgresql://u:p@host/db");
        assert_eq!(normalize_database_url("sqlite://dev.db"), "sqlite://dev.db");
    }
}
