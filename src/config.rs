use serde::Deserialize;

/// Public FBI Crime Data Explorer endpoint.
pub const DEFAULT_FBI_API_BASE: &str = "https://api.usa.gov/crime/fbi/cde";
/// CRM host used for contact deep links in alerts.
pub const DEFAULT_CRM_BASE_URL: &str = "https://crm.salient-group.com";
/// Postgres type of the CRM `vertical` column (the Prisma enum name).
pub const DEFAULT_VERTICAL_COLUMN_TYPE: &str = "Vertical";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub fbi_api_key: String,
    pub fbi_api_base: String,
    pub telegram_api_url: String,
    pub telegram_chat_id: String,
    pub telegram_bot_token: String,
    pub crm_base_url: String,
    pub vertical_column_type: String,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            log_prefix(&config.database_url)
        );
        tracing::debug!("FBI API base: {}", config.fbi_api_base);
        tracing::debug!("Telegram API URL: {}", config.telegram_api_url);
        tracing::debug!("CRM base URL: {}", config.crm_base_url);
        tracing::debug!("Vertical column type: {}", config.vertical_column_type);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Credentials have no fallback values: a missing or blank variable is a start-up error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> anyhow::Result<String> {
            let value = lookup(key)
                .ok_or_else(|| anyhow::anyhow!("{} environment variable required", key))?;
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", key);
            }
            Ok(value.trim().to_string())
        };
        let optional = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        // DB_URL is only consulted when DATABASE_URL is unset or blank
        let database_url = optional("DATABASE_URL")
            .or_else(|| optional("DB_URL"))
            .map(|url| url.trim().to_string())
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable required"))
            .and_then(|url| {
                if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                    anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                }
                Ok(url)
            })?;

        let vertical_column_type = optional("CRM_VERTICAL_TYPE")
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| DEFAULT_VERTICAL_COLUMN_TYPE.to_string());
        if !is_sql_identifier(&vertical_column_type) {
            anyhow::bail!(
                "CRM_VERTICAL_TYPE must be a plain type name, got '{}'",
                vertical_column_type
            );
        }

        let port = optional("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?;

        let http_timeout_secs = optional("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a whole number of seconds"))?;

        Ok(Self {
            database_url,
            port,
            fbi_api_key: required("FBI_API_KEY")?,
            fbi_api_base: http_url(
                "FBI_API_BASE",
                optional("FBI_API_BASE").unwrap_or_else(|| DEFAULT_FBI_API_BASE.to_string()),
            )?,
            telegram_api_url: http_url("TELEGRAM_API_URL", required("TELEGRAM_API_URL")?)?,
            telegram_chat_id: required("TELEGRAM_CHAT_ID")?,
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            crm_base_url: http_url(
                "CRM_BASE_URL",
                optional("CRM_BASE_URL").unwrap_or_else(|| DEFAULT_CRM_BASE_URL.to_string()),
            )?,
            vertical_column_type,
            http_timeout_secs,
        })
    }
}

/// First 20 characters of a connection string, for logs.
fn log_prefix(value: &str) -> String {
    value.chars().take(20).collect()
}

/// Letters, digits and underscores, not starting with a digit.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validates an http(s) URL and strips any trailing slash.
fn http_url(key: &str, value: String) -> anyhow::Result<String> {
    let parsed = url::Url::parse(value.trim())
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", key, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", key);
    }
    Ok(value.trim().trim_end_matches('/').to_string())
}
