use std::time::Duration;

pub const DEFAULT_HOLIDAY_API_BASE_URL: &str = "https://timor.tech/api/holiday/info";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub holiday_api_base_url: String,
    pub holiday_api_timeout_secs: u64,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            holiday_api_base_url: DEFAULT_HOLIDAY_API_BASE_URL.to_string(),
            holiday_api_timeout_secs: 10,
            rate_limit_per_second: 10,
            rate_limit_burst: 20,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Holiday API Base URL: {}", config.holiday_api_base_url);
        tracing::debug!("Holiday API timeout: {}s", config.holiday_api_timeout_secs);
        tracing::debug!(
            "Rate limit: {}/s, burst {}",
            config.rate_limit_per_second,
            config.rate_limit_burst
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            port: lookup("PORT")
                .map(|port| {
                    port.trim().parse::<u16>().map_err(|_| {
                        anyhow::anyhow!("PORT must be a valid number between 1-65535")
                    })
                })
                .transpose()?
                .unwrap_or(defaults.port),
            holiday_api_base_url: lookup("HOLIDAY_API_BASE_URL")
                .map(|url| {
                    let url = url.trim();
                    if url.is_empty() {
                        anyhow::bail!("HOLIDAY_API_BASE_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("HOLIDAY_API_BASE_URL must start with http:// or https://");
                    }
                    url::Url::parse(url).map_err(|e| {
                        anyhow::anyhow!("HOLIDAY_API_BASE_URL is not a valid URL: {}", e)
                    })?;
                    Ok(url.trim_end_matches('/').to_string())
                })
                .transpose()?
                .unwrap_or(defaults.holiday_api_base_url),
            holiday_api_timeout_secs: parse_positive(
                lookup("HOLIDAY_API_TIMEOUT_SECS"),
                "HOLIDAY_API_TIMEOUT_SECS",
            )?
            .unwrap_or(defaults.holiday_api_timeout_secs),
            rate_limit_per_second: parse_positive(
                lookup("RATE_LIMIT_PER_SECOND"),
                "RATE_LIMIT_PER_SECOND",
            )?
            .unwrap_or(defaults.rate_limit_per_second),
            rate_limit_burst: parse_positive(lookup("RATE_LIMIT_BURST"), "RATE_LIMIT_BURST")?
                .map(u32::try_from)
                .transpose()
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST is too large"))?
                .unwrap_or(defaults.rate_limit_burst),
        })
    }

    pub fn holiday_api_timeout(&self) -> Duration {
        Duration::from_secs(self.holiday_api_timeout_secs)
    }
}

fn parse_positive(value: Option<String>, name: &str) -> anyhow::Result<Option<u64>> {
    value
        .map(|raw| match raw.trim().parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(anyhow::anyhow!("{} must be a positive integer", name)),
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.holiday_api_base_url, DEFAULT_HOLIDAY_API_BASE_URL);
        assert_eq!(config.holiday_api_timeout(), Duration::from_secs(10));
        assert_eq!(config.rate_limit_per_second, 10);
        assert_eq!(config.rate_limit_burst, 20);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "3000"),
            ("HOLIDAY_API_BASE_URL", "http://localhost:9000/info/"),
            ("HOLIDAY_API_TIMEOUT_SECS", "3"),
            ("RATE_LIMIT_PER_SECOND", "5"),
            ("RATE_LIMIT_BURST", "7"),
        ]))
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.holiday_api_base_url, "http://localhost:9000/info");
        assert_eq!(config.holiday_api_timeout_secs, 3);
        assert_eq!(config.rate_limit_per_second, 5);
        assert_eq!(config.rate_limit_burst, 7);
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup(&[("PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[("HOLIDAY_API_BASE_URL", "")])).is_err());
        assert!(Config::from_lookup(lookup(&[("HOLIDAY_API_BASE_URL", "ftp://x")])).is_err());
        assert!(Config::from_lookup(lookup(&[("HOLIDAY_API_TIMEOUT_SECS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("RATE_LIMIT_BURST", "-2")])).is_err());
    }
}
