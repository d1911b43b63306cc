use anyhow::{Context, Result, bail};
use platform_db::StoreSettings;
use products_recognition::LEADERBOARD_SIZE;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cors_allowed_origins: Vec<String>,
    pub leaderboard_size: usize,
    pub store: StoreSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.store = StoreSettings::from_env();
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let leaderboard_size = match lookup("LEADERBOARD_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("invalid LEADERBOARD_SIZE {raw:?}"))?,
            None => LEADERBOARD_SIZE,
        };
        if leaderboard_size == 0 {
            bail!("LEADERBOARD_SIZE must be at least 1");
        }

        Ok(Self {
            cors_allowed_origins,
            leaderboard_size,
            store: StoreSettings::default(),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: Vec::new(),
            leaderboard_size: LEADERBOARD_SIZE,
            store: StoreSettings::default(),
        }
    }
}
