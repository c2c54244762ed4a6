use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

/// Constants driving the rating calculation
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSettings {
    /// Rating substituted for players whose stored rating is still 0
    pub default_rating: i32,
    pub match_weight: f64,
    pub rating_divisor: f64,
    /// Divisor applied to the change of a protected player
    pub protection_divisor: f64,
    /// Players stay provisional until they have played this many games
    pub provisional_games: u32,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            default_rating: 1500,
            match_weight: 50.0,
            rating_divisor: 400.0,
            protection_divisor: 2.0,
            provisional_games: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageSettings {
    pub database_path: String,
    /// Number of matches fetched per page while replaying a league's history
    pub history_page_size: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: "game_ladder.db".to_string(),
            history_page_size: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    /// Matches listed under the leaderboard
    pub recent_matches: usize,
    /// When set, rebuild requests must carry `Authorization: Bearer <token>`
    pub admin_token: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            recent_matches: 20,
            admin_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub storage: StorageSettings,
    pub server: ServerSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            rating: RatingSettings::default(),
            storage: StorageSettings::default(),
            server: ServerSettings::default(),
        }
    }

    /// Defaults overridden by `LADDER_*` and `DATABASE_PATH` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        override_with(&lookup, "LADDER_DEFAULT_RATING", &mut config.rating.default_rating)?;
        override_with(&lookup, "LADDER_MATCH_WEIGHT", &mut config.rating.match_weight)?;
        override_with(&lookup, "LADDER_RATING_DIVISOR", &mut config.rating.rating_divisor)?;
        override_with(
            &lookup,
            "LADDER_PROTECTION_DIVISOR",
            &mut config.rating.protection_divisor,
        )?;
        override_with(
            &lookup,
            "LADDER_PROVISIONAL_GAMES",
            &mut config.rating.provisional_games,
        )?;
        override_with(
            &lookup,
            "LADDER_HISTORY_PAGE_SIZE",
            &mut config.storage.history_page_size,
        )?;
        override_with(&lookup, "LADDER_RECENT_MATCHES", &mut config.server.recent_matches)?;

        if let Some(path) = lookup("DATABASE_PATH") {
            config.storage.database_path = path;
        }
        config.server.admin_token = lookup("LADDER_ADMIN_TOKEN").filter(|t| !t.is_empty());

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.rating.rating_divisor <= 0.0 {
            bail!("Rating divisor must be positive, got {}", self.rating.rating_divisor);
        }
        if self.rating.protection_divisor <= 0.0 {
            bail!(
                "Protection divisor must be positive, got {}",
                self.rating.protection_divisor
            );
        }
        if self.storage.history_page_size == 0 {
            bail!("History page size must be at least 1");
        }
        Ok(())
    }
}

fn override_with<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid value for {key}: {raw:?}"))?;
    }
    Ok(())
}
