//! Gateway configuration from environment variables

use anyhow::{ensure, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 18700;
pub const DEFAULT_DATA_PATH: &str = "data/countries.json";
pub const DEFAULT_UI_DIR: &str = "ui/dist";
pub const DEFAULT_GAME_TTL_SECS: u64 = 3600;
pub const DEFAULT_MAX_GAMES: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub ui_dir: PathBuf,
    /// Idle time after which a game is discarded
    pub game_ttl_secs: u64,
    /// Registry cap; the least recently active game is evicted past it
    pub max_games: usize,
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (env in production, a map in tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("COUNTRY_GUESS_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid port: {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        let data_path = lookup("COUNTRY_GUESS_DATA")
            .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string())
            .into();
        let ui_dir = lookup("COUNTRY_GUESS_UI")
            .unwrap_or_else(|| DEFAULT_UI_DIR.to_string())
            .into();

        let game_ttl_secs =
            parse_var(&lookup, "COUNTRY_GUESS_GAME_TTL_SECS", DEFAULT_GAME_TTL_SECS)?;
        ensure!(game_ttl_secs > 0, "COUNTRY_GUESS_GAME_TTL_SECS must be positive");
        let max_games = parse_var(&lookup, "COUNTRY_GUESS_MAX_GAMES", DEFAULT_MAX_GAMES)?;
        ensure!(max_games > 0, "COUNTRY_GUESS_MAX_GAMES must be positive");

        Ok(Self {
            port,
            data_path,
            ui_dir,
            game_ttl_secs,
            max_games,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<GatewayConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.bind_addr(), "0.0.0.0:18700");
        assert_eq!(config.game_ttl_secs, DEFAULT_GAME_TTL_SECS);
        assert_eq!(config.max_games, DEFAULT_MAX_GAMES);
    }

    #[test]
    fn test_port_precedence() {
        let config = config_from(&[("PORT", "9000"), ("COUNTRY_GUESS_PORT", "9100")]).unwrap();
        assert_eq!(config.port, 9100);

        let config = config_from(&[("PORT", "9000")]).unwrap();
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_invalid_port() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
    }

    #[test]
    fn test_paths() {
        let config = config_from(&[
            ("COUNTRY_GUESS_DATA", "/srv/countries.json"),
            ("COUNTRY_GUESS_UI", "/srv/ui"),
        ])
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/srv/countries.json"));
        assert_eq!(config.ui_dir, PathBuf::from("/srv/ui"));
    }

    #[test]
    fn test_game_limits() {
        let config = config_from(&[
            ("COUNTRY_GUESS_GAME_TTL_SECS", "600"),
            ("COUNTRY_GUESS_MAX_GAMES", "250"),
        ])
        .unwrap();
        assert_eq!(config.game_ttl_secs, 600);
        assert_eq!(config.max_games, 250);

        assert!(config_from(&[("COUNTRY_GUESS_GAME_TTL_SECS", "0")]).is_err());
        assert!(config_from(&[("COUNTRY_GUESS_MAX_GAMES", "0")]).is_err());
        assert!(config_from(&[("COUNTRY_GUESS_MAX_GAMES", "lots")]).is_err());
    }
}
