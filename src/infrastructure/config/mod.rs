//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::application::errors::ConfigError;
use crate::application::services::DEFAULT_CONTROL_NAME;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub connection: ConnectionConfig,
    pub commands: CommandsConfig,
    pub rate_limit: RateLimitConfig,
    pub roster: RosterConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub username: String,
    pub channel: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CommandsConfig {
    pub store_path: PathBuf,
    pub control_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RateLimitConfig {
    pub window_seconds: u64,
    pub max_rate: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RosterConfig {
    pub refresh_seconds: u64,
    /// Chatters endpoint, `{channel}` is substituted
    pub url: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "irc.chat.twitch.tv".to_string(),
            port: 6667,
            password: None,
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(".dynamic_commands.json"),
            control_name: DEFAULT_CONTROL_NAME.to_string(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_seconds: 30,
            max_rate: 0.66,
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            refresh_seconds: 10,
            url: "http://tmi.twitch.tv/group/user/{channel}/chatters".to_string(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

impl RosterConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_seconds)
    }

    pub fn url_for(&self, channel: &str) -> String {
        self.url.replace("{channel}", channel)
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment variables take precedence over the file
    pub fn apply_env(&mut self) {
        if let Ok(username) = std::env::var("BOT_USERNAME") {
            self.bot.username = username;
        }

        if let Ok(password) = std::env::var("BOT_PASSWORD") {
            self.connection.password = Some(password);
        }

        if let Ok(channel) = std::env::var("BOT_CHANNEL") {
            self.bot.channel = channel;
        }
    }

    /// Check what a live session needs
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.username.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.username".to_string()));
        }
        if self.bot.channel.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.channel".to_string()));
        }
        if self.bot.channel.starts_with('#') {
            return Err(ConfigError::InvalidValue("bot.channel must not start with '#'".to_string()));
        }
        if self.commands.control_name.trim().is_empty() {
            return Err(ConfigError::MissingField("commands.control-name".to_string()));
        }
        if self.rate_limit.max_rate.is_nan() || self.rate_limit.max_rate <= 0.0 {
            return Err(ConfigError::InvalidValue("rate-limit.max-rate must be positive".to_string()));
        }
        if self.rate_limit.window_seconds == 0 {
            return Err(ConfigError::InvalidValue("rate-limit.window-seconds must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.connection.port, 6667);
        assert_eq!(config.rate_limit.window(), Duration::from_secs(30));
        assert_eq!(config.rate_limit.max_rate, 0.66);
        assert_eq!(config.roster.refresh_interval(), Duration::from_secs(10));
        assert_eq!(config.commands.control_name, "bcbcommand");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("bot:\n  username: bcbbot\n  channel: somechannel\nrate-limit:\n  max-rate: 1.5\n").unwrap();
        assert_eq!(config.bot.username, "bcbbot");
        assert_eq!(config.rate_limit.max_rate, 1.5);
        assert_eq!(config.rate_limit.window_seconds, 30);
        assert_eq!(config.connection.host, "irc.chat.twitch.tv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(Config::from_yaml("bot: [unclosed"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_requires_channel() {
        let mut config = Config::default();
        config.bot.username = "bcbbot".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(f)) if f == "bot.channel"));

        config.bot.channel = "#chan".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_roster_url() {
        let config = Config::default();
        assert_eq!(config.roster.url_for("abc"), "http://tmi.twitch.tv/group/user/abc/chatters");
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(yaml.contains("store-path"));
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.roster.url, Config::default().roster.url);
    }
}
