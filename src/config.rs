use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::str::FromStr;

use crate::arena::ArenaTemplate;
use crate::error::{Result, SchedulerError};

const DEFAULT_SERVER: &str = "https://lichess.org";
const DEFAULT_ARENA_NAME: &str = "Hourly Ultrabullet";
const DEFAULT_VARIANT: &str = "standard";

/// Raw key=value settings from an optional config file, with environment
/// variables taking precedence on lookup. Lines may carry `#` comments, an
/// `export ` prefix, and single or double quotes around the value.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SchedulerError::Config(format!("cannot read {path}: {e}")))?;
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(SchedulerError::Config(format!(
                    "invalid config line {}: {}",
                    idx + 1,
                    line
                )));
            };
            let key = key.trim();
            let mut value = value.trim();
            if (value.starts_with('"') && value.ends_with('"') && value.len() >= 2)
                || (value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2)
            {
                value = &value[1..value.len() - 1];
            }
            values.insert(key.to_string(), value.to_string());
        }
        Ok(Self { values })
    }

    /// Environment variables win over file entries.
    pub fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.values.get(key).cloned())
    }

    fn get_parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| SchedulerError::Config(format!("{key} has invalid value: {raw}"))),
            None => Ok(default),
        }
    }
}

/// Immutable per-run schedule settings, resolved once at startup and passed
/// by parameter. Nothing reads configuration ambiently after this point.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub server: String,
    pub team_id: String,
    pub interval_hours: u32,
    pub days_in_advance: u32,
    pub dry_run: bool,
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.team_id.trim().is_empty() {
            return Err(SchedulerError::Config("TEAM_ID is not set".to_string()));
        }
        if self.interval_hours == 0 || self.interval_hours > 24 {
            return Err(SchedulerError::Config(format!(
                "INTERVAL_HOURS must be between 1 and 24, got {}",
                self.interval_hours
            )));
        }
        Ok(())
    }

    /// Arenas per day times days ahead.
    pub fn total_slots(&self) -> u32 {
        (24 / self.interval_hours) * self.days_in_advance
    }
}

/// Bearer token for the tournament-creation endpoint. Trimmed and non-empty
/// by construction; `Debug` reveals only the length.
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn new(raw: &str) -> Result<Self> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(SchedulerError::Config("OAUTH_TOKEN is not set".to_string()));
        }
        Ok(Self {
            token: token.to_string(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token_len", &self.token.len())
            .finish()
    }
}

/// Resolve the typed run settings from raw config. Fails fast on a missing
/// token or team id so no slot is ever attempted with bad credentials.
pub fn resolve(app: &AppConfig) -> Result<(ScheduleConfig, ArenaTemplate, Credentials)> {
    let credentials = Credentials::new(&app.get("OAUTH_TOKEN").unwrap_or_default())?;

    let config = ScheduleConfig {
        server: app
            .get("SERVER")
            .unwrap_or_else(|| DEFAULT_SERVER.to_string())
            .trim_end_matches('/')
            .to_string(),
        team_id: app.get("TEAM_ID").unwrap_or_default().trim().to_string(),
        interval_hours: app.get_parsed("INTERVAL_HOURS", 1)?,
        days_in_advance: app.get_parsed("DAYS_IN_ADVANCE", 1)?,
        dry_run: app.get_parsed("DRY_RUN", false)?,
    };
    config.validate()?;

    let template = ArenaTemplate {
        name: app
            .get("ARENA_NAME")
            .unwrap_or_else(|| DEFAULT_ARENA_NAME.to_string()),
        clock_time: app.get_parsed("CLOCK_TIME", 0.25)?,
        clock_increment: app.get_parsed("CLOCK_INCREMENT", 0.0)?,
        minutes: app.get_parsed("MINUTES", 60)?,
        rated: app.get_parsed("RATED", true)?,
        variant: app
            .get("VARIANT")
            .unwrap_or_else(|| DEFAULT_VARIANT.to_string()),
    };
    template.validate()?;

    Ok((config, template, credentials))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(entries: &[(&str, &str)]) -> AppConfig {
        AppConfig {
            values: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn missing_token_is_fatal() {
        let result = resolve(&app(&[("TEAM_ID", "my-team")]));
        assert!(matches!(result, Err(SchedulerError::Config(_))));
    }

    #[test]
    fn whitespace_token_is_fatal() {
        assert!(Credentials::new("   ").is_err());
    }

    #[test]
    fn missing_team_id_is_fatal() {
        let result = resolve(&app(&[("OAUTH_TOKEN", "tok")]));
        assert!(matches!(result, Err(SchedulerError::Config(_))));
    }

    #[test]
    fn token_is_trimmed_and_redacted() {
        let creds = Credentials::new("  abc123  ").unwrap();
        assert_eq!(creds.token(), "abc123");
        assert!(!format!("{creds:?}").contains("abc123"));
    }

    #[test]
    fn defaults_fill_unset_keys() {
        let (config, template, _) =
            resolve(&app(&[("OAUTH_TOKEN", "tok"), ("TEAM_ID", "my-team")])).unwrap();
        assert_eq!(config.server, "https://lichess.org");
        assert_eq!(config.interval_hours, 1);
        assert_eq!(config.days_in_advance, 1);
        assert!(!config.dry_run);
        assert_eq!(config.total_slots(), 24);
        assert_eq!(template.name, "Hourly Ultrabullet");
        assert_eq!(template.minutes, 60);
        assert!(template.rated);
    }

    #[test]
    fn interval_out_of_range_is_rejected() {
        let result = resolve(&app(&[
            ("OAUTH_TOKEN", "tok"),
            ("TEAM_ID", "my-team"),
            ("INTERVAL_HOURS", "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn total_slots_follows_interval() {
        let config = ScheduleConfig {
            server: String::new(),
            team_id: "t".to_string(),
            interval_hours: 3,
            days_in_advance: 2,
            dry_run: false,
        };
        assert_eq!(config.total_slots(), 16);
    }

    #[test]
    fn config_file_parsing_handles_quotes_and_comments() {
        let dir = std::env::temp_dir().join("arena_scheduler_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("run.conf");
        std::fs::write(
            &path,
            "# scheduler settings\nexport TEAM_ID=\"my-team\"\nARENA_NAME='Nightly Blitz'\n\nMINUTES=90\n",
        )
        .unwrap();

        let app = AppConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(app.get("TEAM_ID").as_deref(), Some("my-team"));
        assert_eq!(app.get("ARENA_NAME").as_deref(), Some("Nightly Blitz"));
        assert_eq!(app.get("MINUTES").as_deref(), Some("90"));
        assert_eq!(app.get("RATED"), None);
    }
}
