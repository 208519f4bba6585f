use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::ScheduleConfig;

/// Stands in for the previous arena's URL until the first creation succeeds.
pub const PLACEHOLDER_LINK: &str = "tba";

/// Fixed shape of every arena in the schedule. Immutable for a run; only the
/// start time and the chained link vary between slots.
#[derive(Debug, Clone)]
pub struct ArenaTemplate {
    pub name: String,
    pub clock_time: f64,
    pub clock_increment: f64,
    pub minutes: u32,
    pub rated: bool,
    pub variant: String,
}

impl ArenaTemplate {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.clock_time < 0.0 || self.clock_increment < 0.0 {
            return Err(crate::error::SchedulerError::Config(
                "clock settings must not be negative".to_string(),
            ));
        }
        if self.minutes == 0 {
            return Err(crate::error::SchedulerError::Config(
                "MINUTES must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Description pointing players at the previously created arena.
    pub fn description(&self, previous_link: Option<&str>) -> String {
        format!("Next: {}", previous_link.unwrap_or(PLACEHOLDER_LINK))
    }

    /// Build the ordered form fields for one creation request. Pure; the
    /// start date serializes as ISO-8601 UTC with millisecond precision.
    pub fn build_payload(
        &self,
        config: &ScheduleConfig,
        start_time: DateTime<Utc>,
        previous_link: Option<&str>,
    ) -> ArenaPayload {
        ArenaPayload {
            fields: vec![
                ("name", self.name.clone()),
                ("description", self.description(previous_link)),
                ("clockTime", self.clock_time.to_string()),
                ("clockIncrement", self.clock_increment.to_string()),
                ("minutes", self.minutes.to_string()),
                ("rated", if self.rated { "true" } else { "false" }.to_string()),
                ("variant", self.variant.clone()),
                ("teamId", config.team_id.clone()),
                ("teamTournament", "true".to_string()),
                (
                    "startDate",
                    start_time.to_rfc3339_opts(SecondsFormat::Millis, true),
                ),
            ],
        }
    }
}

/// Ordered field name/value pairs for the form-encoded creation request.
#[derive(Debug, Clone)]
pub struct ArenaPayload {
    fields: Vec<(&'static str, String)>,
}

impl ArenaPayload {
    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ArenaPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.fields {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}
