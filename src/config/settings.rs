use crate::error::{MoonslaError, Result};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Settings {
    pub slack: SlackConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Web API token used for the directory listings
    pub token: String,
    /// App-level token used to open the Socket Mode stream
    pub app_token: String,
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
    pub hyperlinks: bool,
    pub max_lines: usize,
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for OutputFormat {
    type Err = MoonslaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" => Ok(OutputFormat::Pretty),
            "json" => Ok(OutputFormat::Json),
            other => Err(MoonslaError::Config(format!(
                "Invalid MOONSLA_OUTPUT: {other} (expected pretty or json)"
            ))),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            whitelist: split_list(""),
            blacklist: split_list(""),
            hyperlinks: true,
            max_lines: DEFAULT_MAX_LINES,
            output: OutputFormat::Pretty,
        }
    }
}

pub const DEFAULT_MAX_LINES: usize = 3;

/// Split a comma-separated channel list.
///
/// Only the whole value is trimmed, so an unset or blank value yields `[""]`,
/// the "no restriction" sentinel.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.trim().split(',').map(str::to_string).collect()
}

pub fn load_settings() -> Result<Settings> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    settings_from_lookup(|key| std::env::var(key).ok())
}

/// Build settings from an arbitrary key lookup
pub fn settings_from_lookup<F>(lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    // Load Slack config
    let slack = SlackConfig {
        token: lookup("SLACK_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| MoonslaError::Config("SLACK_TOKEN not set".to_string()))?,
        app_token: lookup("SLACK_APP_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| MoonslaError::Config("SLACK_APP_TOKEN not set".to_string()))?,
    };

    // Load feed config
    let feed = FeedConfig {
        whitelist: split_list(&lookup("SLACK_CHANNELS").unwrap_or_default()),
        blacklist: split_list(&lookup("SLACK_BLACKLIST_CHANNELS").unwrap_or_default()),
        hyperlinks: lookup("MOONSLA_NO_HYPERLINKS")
            .map(|v| v.is_empty())
            .unwrap_or(true),
        max_lines: lookup("MOONSLA_MAX_LINES")
            .unwrap_or_else(|| DEFAULT_MAX_LINES.to_string())
            .parse()
            .map_err(|_| MoonslaError::Config("Invalid MOONSLA_MAX_LINES".to_string()))?,
        output: lookup("MOONSLA_OUTPUT").unwrap_or_default().parse()?,
    };

    Ok(Settings { slack, feed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_settings_use_defaults() {
        let settings = settings_from_lookup(lookup_from(&[
            ("SLACK_TOKEN", "xoxp-test"),
            ("SLACK_APP_TOKEN", "xapp-test"),
        ]))
        .unwrap();

        assert_eq!(settings.slack.token, "xoxp-test");
        assert_eq!(settings.slack.app_token, "xapp-test");
        assert_eq!(settings.feed.whitelist, vec![String::new()]);
        assert_eq!(settings.feed.blacklist, vec![String::new()]);
        assert!(settings.feed.hyperlinks);
        assert_eq!(settings.feed.max_lines, 3);
        assert_eq!(settings.feed.output, OutputFormat::Pretty);
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let err = settings_from_lookup(lookup_from(&[("SLACK_APP_TOKEN", "xapp-test")]))
            .unwrap_err();
        assert!(matches!(err, MoonslaError::Config(_)));
    }

    #[test]
    fn test_channel_lists_and_toggles() {
        let settings = settings_from_lookup(lookup_from(&[
            ("SLACK_TOKEN", "xoxp-test"),
            ("SLACK_APP_TOKEN", "xapp-test"),
            ("SLACK_CHANNELS", " general,random \n"),
            ("SLACK_BLACKLIST_CHANNELS", "spam"),
            ("MOONSLA_NO_HYPERLINKS", "true"),
            ("MOONSLA_MAX_LINES", "5"),
            ("MOONSLA_OUTPUT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(settings.feed.whitelist, vec!["general", "random"]);
        assert_eq!(settings.feed.blacklist, vec!["spam"]);
        assert!(!settings.feed.hyperlinks);
        assert_eq!(settings.feed.max_lines, 5);
        assert_eq!(settings.feed.output, OutputFormat::Json);
    }

    #[test]
    fn test_split_list_keeps_inner_whitespace() {
        assert_eq!(split_list("a, b"), vec!["a", " b"]);
        assert_eq!(split_list("   "), vec![""]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = [("SLACK_TOKEN", "x"), ("SLACK_APP_TOKEN", "y")];

        let mut pairs = base.to_vec();
        pairs.push(("MOONSLA_MAX_LINES", "three"));
        assert!(settings_from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = base.to_vec();
        pairs.push(("MOONSLA_OUTPUT", "xml"));
        assert!(settings_from_lookup(lookup_from(&pairs)).is_err());
    }
}
