use crate::controller::CharLimits;
use crate::model::UserId;
use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_bind: String,
    pub local_user_id: UserId,
    pub demo_seed: bool,
    pub frame_interval: Duration,
    pub title_char_limit: usize,
    pub desc_char_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        Self {
            http_bind: var("HTTP_BIND", "0.0.0.0:8080"),
            local_user_id: var("LOCAL_USER_ID", "2").parse().unwrap_or(2),
            demo_seed: parse_flag(&var("DEMO_SEED", "true")).unwrap_or(true),
            frame_interval: Duration::from_millis(
                var("FRAME_INTERVAL_MS", "16").parse::<u64>().unwrap_or(16).max(1),
            ),
            title_char_limit: var("TITLE_CHAR_LIMIT", "128").parse().unwrap_or(128),
            desc_char_limit: var("DESC_CHAR_LIMIT", "1024").parse().unwrap_or(1024),
        }
    }

    pub fn char_limits(&self) -> CharLimits {
        CharLimits {
            title: self.title_char_limit,
            desc: self.desc_char_limit,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
