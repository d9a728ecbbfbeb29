use std::{collections::HashMap, fs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub fact_api_url: String,
    pub image_api_url: String,
    pub request_timeout_secs: u64,
    pub refresh_interval_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fact_api_url: "https://catfact.ninja".into(),
            image_api_url: "https://api.thecatapi.com".into(),
            request_timeout_secs: 10,
            refresh_interval_secs: None,
        }
    }
}

/// Defaults, overridden by a flat `viewer.toml` next to the binary, then by
/// environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, "viewer.toml");
    apply_env(&mut settings);
    settings
}

fn apply_file(settings: &mut Settings, path: &str) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) else {
        return;
    };
    if let Some(v) = file_cfg.get("fact_api_url") {
        settings.fact_api_url = v.clone();
    }
    if let Some(v) = file_cfg.get("image_api_url") {
        settings.image_api_url = v.clone();
    }
    if let Some(v) = file_cfg.get("request_timeout_secs") {
        if let Ok(parsed) = v.parse() {
            settings.request_timeout_secs = parsed;
        }
    }
    if let Some(v) = file_cfg.get("refresh_interval_secs") {
        if let Ok(parsed) = v.parse() {
            settings.refresh_interval_secs = Some(parsed);
        }
    }
}

fn apply_env(settings: &mut Settings) {
    if let Ok(v) = std::env::var("FACT_API_URL") {
        settings.fact_api_url = v;
    }
    if let Ok(v) = std::env::var("APP__FACT_API_URL") {
        settings.fact_api_url = v;
    }

    if let Ok(v) = std::env::var("IMAGE_API_URL") {
        settings.image_api_url = v;
    }
    if let Ok(v) = std::env::var("APP__IMAGE_API_URL") {
        settings.image_api_url = v;
    }

    if let Ok(v) = std::env::var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse() {
            settings.request_timeout_secs = parsed;
        }
    }
    if let Ok(v) = std::env::var("APP__REFRESH_INTERVAL_SECS") {
        if let Ok(parsed) = v.parse() {
            settings.refresh_interval_secs = Some(parsed);
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
