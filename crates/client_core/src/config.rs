use std::{
    collections::HashMap,
    fs,
    path::Path,
    time::Duration,
};

use anyhow::{anyhow, Context};
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "cinescout.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Add (POST) and remove (DELETE) share this path.
    pub list_item: String,
    pub catalog: String,
    /// The film title is appended as a final path segment.
    pub review: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            list_item: "/api/user-movie-list/item".into(),
            catalog: "/api/criterion-films".into(),
            review: "/api/nyt-movie-review".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub csrf_token: Option<String>,
    pub request_timeout: Duration,
    pub table_spinner_delay: Duration,
    pub link_spinner_delay: Duration,
    pub endpoints: Endpoints,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".into(),
            csrf_token: None,
            request_timeout: Duration::from_secs(10),
            table_spinner_delay: Duration::from_millis(800),
            link_spinner_delay: Duration::from_secs(10),
            endpoints: Endpoints::default(),
        }
    }
}

impl Settings {
    pub fn parsed_base_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(self.base_url.trim())
            .with_context(|| format!("invalid base url '{}'", self.base_url))?;
        if url.cannot_be_a_base() {
            return Err(anyhow!("base url '{}' cannot hold paths", self.base_url));
        }
        Ok(url)
    }
}

/// Defaults, then `cinescout.toml` (or `path`), then environment overrides.
///
/// A missing default file is ignored; an explicit `path` must exist.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                if let Err(err) = apply_file(&mut settings, &raw) {
                    tracing::warn!(error = %err, file = DEFAULT_CONFIG_FILE, "ignoring unreadable config file");
                }
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub(crate) fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)?;
    let get = |key: &str| -> Option<String> {
        file_cfg.get(key).map(|v| match v {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    };

    if let Some(v) = get("base_url") {
        settings.base_url = v;
    }
    if let Some(v) = get("csrf_token") {
        settings.csrf_token = Some(v);
    }
    if let Some(v) = get("request_timeout_ms").and_then(|v| parse_millis(&v)) {
        settings.request_timeout = v;
    }
    if let Some(v) = get("table_spinner_delay_ms").and_then(|v| parse_millis(&v)) {
        settings.table_spinner_delay = v;
    }
    if let Some(v) = get("link_spinner_delay_ms").and_then(|v| parse_millis(&v)) {
        settings.link_spinner_delay = v;
    }
    if let Some(v) = get("list_item_path") {
        settings.endpoints.list_item = v;
    }
    if let Some(v) = get("catalog_path") {
        settings.endpoints.catalog = v;
    }
    if let Some(v) = get("review_path") {
        settings.endpoints.review = v;
    }

    Ok(())
}

/// Each setting accepts `CINESCOUT_*` and the later-winning `APP__*` alias.
pub(crate) fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let var = |suffix: &str| {
        lookup(&format!("APP__{suffix}")).or_else(|| lookup(&format!("CINESCOUT_{suffix}")))
    };

    if let Some(v) = var("BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = var("CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }
    if let Some(v) = var("REQUEST_TIMEOUT_MS").and_then(|v| parse_millis(&v)) {
        settings.request_timeout = v;
    }
    if let Some(v) = var("TABLE_SPINNER_DELAY_MS").and_then(|v| parse_millis(&v)) {
        settings.table_spinner_delay = v;
    }
    if let Some(v) = var("LINK_SPINNER_DELAY_MS").and_then(|v| parse_millis(&v)) {
        settings.link_spinner_delay = v;
    }
}

fn parse_millis(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_millis)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
