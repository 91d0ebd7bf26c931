use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::filter::FilterType;

pub const PAGE_SIZE: usize = 16;

pub const SCROLL_TIMEOUT: Duration = Duration::from_millis(100);

pub const DEFAULT_FILTER: FilterType = FilterType::All;

pub const ACTIVE_FILTER_CLASSNAME: &str = "host-filter-active";

pub const FILTER_CLASSNAME: &str = "host-filter";

pub const HOSTS_LOAD_URL: &str = "data/hosts.json";

pub const LOAD_TIMEOUT_SECS: u64 = 10;

/// Rendering settings, fixed once a controller is built from them.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub page_size: usize,
    pub scroll_timeout: Duration,
    pub default_filter: FilterType,
    pub active_filter_class: String,
    pub filter_class: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            scroll_timeout: SCROLL_TIMEOUT,
            default_filter: DEFAULT_FILTER,
            active_filter_class: ACTIVE_FILTER_CLASSNAME.to_string(),
            filter_class: FILTER_CLASSNAME.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    pub source: Option<String>,
    pub events: Option<String>,
    pub timeout: Option<u64>,
    pub page_size: Option<usize>,
    #[serde(alias = "scroll_timeout_ms")]
    pub scroll_timeout: Option<u64>,
    pub default_filter: Option<String>,
    pub viewport_height: Option<f64>,
    pub row_height: Option<f64>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub log_format: Option<String>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".hostlist").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, String> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents).map_err(|e| e.to_string())
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    format!(
        r#"# hostlist config
#
# Location (default):
#   ~/.hostlist/config.yml

# Data source: http(s) URL, file:// URL or a local path
source: {HOSTS_LOAD_URL}
# Seconds before an HTTP load is abandoned
timeout: {LOAD_TIMEOUT_SECS}

# Event script (optional, stdin is read otherwise)
# events: ./events.txt

# Rendering
page_size: {PAGE_SIZE}
scroll_timeout: {scroll_ms}
default_filter: {default_filter}

# Simulated viewport, in pixels
viewport_height: 600
row_height: 50

# Output (optional)
# output: ./hosts.html
# output_format: html

# Logging: compact, pretty or json
log_format: compact
no_color: false
"#,
        scroll_ms = SCROLL_TIMEOUT.as_millis(),
        default_filter = DEFAULT_FILTER.id(),
    )
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(())
}
