use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    pub listen: Option<String>,
    pub workers: Option<usize>,
    pub rpc_address: Option<String>,
    pub rpc_service: Option<String>,
    #[serde(alias = "timeout")]
    pub rpc_timeout: Option<u64>,
    #[serde(alias = "template_dir")]
    pub templates: Option<String>,
    pub layout: Option<String>,
    pub reload_templates: Option<bool>,
    pub mount_header: Option<String>,
    pub base_path: Option<String>,
    pub log_filter: Option<String>,
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
    Some(home_dir()?.join(".configweb").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn parse_config(contents: &str, origin: &Path) -> Result<ConfigFile, String> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
        .map_err(|e| format!("failed to parse config '{}': {e}", origin.display()))
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents, path),
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
    r#"# configweb config
#
# Location (default):
#   ~/.configweb/config.yml
#
# Command-line flags override anything set here.

# Server
listen: "0.0.0.0:8082"
workers: 4

# Reverse proxy support. The dashboard builds its links under the prefix
# announced in this header, or under base_path when the header is missing.
mount_header: X-Forwarded-Prefix
base_path: /

# Config service, reached through the micro API gateway
rpc_address: http://127.0.0.1:8080
rpc_service: go.micro.srv.config
rpc_timeout: 10

# Templates
templates: ./templates
layout: layout
# Re-read templates from disk on every request.
reload_templates: true

# Logging (RUST_LOG takes precedence)
# log_filter: configweb=debug,tower_http=info

# Output styling
no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
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
    Ok(true)
}
