use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

fn prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^/?[A-Za-z0-9._~%\-]+(?:/[A-Za-z0-9._~%\-]*)*$|^/$")
            .expect("mount prefix pattern compiles")
    })
}

/// Path prefix the dashboard is served under, e.g. `/config` behind a gateway.
///
/// Always absolute and cleaned; `/` when the dashboard owns the whole host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MountPrefix(String);

impl MountPrefix {
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Accepts a raw header or config value. Returns `None` for anything that
    /// is not a plain path (schemes, query strings, whitespace).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || !prefix_pattern().is_match(raw) {
            return None;
        }
        Some(Self(clean_path(raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Resolves a dashboard-relative link under this prefix. Any `?query` or
    /// `#fragment` suffix is carried over untouched.
    pub fn join(&self, relative: &str) -> String {
        let split = relative.find(&['?', '#'][..]).unwrap_or(relative.len());
        let (path, suffix) = relative.split_at(split);
        let mut joined = clean_path(&format!("{}/{}", self.0, path));
        joined.push_str(suffix);
        joined
    }
}

impl Default for MountPrefix {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for MountPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lexically cleans a slash separated path: drops empty and `.` segments and
/// resolves `..` without climbing above the root.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}
