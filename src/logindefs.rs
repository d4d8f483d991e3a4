//! Minimal reader for /etc/login.defs.  We only need boolean flags.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, warn};

pub const LOGIN_DEFS: &str = "/etc/login.defs";

/// Lets the caller's real gid differ from their passwd entry's
/// primary gid (it may be one of their supplementary groups).
pub const GRANT_AUX_GROUP_SUBIDS: &str = "GRANT_AUX_GROUP_SUBIDS";

#[derive(Debug, Default)]
pub struct LoginDefs {
    values: HashMap<String, String>,
}

impl LoginDefs {
    /// Load the system file.  Never fails: an absent or unreadable
    /// file leaves every flag unset.
    pub fn load_default() -> LoginDefs {
        LoginDefs::load(Path::new(LOGIN_DEFS))
    }

    pub fn load(path: &Path) -> LoginDefs {
        match fs::read(path) {
            Ok(bytes) => LoginDefs::parse(&String::from_utf8_lossy(&bytes)),
            Err(ref e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} not present", path.display());
                LoginDefs::default()
            }
            Err(e) => {
                warn!("cannot read {}: {}", path.display(), e);
                LoginDefs::default()
            }
        }
    }

    pub fn parse(text: &str) -> LoginDefs {
        let mut values = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, |c: char| c.is_ascii_whitespace());
            let name = match parts.next() {
                Some(n) => n,
                None => continue,
            };
            let value = parts.next().unwrap_or("").trim();
            let value = value.strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            values.insert(name.to_string(), value.to_string());
        }
        LoginDefs { values }
    }

    pub fn getdef_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn getdef_bool(&self, name: &str) -> bool {
        self.getdef_str(name).map_or(false, |v| v.eq_ignore_ascii_case("yes"))
    }
}
