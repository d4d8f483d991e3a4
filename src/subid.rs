//! Read-only access to /etc/subuid and /etc/subgid.
//!
//! Each line is `owner:start:count`.  The owner is a user name or a
//! numeric uid.  Lines are independent delegations; two adjacent
//! ranges on separate lines are never treated as one.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str;

use libc::uid_t;
use log::warn;

use crate::err::*;
use crate::ranges::MapKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubordinateRangeEntry {
    pub owner: String,
    pub start: u32,
    pub count: u32,
}

impl SubordinateRangeEntry {
    fn owned_by(&self, name: &str, uid: uid_t) -> bool {
        self.owner == name
            || self.owner.parse::<uid_t>().map_or(false, |n| n == uid)
    }

    /// Does this entry alone cover [start, start+count)?
    fn encloses(&self, start: u32, count: u32) -> bool {
        let (lo, hi) = (u64::from(start), u64::from(start) + u64::from(count));
        let self_hi = u64::from(self.start) + u64::from(self.count);
        lo >= u64::from(self.start) && hi <= self_hi
    }
}

/// Internal: parse one non-comment line.  None means malformed.
fn parse_entry(line: &str) -> Option<SubordinateRangeEntry> {
    let mut fields = line.split(':');
    let owner = fields.next()?;
    let start = fields.next()?;
    let count = fields.next()?;
    if fields.next().is_some() || owner.is_empty() {
        return None;
    }
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(start) || !digits(count) {
        return None;
    }
    let start = start.parse::<u32>().ok()?;
    let count = count.parse::<u32>().ok()?;
    if count == 0 || u64::from(start) + u64::from(count) > u64::from(u32::MAX) {
        return None;
    }
    Some(SubordinateRangeEntry { owner: owner.to_string(), start, count })
}

/// The loaded contents of one subordinate id store.
#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
    entries: Vec<SubordinateRangeEntry>,
}

impl Registry {
    /// Open the store that governs `kind`.
    pub fn open(kind: MapKind) -> Result<Registry, Error> {
        Registry::open_path(kind.registry_path())
    }

    pub fn open_path(path: &Path) -> Result<Registry, Error> {
        let file = File::open(path)
            .map_err(|e| map_config_err(e, format!("open {}", path.display())))?;
        Registry::load(path, BufReader::new(file))
    }

    /// Build a registry from anything line-oriented.  `path` is only
    /// used to label diagnostics.
    pub fn load<R: BufRead>(path: &Path, reader: R) -> Result<Registry, Error> {
        let mut entries = Vec::new();
        for (n, raw) in reader.split(b'\n').enumerate() {
            let raw = raw
                .map_err(|e| map_config_err(e, format!("read {}", path.display())))?;
            let line = match str::from_utf8(&raw) {
                Ok(line) => line.trim(),
                Err(_) => {
                    warn!("{}:{}: skipping entry with invalid UTF-8",
                          path.display(), n + 1);
                    continue;
                }
            };
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_entry(line) {
                Some(entry) => entries.push(entry),
                None => warn!("{}:{}: skipping malformed entry", path.display(), n + 1),
            }
        }
        Ok(Registry { path: path.to_path_buf(), entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[SubordinateRangeEntry] {
        &self.entries
    }

    /// True iff a single entry belonging to the user (by name or by
    /// numeric uid) encloses [start, start+count).
    pub fn contains(&self, name: &str, uid: uid_t, start: u32, count: u32) -> bool {
        count > 0 && self.entries.iter()
            .any(|e| e.owned_by(name, uid) && e.encloses(start, count))
    }

    pub fn close(self) {}
}
