//! Command-line triplets and the things they select.

use std::fmt;
use std::path::Path;

use libc::pid_t;

use crate::err::*;

/// Which of the two id spaces an invocation is mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    Uid,
    Gid,
}

impl MapKind {
    /// The administrator-maintained delegation store for this kind.
    pub fn registry_path(self) -> &'static Path {
        match self {
            MapKind::Uid => Path::new("/etc/subuid"),
            MapKind::Gid => Path::new("/etc/subgid"),
        }
    }

    /// Name of the kernel map file under /proc/<pid>/.
    pub fn map_file(self) -> &'static str {
        match self {
            MapKind::Uid => "uid_map",
            MapKind::Gid => "gid_map",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MapKind::Uid => "uid",
            MapKind::Gid => "gid",
        }
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of a uid_map or gid_map: `count` ids starting at `ns_id`
/// inside the namespace correspond to `count` ids starting at
/// `host_id` outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRange {
    pub ns_id:   u32,
    pub host_id: u32,
    pub count:   u32,
}

impl MapRange {
    pub fn ns_end(&self) -> u64 {
        u64::from(self.ns_id) + u64::from(self.count)
    }
    pub fn host_end(&self) -> u64 {
        u64::from(self.host_id) + u64::from(self.count)
    }
}

impl fmt::Display for MapRange {
    /// The kernel's line format, without the newline.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.ns_id, self.host_id, self.count)
    }
}

/// Internal: strtoul would take a sign, whitespace, and a hex prefix.
/// We take none of those.
fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_id(field: &str, what: &str) -> Result<u32, Error> {
    if !all_digits(field) {
        return Err(usage_err(format!("invalid {} '{}'", what, field)));
    }
    field.parse::<u32>()
        .map_err(|e| usage_err(format!("invalid {} '{}': {}", what, field, e)))
}

/// Parse the target process id.  Must be a positive decimal number.
pub fn parse_pid(arg: &str) -> Result<pid_t, Error> {
    if !all_digits(arg) {
        return Err(usage_err(format!("invalid pid '{}'", arg)));
    }
    match arg.parse::<pid_t>() {
        Ok(pid) if pid > 0 => Ok(pid),
        Ok(_) => Err(usage_err(format!("invalid pid '{}'", arg))),
        Err(e) => Err(usage_err(format!("invalid pid '{}': {}", arg, e))),
    }
}

/// Turn the trailing arguments `<ns_id> <host_id> <count> ...` into
/// ranges, in the order given.
pub fn parse_map_ranges<S: AsRef<str>>(args: &[S]) -> Result<Vec<MapRange>, Error> {
    if args.is_empty() || args.len() % 3 != 0 {
        return Err(usage_err(format!(
            "expected a non-zero multiple of three range arguments, got {}",
            args.len())));
    }

    args.chunks_exact(3).map(|triplet| {
        let range = MapRange {
            ns_id:   parse_id(triplet[0].as_ref(), "namespace id")?,
            host_id: parse_id(triplet[1].as_ref(), "host id")?,
            count:   parse_id(triplet[2].as_ref(), "count")?,
        };
        if range.count == 0 {
            return Err(usage_err(format!("empty range at namespace id {}",
                                         range.ns_id)));
        }
        // u32::MAX itself is (id_t)-1, never a valid id.
        let limit = u64::from(u32::MAX);
        if range.ns_end() > limit || range.host_end() > limit {
            return Err(usage_err(format!("range '{}' overflows the id space",
                                         range)));
        }
        Ok(range)
    }).collect()
}
