//! Error type and helper functions.

use std::io;

use libc::{gid_t, pid_t, uid_t};
use thiserror::Error;

use crate::ranges::{MapKind, MapRange};

/// Coarse classification of everything that can go wrong.  The
/// top-level handler only cares about this, never about the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Argument,
    Lookup,
    Identity,
    Permission,
    Configuration,
    Syscall,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{detail}")]
    Usage { detail: String },

    #[error("{detail}: {cause}")]
    Lookup { cause: io::Error, detail: String },

    #[error("Cannot determine your user name (uid {uid})")]
    Identity { uid: uid_t, cause: Option<nix::Error> },

    #[error("Target {pid} is owned by a different user: \
             uid:{uid} pw_uid:{pw_uid} st_uid:{st_uid}, \
             gid:{gid} pw_gid:{pw_gid} st_gid:{st_gid}")]
    TargetOwner {
        pid: pid_t,
        uid: uid_t, pw_uid: uid_t, st_uid: uid_t,
        gid: gid_t, pw_gid: gid_t, st_gid: gid_t,
    },

    #[error("{kind} range [{}-{}) -> [{}-{}) not allowed",
            .range.ns_id, .range.ns_end(), .range.host_id, .range.host_end())]
    RangeNotAllowed { kind: MapKind, range: MapRange },

    #[error("{detail}: {cause}")]
    Configuration { cause: io::Error, detail: String },

    #[error("{detail}: {cause}")]
    Syscall { cause: io::Error, detail: String },
}

impl Error {
    pub fn category(&self) -> Category {
        match *self {
            Error::Usage           { .. } => Category::Argument,
            Error::Lookup          { .. } => Category::Lookup,
            Error::Identity        { .. } => Category::Identity,
            Error::TargetOwner     { .. } => Category::Permission,
            Error::RangeNotAllowed { .. } => Category::Permission,
            Error::Configuration   { .. } => Category::Configuration,
            Error::Syscall         { .. } => Category::Syscall,
        }
    }

    /// Every failure exits the same way; the diagnostic is what
    /// distinguishes them.
    pub fn exit_code(&self) -> i32 {
        libc::EXIT_FAILURE
    }

    pub fn is_usage(&self) -> bool {
        self.category() == Category::Argument
    }
}

pub fn usage_err<S: Into<String>>(detail: S) -> Error {
    Error::Usage { detail: detail.into() }
}
pub fn map_lookup_err(cause: io::Error, detail: String) -> Error {
    Error::Lookup { cause, detail }
}
pub fn map_config_err(cause: io::Error, detail: String) -> Error {
    Error::Configuration { cause, detail }
}
pub fn map_io_err(cause: io::Error, detail: String) -> Error {
    Error::Syscall { cause, detail }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_message_names_both_intervals() {
        let e = Error::RangeNotAllowed {
            kind: MapKind::Gid,
            range: MapRange { ns_id: 0, host_id: 2000, count: 2 },
        };
        assert_eq!(e.to_string(), "gid range [0-2) -> [2000-2002) not allowed");
        assert_eq!(e.category(), Category::Permission);
    }

    #[test]
    fn owner_message_carries_all_ids() {
        let e = Error::TargetOwner {
            pid: 42,
            uid: 1000, pw_uid: 1000, st_uid: 0,
            gid: 1000, pw_gid: 1000, st_gid: 0,
        };
        assert_eq!(e.to_string(),
                   "Target 42 is owned by a different user: \
                    uid:1000 pw_uid:1000 st_uid:0, \
                    gid:1000 pw_gid:1000 st_gid:0");
    }

    #[test]
    fn only_usage_errors_print_usage() {
        assert!(usage_err("bad").is_usage());
        let e = map_io_err(io::Error::from_raw_os_error(libc::EPERM),
                           String::from("write to gid_map"));
        assert!(!e.is_usage());
        assert_eq!(e.category(), Category::Syscall);
        assert_ne!(e.exit_code(), 0);
    }
}
