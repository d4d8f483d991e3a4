//! Shared code for newuidmap and newgidmap.
//!
//! Both programs take a target pid and a list of
//! `<ns_id> <host_id> <count>` triplets, check every triplet against
//! the caller's delegations in /etc/subuid or /etc/subgid, and only
//! then write the target's id map.

#![cfg(target_os = "linux")]

mod err;
pub use err::*;

pub mod logging;
pub mod logindefs;
pub mod nswrite;
pub mod ranges;
pub mod subid;
pub mod target;
pub mod verify;

mod cli;
pub use cli::*;

pub use nswrite::SetgroupsOutcome;
pub use ranges::{MapKind, MapRange};
pub use subid::Registry;
pub use target::{check_ownership, CallerIdentity, TargetProcess};
