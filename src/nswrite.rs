//! The privileged part: writing /proc/<pid>/setgroups and the id map.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};

use log::{debug, warn};
use nix::fcntl::OFlag;

use crate::err::*;
use crate::ranges::{MapKind, MapRange};
use crate::target::TargetProcess;
use crate::verify::SetgroupsDecision;

const SETGROUPS: &str = "setgroups";
const DENY: &str = "deny\n";

/// Policy contents are "allow\n" or "deny\n"; anything longer than
/// this is not a setgroups file.
const MAX_POLICY_LEN: u64 = 4096;

/// What happened to the target's setgroups file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetgroupsOutcome {
    /// uid maps don't involve the setgroups switch.
    NotApplicable,
    /// A delegated range was granted; the target keeps its policy.
    LeftAlone,
    AlreadyDenied,
    Denied,
    /// Kernel predates the setgroups restriction.
    Unsupported,
}

/// Force "deny" unless some range was registry-authorized.
///
/// The file is write-once: a second, different write fails with
/// EPERM.  So we read first and only write if the policy isn't
/// already "deny".  "allow" is the kernel default and outranks
/// nothing, so we never write it.
pub fn write_setgroups(target: &TargetProcess, decision: SetgroupsDecision)
                       -> Result<SetgroupsOutcome, Error> {
    if decision.allow_setgroups() {
        return Ok(SetgroupsOutcome::LeftAlone);
    }

    let mut file = match target.open_file(SETGROUPS, OFlag::O_RDWR) {
        Ok(f) => f,
        Err(ref e) if e.kind() == ErrorKind::NotFound => {
            warn!("kernel doesn't support setgroups restrictions");
            return Ok(SetgroupsOutcome::Unsupported);
        }
        Err(e) => {
            return Err(map_io_err(e, String::from("couldn't open process setgroups")));
        }
    };

    let mut current = Vec::new();
    (&mut file).take(MAX_POLICY_LEN).read_to_end(&mut current)
        .map_err(|e| map_io_err(e, String::from("failed to read setgroups")))?;
    if current.starts_with(DENY.as_bytes()) {
        debug!("setgroups already denied for {}", target.pid);
        return Ok(SetgroupsOutcome::AlreadyDenied);
    }

    file.seek(SeekFrom::Start(0))
        .map_err(|e| map_io_err(e, String::from("failed to seek setgroups")))?;
    write_once(&mut file, DENY.as_bytes())
        .map_err(|e| map_io_err(e, String::from("failed to setgroups deny policy")))?;
    Ok(SetgroupsOutcome::Denied)
}

/// Write every range to the uid_map or gid_map in one go.  The kernel
/// accepts exactly one write per map file, so partial success is not
/// a thing.
pub fn write_mapping(target: &TargetProcess, kind: MapKind, ranges: &[MapRange])
                     -> Result<(), Error> {
    let map_file = kind.map_file();
    let mut buf = String::new();
    for range in ranges {
        buf.push_str(&range.to_string());
        buf.push('\n');
    }

    let mut file = target.open_file(map_file, OFlag::O_WRONLY)
        .map_err(|e| map_io_err(e, format!("open of {} failed", map_file)))?;
    write_once(&mut file, buf.as_bytes())
        .map_err(|e| map_io_err(e, format!("write to {} failed", map_file)))?;
    debug!("wrote {} line(s) to /proc/{}/{}", ranges.len(), target.pid, map_file);
    Ok(())
}

/// Internal: a single write(2), which must take everything.
fn write_once<W: Write>(w: &mut W, data: &[u8]) -> io::Result<()> {
    let n = w.write(data)?;
    if n != data.len() {
        return Err(io::Error::new(ErrorKind::WriteZero,
                                  format!("short write ({} of {} bytes)",
                                          n, data.len())));
    }
    Ok(())
}
