//! Who is asking, and who are they asking about.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::{MetadataExt, OpenOptionsExt};
use std::os::unix::io::{AsRawFd, FromRawFd};
use std::path::Path;

use libc::{gid_t, pid_t, uid_t};
use nix::fcntl::{openat, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{getgid, getuid, User};

use crate::err::*;
use crate::ranges::MapKind;

/// The invoking user, as the kernel and the password database see
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub uid:    uid_t,
    pub gid:    gid_t,
    pub pw_uid: uid_t,
    pub pw_gid: gid_t,
    pub name:   String,
}

impl CallerIdentity {
    /// Real ids of this process plus the passwd entry for the real uid.
    pub fn current() -> Result<CallerIdentity, Error> {
        let uid = getuid();
        let gid = getgid();
        let pw = match User::from_uid(uid) {
            Ok(Some(pw)) => pw,
            Ok(None) => return Err(Error::Identity { uid: uid.as_raw(), cause: None }),
            Err(e) => return Err(Error::Identity { uid: uid.as_raw(), cause: Some(e) }),
        };
        Ok(CallerIdentity {
            uid:    uid.as_raw(),
            gid:    gid.as_raw(),
            pw_uid: pw.uid.as_raw(),
            pw_gid: pw.gid.as_raw(),
            name:   pw.name,
        })
    }

    /// The one id this caller may always map to itself.
    pub fn real_id(&self, kind: MapKind) -> u32 {
        match kind {
            MapKind::Uid => self.uid,
            MapKind::Gid => self.gid,
        }
    }
}

/// An open handle on /proc/<pid>.  Everything written on behalf of
/// the target goes through `dir`; the path is never looked up again.
#[derive(Debug)]
pub struct TargetProcess {
    pub pid: pid_t,
    dir: File,
    pub uid: uid_t,
    pub gid: gid_t,
}

impl TargetProcess {
    pub fn open(pid: pid_t) -> Result<TargetProcess, Error> {
        TargetProcess::open_dir(pid, Path::new(&format!("/proc/{}/", pid)))
    }

    /// Open `path` as the directory standing for process `pid`.
    pub fn open_dir(pid: pid_t, path: &Path) -> Result<TargetProcess, Error> {
        let dir = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_DIRECTORY)
            .open(path)
            .map_err(|e| map_lookup_err(
                e, format!("Could not open proc directory for target {}", pid)))?;
        let st = dir.metadata()
            .map_err(|e| map_lookup_err(
                e, format!("Could not stat directory for target {}", pid)))?;
        Ok(TargetProcess { pid, dir, uid: st.uid(), gid: st.gid() })
    }

    /// openat(2) relative to the held directory.
    pub fn open_file(&self, name: &str, flags: OFlag) -> io::Result<File> {
        let fd = openat(Some(self.dir.as_raw_fd()), name,
                        flags | OFlag::O_CLOEXEC, Mode::empty())
            .map_err(io::Error::from)?;
        // Fresh from openat; nothing else holds it.
        Ok(unsafe { File::from_raw_fd(fd) })
    }
}

/// The caller must be the target's owner, and must be who the
/// password database says they are.  GRANT_AUX_GROUP_SUBIDS lets the
/// real gid be a supplementary group instead of the primary one; the
/// target must still run with that same gid.
pub fn check_ownership(caller: &CallerIdentity, target: &TargetProcess,
                       grant_aux_group: bool) -> Result<(), Error> {
    if caller.uid != caller.pw_uid
        || (!grant_aux_group && caller.gid != caller.pw_gid)
        || caller.pw_uid != target.uid
        || caller.gid != target.gid
    {
        return Err(Error::TargetOwner {
            pid:    target.pid,
            uid:    caller.uid,
            pw_uid: caller.pw_uid,
            st_uid: target.uid,
            gid:    caller.gid,
            pw_gid: caller.pw_gid,
            st_gid: target.gid,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use crate::err::Category;

    fn fake_target(uid: uid_t, gid: gid_t) -> (tempfile::TempDir, TargetProcess) {
        let dir = tempfile::tempdir().unwrap();
        let mut t = TargetProcess::open_dir(4242, dir.path()).unwrap();
        t.uid = uid;
        t.gid = gid;
        (dir, t)
    }

    fn alice() -> CallerIdentity {
        CallerIdentity {
            uid: 1000, gid: 1000, pw_uid: 1000, pw_gid: 1000,
            name: String::from("alice"),
        }
    }

    #[test]
    fn owner_may_proceed() {
        let (_d, t) = fake_target(1000, 1000);
        assert!(check_ownership(&alice(), &t, false).is_ok());
    }

    #[test]
    fn foreign_uid_is_rejected() {
        let (_d, t) = fake_target(1001, 1000);
        let err = check_ownership(&alice(), &t, true).unwrap_err();
        assert_eq!(err.category(), Category::Permission);
        assert!(err.to_string().contains("st_uid:1001"));
    }

    #[test]
    fn foreign_gid_is_rejected_even_with_aux_groups() {
        let (_d, t) = fake_target(1000, 2000);
        assert!(check_ownership(&alice(), &t, true).is_err());
    }

    #[test]
    fn passwd_mismatch() {
        let (_d, t) = fake_target(1000, 1000);
        let mut c = alice();
        c.pw_uid = 0;
        assert!(check_ownership(&c, &t, false).is_err());

        // Real gid is a supplementary group, not the primary one.
        let mut c = alice();
        c.pw_gid = 100;
        assert!(check_ownership(&c, &t, false).is_err());
        assert!(check_ownership(&c, &t, true).is_ok());
    }

    #[test]
    fn opens_own_proc_entry() {
        let pid = std::process::id() as pid_t;
        let t = TargetProcess::open(pid).unwrap();
        assert_eq!(t.uid, nix::unistd::geteuid().as_raw());
        assert_eq!(t.pid, pid);
    }

    #[test]
    fn missing_process_is_a_lookup_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TargetProcess::open_dir(1, &dir.path().join("nope")).unwrap_err();
        assert_eq!(err.category(), Category::Lookup);
        assert!(err.to_string().contains("target 1"));
    }

    #[test]
    fn open_file_is_relative_to_the_handle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("setgroups"), "allow\n").unwrap();
        let t = TargetProcess::open_dir(7, dir.path()).unwrap();
        let mut s = String::new();
        t.open_file("setgroups", OFlag::O_RDONLY).unwrap()
            .read_to_string(&mut s).unwrap();
        assert_eq!(s, "allow\n");
        let e = t.open_file("gid_map", OFlag::O_WRONLY).unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::NotFound);
    }
}
