//! Argument surface and the one place errors become exit codes.

use std::env;
use std::ffi::OsString;
use std::path::Path;
use std::process;

use clap::{Arg, ArgAction, Command};
use log::{error, LevelFilter};

use crate::err::*;
use crate::logging::init_logging;
use crate::logindefs::{LoginDefs, GRANT_AUX_GROUP_SUBIDS};
use crate::nswrite::{write_mapping, write_setgroups, SetgroupsOutcome};
use crate::ranges::{parse_map_ranges, parse_pid, MapKind, MapRange};
use crate::subid::Registry;
use crate::target::{check_ownership, CallerIdentity, TargetProcess};
use crate::verify::verify_ranges;

/// Per-invocation state that would otherwise be global.
#[derive(Debug, Clone)]
pub struct Context {
    pub progname: String,
    pub kind: MapKind,
}

impl Context {
    pub fn new(argv0: Option<&OsString>, kind: MapKind) -> Context {
        let fallback = format!("new{}map", kind.label());
        let progname = argv0
            .and_then(|a| Path::new(a).file_name())
            .and_then(|s| s.to_str())
            .map(String::from)
            .unwrap_or(fallback);
        Context { progname, kind }
    }

    pub fn usage(&self) -> String {
        let id = self.kind.label();
        format!("usage: {} <pid> <{id}> <lower{id}> <count> \
                 [ <{id}> <lower{id}> <count> ] ... ",
                self.progname, id = id)
    }

    fn command(&self) -> Command {
        Command::new(self.progname.clone())
            .override_usage(self.usage())
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(Arg::new("pid")
                 .required(true)
                 .allow_hyphen_values(true))
            .arg(Arg::new("ranges")
                 .required(true)
                 .num_args(1..)
                 .action(ArgAction::Append)
                 .allow_hyphen_values(true)
                 .trailing_var_arg(true))
    }
}

/// Authorize `ranges` for `caller` and, if every one passes, write the
/// setgroups policy (gid maps only) followed by the map itself.
pub fn apply(kind: MapKind, caller: &CallerIdentity, target: &TargetProcess,
             ranges: &[MapRange], registry: &Registry)
             -> Result<SetgroupsOutcome, Error> {
    let decision = verify_ranges(registry, caller, kind, ranges)?;
    let outcome = match kind {
        MapKind::Gid => write_setgroups(target, decision)?,
        MapKind::Uid => SetgroupsOutcome::NotApplicable,
    };
    write_mapping(target, kind, ranges)?;
    Ok(outcome)
}

/// Ownership first, then the registry, then `apply`.  A foreign
/// target never gets as far as opening `registry_path`.
pub fn authorize_and_write(kind: MapKind, caller: &CallerIdentity,
                           target: &TargetProcess, ranges: &[MapRange],
                           grant_aux_group: bool, registry_path: &Path)
                           -> Result<SetgroupsOutcome, Error> {
    check_ownership(caller, target, grant_aux_group)?;
    let registry = Registry::open_path(registry_path)?;
    let result = apply(kind, caller, target, ranges, &registry);
    registry.close();
    result
}

/// Everything from raw arguments to the final write.
pub fn run(ctx: &Context, args: Vec<OsString>) -> Result<(), Error> {
    // clap would swallow an end-of-options marker; we have no options.
    if args.iter().skip(1).any(|a| a.as_os_str() == "--") {
        return Err(usage_err("unexpected '--'"));
    }
    let matches = ctx.command().try_get_matches_from(args)
        .map_err(|e| usage_err(e.kind().to_string()))?;

    let pid = matches.get_one::<String>("pid")
        .ok_or_else(|| usage_err("missing pid"))?;
    let pid = parse_pid(pid)?;
    let raw: Vec<&String> = matches.get_many::<String>("ranges")
        .ok_or_else(|| usage_err("missing ranges"))?
        .collect();
    let ranges = parse_map_ranges(&raw)?;

    let target = TargetProcess::open(pid)?;
    let caller = CallerIdentity::current()?;
    let defs = LoginDefs::load_default();
    authorize_and_write(ctx.kind, &caller, &target, &ranges,
                        defs.getdef_bool(GRANT_AUX_GROUP_SUBIDS),
                        ctx.kind.registry_path())
        .map(|_| ())
}

/// Entry point shared by newuidmap and newgidmap.
pub fn main_for(kind: MapKind) -> ! {
    let args: Vec<OsString> = env::args_os().collect();
    let ctx = Context::new(args.first(), kind);
    init_logging(&ctx.progname, LevelFilter::Warn);

    process::exit(match run(&ctx, args) {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            if e.is_usage() {
                eprintln!("{}", ctx.usage());
            }
            e.exit_code()
        }
    });
}
