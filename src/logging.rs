//! Diagnostics go to stderr, prefixed with the program name.

use std::io::Write;

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Install the stderr logger.  The environment is not consulted: it
/// belongs to whoever invoked a setuid program.  Calling this twice
/// is harmless; the first logger wins.
pub fn init_logging(progname: &str, level: LevelFilter) {
    let progname = progname.to_string();
    let _ = Builder::new()
        .filter_level(level)
        .target(Target::Stderr)
        .format(move |buf, record| {
            if record.level() <= log::Level::Warn {
                writeln!(buf, "{}: {}", progname, record.args())
            } else {
                writeln!(buf, "{}: {}: {}", progname,
                         record.level().as_str().to_lowercase(), record.args())
            }
        })
        .try_init();
}
