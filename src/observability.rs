//! Observability hooks for the codec's decision-making.
//!
//! The Dimensional planner and the Hierarchical clusterer make data-dependent
//! choices; this module makes those choices visible without the core ever
//! logging errors on its own behalf. Everything goes through the `log` facade,
//! so a host that installs no logger pays only for disabled level checks.

use log::LevelFilter;
use std::fs::OpenOptions;
use std::sync::Once;

use crate::error::Result;

/// Logs a structured key-value metric record at `debug` level.
///
/// # Example
/// ```
/// use pcpatch::log_metric;
/// let npoints = 4;
/// log_metric!("event"="build_patch", "scheme"="Dimensional", "npoints"=&npoints);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if log::log_enabled!(log::Level::Debug) {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            log::debug!("PCPATCH_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs a process-wide `env_logger` at `debug` level, once.
///
/// With `log_file`, records are appended to that file instead of stderr.
/// Subsequent calls are no-ops, as is a call made after another logger was
/// installed by the host.
pub fn enable_verbose_logging(log_file: Option<&str>) -> Result<()> {
    let target = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();
        builder.is_test(false);
        builder.filter_level(LevelFilter::Debug);

        // Just the level and message.
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = target {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
