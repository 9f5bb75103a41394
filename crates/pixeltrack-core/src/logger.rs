//! Stderr logger for the tracking crates.
//!
//! Lines look like `[  0.012s DEBUG cascade::detector] scale 1.250: ...`.
//! Records from the `pixeltrack*` crates pass at the configured level; records
//! from dependencies only at `WARN` and above, so a `trace` run over a video
//! stays readable. Install it once with [`init_with_level`], or enable the
//! `tracing` feature and use [`init_tracing`].

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

const CRATE_PREFIX: &str = "pixeltrack";

/// Default `tracing` directives when `RUST_LOG` is unset.
#[cfg(feature = "tracing")]
const DEFAULT_DIRECTIVES: &str = "warn,pixeltrack=info";

struct FrameLogger {
    level: LevelFilter,
    started: Instant,
}

fn is_own_target(target: &str) -> bool {
    target.starts_with(CRATE_PREFIX)
}

/// `pixeltrack_cascade::detector` -> `cascade::detector`; foreign targets
/// are printed as-is.
fn short_target(target: &str) -> &str {
    target
        .strip_prefix("pixeltrack_")
        .or_else(|| target.strip_prefix("pixeltrack::"))
        .unwrap_or(target)
}

fn format_line(elapsed: f64, level: Level, target: &str, args: &fmt::Arguments<'_>) -> String {
    format!(
        "[{:7.3}s {:>5} {}] {}",
        elapsed,
        level,
        short_target(target),
        args
    )
}

impl Log for FrameLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let limit = if is_own_target(metadata.target()) {
            self.level
        } else {
            self.level.min(LevelFilter::Warn)
        };
        metadata.level() <= limit
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<FrameLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| FrameLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber honouring `RUST_LOG`.
///
/// Without `RUST_LOG` the tracking crates log at `info` and everything else
/// at `warn`. Detector spans are reported when they close, which gives
/// per-frame timings.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    if json {
        let _ = builder.json().flatten_event(true).finish().try_init();
    } else {
        let _ = builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger(level: LevelFilter) -> FrameLogger {
        FrameLogger {
            level,
            started: Instant::now(),
        }
    }

    fn metadata(level: Level, target: &str) -> Metadata<'_> {
        Metadata::builder().level(level).target(target).build()
    }

    #[test]
    fn crate_prefix_is_dropped_from_targets() {
        assert_eq!(short_target("pixeltrack_cascade::detector"), "cascade::detector");
        assert_eq!(short_target("pixeltrack::detect"), "detect");
        assert_eq!(short_target("image::codecs::png"), "image::codecs::png");
    }

    #[test]
    fn line_carries_level_and_short_target() {
        let line = format_line(
            0.5,
            Level::Debug,
            "pixeltrack_color::detector",
            &format_args!("magenta: {} components", 3),
        );
        assert_eq!(line, "[  0.500s DEBUG color::detector] magenta: 3 components");
    }

    #[test]
    fn dependencies_are_capped_at_warn() {
        let log = logger(LevelFilter::Trace);
        assert!(log.enabled(&metadata(Level::Trace, "pixeltrack_keypoints::fast")));
        assert!(!log.enabled(&metadata(Level::Debug, "image::codecs::png")));
        assert!(log.enabled(&metadata(Level::Warn, "image::codecs::png")));
    }

    #[test]
    fn own_records_follow_configured_level() {
        let log = logger(LevelFilter::Info);
        assert!(log.enabled(&metadata(Level::Info, "pixeltrack_cascade::merge")));
        assert!(!log.enabled(&metadata(Level::Debug, "pixeltrack_cascade::detector")));
        assert!(!log.enabled(&metadata(Level::Info, "image")));
    }
}
