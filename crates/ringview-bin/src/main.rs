//! `ringview`: lay out text the way a bidi-aware terminal viewport would.
//!
//! Every input line is wrapped at `--width` columns into an in-memory
//! scrollback, a viewport of `--rows` rows starting at `--start` is
//! recomputed, and the visible rows are printed in visual order.
use anyhow::{Result, bail};
use clap::Parser;
use core_bidi::{RingView, RingViewOptions, classifier_for};
use core_config::{ConfigContext, load_from};
use core_ring::{BidiFlags, Ring, RowSource};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

mod render;

/// Scrollback kept for the input text.
const RING_ROWS: usize = 10_000;

const SAMPLE: &str = "\
plain left-to-right text
\u{05E9}\u{05DC}\u{05D5}\u{05DD} world, \u{05E2}\u{05D5}\u{05DC}\u{05DD} (hello)
\u{0645}\u{0631}\u{062D}\u{0628}\u{0627} \u{0628}\u{0627}\u{0644}\u{0639}\u{0627}\u{0644}\u{0645} 123
\u{250C}\u{2500}\u{2500}\u{2510} box \u{05D0}\u{05D1}\u{05D2}
a long line that wraps across several rows while \u{05D4}\u{05E2}\u{05D1}\u{05E8}\u{05D9}\u{05EA} continues on the next row
";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "ringview", version, about = "Bidi layout of a terminal viewport")]
struct Args {
    /// UTF-8 text file to lay out. If omitted a built-in sample is used.
    pub path: Option<PathBuf>,
    /// Viewport width in columns.
    #[arg(long, default_value_t = 40)]
    pub width: usize,
    /// First viewport row (absolute scrollback index). Defaults to the oldest row.
    #[arg(long)]
    pub start: Option<usize>,
    /// Number of viewport rows. Defaults to everything after `--start`.
    #[arg(long)]
    pub rows: Option<usize>,
    /// Paragraph direction right-to-left.
    #[arg(long)]
    pub rtl: bool,
    /// Detect paragraph direction from content (`--rtl` is the fallback).
    #[arg(long)]
    pub auto: bool,
    /// Fixed direction, no bidi algorithm.
    #[arg(long)]
    pub explicit: bool,
    /// Print each row's visual-to-logical map after it.
    #[arg(long)]
    pub map: bool,
    /// Optional configuration file path (overrides discovery of `ringview.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

impl Args {
    fn flags(&self, box_mirror: bool) -> BidiFlags {
        let mut flags = BidiFlags::empty();
        flags.set(BidiFlags::IMPLICIT, !self.explicit);
        flags.set(BidiFlags::RTL, self.rtl);
        flags.set(BidiFlags::AUTO, self.auto);
        flags.set(BidiFlags::BOX_MIRROR, box_mirror);
        flags
    }
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("ringview.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "ringview.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn load_text(path: Option<&Path>) -> Result<String> {
    let Some(path) = path else {
        return Ok(SAMPLE.to_string());
    };
    match std::fs::read_to_string(path) {
        Ok(content) => {
            tracing::debug!(
                target: "io",
                file = %path.display(),
                size_bytes = content.len(),
                "file_read_ok"
            );
            Ok(content)
        }
        Err(e) => {
            error!(target: "io", ?e, file = %path.display(), "file_open_error");
            Err(e.into())
        }
    }
}

fn run(args: Args) -> Result<()> {
    if args.width == 0 {
        bail!("--width must be at least 1");
    }
    let text = load_text(args.path.as_deref())?;

    let mut config = load_from(args.config.clone())?;
    let flags = args.flags(config.file.bidi.box_mirror);

    let mut ring = Ring::new(RING_ROWS);
    for line in text.lines() {
        ring.append_text(line, args.width, flags);
    }

    let start = args.start.unwrap_or(ring.first_row());
    let rows = args
        .rows
        .unwrap_or_else(|| ring.next_row().saturating_sub(start));
    let ctx = ConfigContext::new(
        u16::try_from(args.width).unwrap_or(u16::MAX),
        u16::try_from(rows).unwrap_or(u16::MAX),
    );
    config.apply_context(ctx);

    let mut view = RingView::with_options(
        RingViewOptions::from(&config),
        classifier_for(config.file.bidi.classifier),
    );
    view.set_width(args.width);
    view.set_rows(start, rows);
    view.recompute(&ring);
    info!(
        target: "runtime",
        classifier = view.classifier().name(),
        start,
        rows,
        width = args.width,
        paragraphs = view.last_stats().paragraphs,
        fallbacks = view.last_stats().fallbacks,
        "viewport_rendered"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for row in start..start + rows {
        let line = render::visual_line(&view, &ring, row);
        if args.map {
            writeln!(out, "{line}|{}", render::map_line(&view, row))?;
        } else {
            writeln!(out, "{}", line.trim_end())?;
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");
    let args = Args::parse();
    let result = run(args);
    if let Err(e) = &result {
        error!(target: "runtime", error = %e, "run_failed");
    }
    result
}
