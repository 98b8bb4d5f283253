#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use dynops_testhelpers_macros::test;

use std::sync::LazyLock;
use std::time::Instant;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "DYNOPS_LOG";

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

struct Uptime;

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        let elapsed = START_TIME.elapsed();
        write!(w, "{:4}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
    }
}

fn is_noise(name: &str) -> bool {
    const PREFIXES: &[&str] = &[
        // test harness
        "test::run_test",
        "test::__rust_begin_short_backtrace",
        // panic machinery
        "std::panicking::",
        "std::panic::",
        "core::panicking::",
        // thread spawning
        "std::thread::Builder::spawn_unchecked_",
        "std::sys::thread::",
        "std::sys::backtrace::",
        // call_once trampolines
        "core::ops::function::FnOnce::call_once",
        "<alloc::boxed::Box<F,A> as core::ops::function::FnOnce<Args>>::call_once",
        "<core::panic::unwind_safe::AssertUnwindSafe<F> as core::ops::function::FnOnce<()>>::call_once",
        "__pthread",
        // proptest runner internals
        "proptest::test_runner::",
    ];
    PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

static SUBSCRIBER_INIT: LazyLock<()> = LazyLock::new(|| {
    let _ = *START_TIME;

    #[cfg(miri)]
    let verbosity = color_backtrace::Verbosity::Medium;

    #[cfg(not(miri))]
    let verbosity = color_backtrace::Verbosity::Full;

    color_backtrace::BacktracePrinter::new()
        .verbosity(verbosity)
        .add_frame_filter(Box::new(|frames| {
            frames.retain(|frame| frame.name.as_deref().is_none_or(|name| !is_noise(name)))
        }))
        .install(Box::new(termcolor::StandardStream::stderr(
            termcolor::ColorChoice::AlwaysAnsi,
        )));

    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| s.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(tracing::Level::TRACE));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_timer(Uptime)
                .with_target(false)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .ok();
});

/// Install the test subscriber and backtrace printer.
///
/// Safe to call from every test: the setup runs once per process, so it
/// works the same under `cargo test` and `cargo nextest run`. Nextest's
/// process-per-test model gives cleaner per-test logs.
pub fn setup() {
    if std::env::var("NEXTEST").as_deref() != Ok("1") {
        static NEXTEST_HINT: LazyLock<()> = LazyLock::new(|| {
            eprintln!("Tip: `cargo nextest run` gives per-test log output.");
            eprintln!("     Install with: cargo install cargo-nextest");
            eprintln!();
        });
        #[allow(clippy::let_unit_value)]
        let _ = *NEXTEST_HINT;
    }

    #[allow(clippy::let_unit_value)]
    let _ = *SUBSCRIBER_INIT;
}

/// An error type that panics when it's built, so tests can use `?` on
/// anything that implements [`core::error::Error`] (a
/// `dynops_core::DataError`, a `serde_json::Error`, ...).
#[derive(Debug)]
pub struct IPanic;

impl<E> From<E> for IPanic
where
    E: core::error::Error + Send + Sync,
{
    #[track_caller]
    fn from(value: E) -> Self {
        panic!("from: {}: {value}", core::panic::Location::caller())
    }
}
