//! The test subscriber installs with colored output and can be set up
//! any number of times.

use dynops_testhelpers::test;

#[test]
fn setup_is_repeatable() {
    dynops_testhelpers::setup();
    tracing::info!(attempt = 2, "subscriber already installed");
}

#[test]
fn logging_inside_a_test_does_not_panic() {
    tracing::warn!("colored output is available");
    tracing::trace!(target: "dynops", "trace level passes the default filter");
}
