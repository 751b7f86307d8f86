//! Test suites for the gateway daemon.

mod support;
