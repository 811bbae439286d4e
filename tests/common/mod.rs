//! Integration test infrastructure: an in-process server and a raw-line
//! IRC client.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;

use std::time::Duration;

/// Liveness timers shrunk to test scale.
#[allow(dead_code)]
pub fn fast_timeouts() -> tinyircd::config::TimeoutsConfig {
    tinyircd::config::TimeoutsConfig {
        ping_threshold: Duration::from_millis(200),
        ping_timeout: Duration::from_millis(600),
        check_interval: Duration::from_millis(50),
    }
}
