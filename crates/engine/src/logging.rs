/// Installs a fmt subscriber routed through the test harness output capture.
///
/// The filter comes from `RUST_LOG` (default `info`). Safe to call from every
/// test: only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}
