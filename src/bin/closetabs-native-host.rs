//! Chrome Native Messaging Host for CloseTabs
//!
//! Launched by the browser when the CloseTabs extension connects. Browser
//! events arrive on stdin and browser calls go out on stdout using Chrome's
//! native messaging protocol, so logs are written to stderr.

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    // Returns once the extension closes the connection
    if let Err(e) = closetabs_lib::run_native_host() {
        log::error!("Native host failed to start: {e}");
        std::process::exit(1);
    }
}
