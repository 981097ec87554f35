//! Server startup utilities.

use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
   ________                      _      __
  / ____/ /_  _________  ____   (_)____/ /__
 / /   / __ \/ ___/ __ \/ __ \ / / ___/ / _ \
/ /___/ / / / /  / /_/ / / / // / /__/ /  __/
\____/_/ /_/_/   \____/_/ /_//_/\___/_/\___/

                      Rust Edition
    "#);
}

/// Prints server startup information.
pub fn print_startup_info(rest_port: u16) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("REST API:  http://0.0.0.0:{}", rest_port);
    info!("Posts:     http://0.0.0.0:{}/api/posts", rest_port);
    info!("Health:    http://0.0.0.0:{}/health", rest_port);
    info!("{}", separator);
}
