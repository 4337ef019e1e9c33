pub mod commands;
pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::error::{SwitcherError, SwitcherResult};
pub use crate::core::state::{AppSettings, AppState};

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mod_profile_switcher_lib=debug")),
        )
        .try_init();

    tracing::info!("Mod profile switcher starting...");
}
