//! Four viewports onto the crate model, each with its own camera and
//! background colour. Drag the gizmo handles in any viewport to move the
//! crate; the other three follow. Escape closes the window.
//!
//! Environment overrides: `QUADVIEW_ASSET_DIR`, `QUADVIEW_TARGET_FPS`,
//! `QUADVIEW_MSAA` (1 or 4), and `RUST_LOG` for the log filter.

use anyhow::Context;
use quadview::logging::{init_logging, LoggingConfig};
use quadview::{AppConfig, QuadviewApp};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = AppConfig::default().with_env_overrides();
    let asset_dir = config.asset_dir.clone();

    QuadviewApp::new(config)
        .run()
        .with_context(|| format!("render_targets demo failed (assets in {})", asset_dir.display()))
}
