//! Application entry point for the KD-partition morph viewer.
//!
//! Sets up logging and eframe/egui, then delegates all interactive logic
//! and rendering to [`Viewer`] from the `viewer` module.

mod density;
mod viewer;

use tracing_subscriber::{EnvFilter, fmt};
use viewer::Viewer;

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop,
///   or if the viewer cannot be constructed.
fn main() -> eframe::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,morph_core=debug"));
    fmt().with_env_filter(filter).init();

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "KD Morph",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new()?))),
    )
}
