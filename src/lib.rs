pub mod app;
mod config;
pub mod error;
pub mod logging;
pub mod notification;
pub mod page;
pub mod pins;
pub mod portal;
pub mod select;
pub mod storage;
pub mod ui;

pub use error::{AppError, AppResult};

/// Entrypoint used by higher-level integrations and CLI bindings.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting Pinshelf");

    let mut app = app::App::new();
    app.start()?;

    tracing::info!("shutdown with selection state={:?}", app.selection_state());
    Ok(())
}
