//! Tauri command handlers
//!
//! All Tauri commands exposed to the frontend are defined here.
//! Split into submodules by functionality.

mod accident;
mod acta;
mod files;
mod folders;
mod persistence;
mod remision;

pub use accident::*;
pub use acta::*;
pub use files::*;
pub use folders::*;
pub use persistence::*;
pub use remision::*;

/// Run blocking core work (file walks, scripts) off the async runtime
async fn blocking<T, F>(f: F) -> Result<T, String>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tauri::async_runtime::spawn_blocking(f)
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}
