//! SG-SST document manager
//!
//! Core library for browsing a company's occupational health and safety
//! document tree, previewing documents, editing committee minutes and
//! preparing referral letters. The Tauri shell lives behind the `desktop`
//! feature.

pub mod accident;
pub mod acta;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extractors;
pub mod folders;
pub mod models;
pub mod preview;
pub mod remision;
pub mod resolver;
pub mod scripts;
pub mod state;

#[cfg(feature = "desktop")]
mod commands;

pub use error::{Result, SgsstError};
pub use state::AppState;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::*;
    use tauri::Manager;

    tauri::Builder::default()
        .plugin(tauri_plugin_process::init())
        .manage(AppState::default())
        .invoke_handler(tauri::generate_handler![
            load_config,
            save_config,
            get_settings,
            update_settings,
            map_directory,
            link_company,
            read_directory,
            find_files_recursively,
            find_submodule_path,
            get_catalog,
            select_submodule,
            get_current_submodule,
            navigate_reset,
            navigate_into,
            navigate_back,
            get_navigation,
            open_path,
            show_in_folder,
            preview_file,
            convert_to_pdf,
            load_acta_template,
            save_acta,
            process_remision_pdf,
            generate_remision_document,
            send_remision_by_whatsapp,
            send_remision_by_email,
            compose_remision_message,
            get_control_remisiones_data,
            process_accident_pdf,
            generate_accident_report
        ])
        .setup(|app| {
            let level = if cfg!(debug_assertions) {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            };
            app.handle()
                .plugin(tauri_plugin_log::Builder::default().level(level).build())?;
            app.handle().plugin(tauri_plugin_fs::init())?;
            app.handle().plugin(tauri_plugin_shell::init())?;
            app.handle().plugin(tauri_plugin_dialog::init())?;

            let state = app.state::<AppState>();
            let data_dir = app.path().app_data_dir()?;
            std::fs::create_dir_all(&data_dir)?;
            log::info!("Data directory: {:?}", data_dir);
            state.set_data_dir(data_dir)?;
            match app.path().resource_dir() {
                Ok(dir) => state.set_resource_dir(dir)?,
                Err(e) => log::warn!("No resource directory: {}", e),
            }
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
