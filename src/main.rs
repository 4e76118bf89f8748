#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod commands;
mod state;

use anyhow::anyhow;
use tauri::Manager;

use stockroom::config::load_settings;
use stockroom::db::Database;

use crate::state::AppState;

fn main() {
    tauri::Builder::default()
        .setup(|app| {
            let app_data_dir = app
                .path()
                .app_data_dir()
                .map_err(|e| anyhow!("App data dir: {}", e))?;
            std::fs::create_dir_all(&app_data_dir)?;

            let db_path = app_data_dir.join("stockroom.sqlite");
            let db = Database::new(db_path)?;
            let settings = load_settings(&db);
            init_tracing(&settings.log_level);

            let state = AppState::new(db, settings, app.handle().clone());
            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::settings::get_settings,
            commands::settings::save_settings,
            commands::auth::initialize_session,
            commands::auth::current_user,
            commands::auth::login,
            commands::auth::register,
            commands::auth::logout,
            commands::organizations::get_organizations,
            commands::organizations::get_organization_options,
            commands::organizations::select_organization,
            commands::organizations::create_organization,
            commands::organizations::update_organization,
            commands::organizations::delete_organization,
            commands::products::get_products,
            commands::products::find_product_by_barcode,
            commands::products::create_product,
            commands::products::update_product,
            commands::products::delete_product,
            commands::warehouses::get_warehouses,
            commands::warehouses::create_warehouse,
            commands::warehouses::update_warehouse,
            commands::warehouses::delete_warehouse,
            commands::warehouses::toggle_warehouse_active,
            commands::documents::get_documents,
            commands::documents::get_document_detail,
            commands::documents::get_document_items,
            commands::documents::complete_document,
            commands::documents::delete_document,
            commands::documents::update_document_item,
            commands::documents::delete_document_item,
            commands::wizard::wizard_start,
            commands::wizard::wizard_state,
            commands::wizard::wizard_set_header,
            commands::wizard::wizard_next,
            commands::wizard::wizard_back,
            commands::wizard::wizard_search_products,
            commands::wizard::wizard_add_product,
            commands::wizard::wizard_add_by_barcode,
            commands::wizard::wizard_remove_product,
            commands::wizard::wizard_set_quantities,
            commands::wizard::wizard_save_draft,
            commands::wizard::wizard_complete,
            commands::wizard::wizard_retry,
            commands::wizard::wizard_cancel,
            commands::dashboard::get_dashboard_stats,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

fn init_tracing(level: &str) {
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}
