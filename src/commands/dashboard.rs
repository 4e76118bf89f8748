use chrono::Local;
use tauri::State;

use stockroom::models::DashboardStats;

use crate::state::AppState;

#[tauri::command]
pub async fn get_dashboard_stats(state: State<'_, AppState>) -> Result<DashboardStats, String> {
    let today = Local::now().date_naive();
    Ok(state.workspace.dashboard(today))
}
