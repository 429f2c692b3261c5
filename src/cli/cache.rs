use crate::cli::commands::{CacheAction, CacheArgs};
use crate::cli::output::render_cache_list;
use crate::db::Database;
use crate::errors::MetricsError;
use tracing::info;

pub async fn handle_cache(args: CacheArgs) -> Result<(), MetricsError> {
    let db = Database::new(&args.db_file)?;
    let result = run_action(&db, &args.action);
    db.close()?;
    print!("{}", result?);
    Ok(())
}

fn run_action(db: &Database, action: &CacheAction) -> Result<String, MetricsError> {
    match action {
        CacheAction::List { json } => {
            let rows = db.list_projects()?;
            if *json {
                Ok(format!("{}\n", serde_json::to_string_pretty(&rows)?))
            } else {
                Ok(render_cache_list(&rows))
            }
        }
        CacheAction::Show { project_id } => {
            let record = db.get_project(project_id)?
                .ok_or_else(|| MetricsError::Cache(format!("Project {} is not cached", project_id)))?;
            Ok(format!("{}\n", serde_json::to_string_pretty(&record)?))
        }
        CacheAction::Truncate => {
            let removed = db.truncate()?;
            info!(removed, "Cache truncated");
            Ok(format!("Removed {} cached projects\n", removed))
        }
    }
}
