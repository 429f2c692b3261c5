use chrono::Utc;
use rusqlite::OptionalExtension;
use serde::Serialize;
use crate::errors::MetricsError;
use crate::models::ProjectRecord;
use super::Database;

/// Cache row without the serialized record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedProjectSummary {
    pub project_id: String,
    pub project_name: String,
    pub updated_at: String,
    pub cached_at: String,
}

impl Database {
    pub fn get_project(&self, project_id: &str) -> Result<Option<ProjectRecord>, MetricsError> {
        let conn = self.lock()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT record_json FROM projects WHERE project_id = ?1",
                rusqlite::params![project_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| MetricsError::Cache(format!("Query failed: {}", e)))?;

        match json {
            Some(json) => {
                let record = serde_json::from_str(&json).map_err(|e| {
                    MetricsError::Cache(format!("Corrupt cache entry for project {}: {}", project_id, e))
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Stores a project that is not cached yet. Fails if the ID exists.
    pub fn insert_project(&self, record: &ProjectRecord) -> Result<(), MetricsError> {
        let json = serde_json::to_string(record)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO projects (project_id, project_name, updated_at, record_json, cached_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![record.project_id, record.project_name, record.updated_at, json, Utc::now().to_rfc3339()],
        ).map_err(|e| MetricsError::Cache(format!("Failed to insert project {}: {}", record.project_id, e)))?;
        Ok(())
    }

    /// Inserts or replaces the entry keyed by the record's project ID.
    pub fn upsert_project(&self, record: &ProjectRecord) -> Result<(), MetricsError> {
        let json = serde_json::to_string(record)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO projects (project_id, project_name, updated_at, record_json, cached_at) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(project_id) DO UPDATE SET project_name = excluded.project_name, updated_at = excluded.updated_at, record_json = excluded.record_json, cached_at = excluded.cached_at",
            rusqlite::params![record.project_id, record.project_name, record.updated_at, json, Utc::now().to_rfc3339()],
        ).map_err(|e| MetricsError::Cache(format!("Failed to upsert project {}: {}", record.project_id, e)))?;
        Ok(())
    }

    pub fn list_projects(&self) -> Result<Vec<CachedProjectSummary>, MetricsError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT project_id, project_name, updated_at, cached_at FROM projects ORDER BY project_name, project_id"
        ).map_err(|e| MetricsError::Cache(format!("Query failed: {}", e)))?;

        let rows = stmt.query_map([], |row: &rusqlite::Row| {
            Ok(CachedProjectSummary {
                project_id: row.get(0)?,
                project_name: row.get(1)?,
                updated_at: row.get(2)?,
                cached_at: row.get(3)?,
            })
        }).map_err(|e| MetricsError::Cache(format!("Query failed: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| MetricsError::Cache(format!("Row read failed: {}", e)))
    }

    pub fn count_projects(&self) -> Result<u64, MetricsError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))
            .map_err(|e| MetricsError::Cache(format!("Query failed: {}", e)))?;
        Ok(count as u64)
    }

    /// Removes every cached project and returns how many were removed.
    pub fn truncate(&self) -> Result<usize, MetricsError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM projects", [])
            .map_err(|e| MetricsError::Cache(format!("Failed to truncate cache: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RemediationStatus, Severity, VersionRecord};

    fn record(id: &str, name: &str, updated_at: &str) -> ProjectRecord {
        let mut project = ProjectRecord::new(id, name, updated_at);
        let mut version = VersionRecord::new("v1", "1.0", "RELEASED", "EXTERNAL");
        version.vulnerabilities.record(RemediationStatus::New, Severity::Critical);
        project.vulnerabilities.record(RemediationStatus::New, Severity::Critical);
        project.versions.push(version);
        project
    }

    #[test]
    fn test_insert_and_get() {
        let db = Database::in_memory().unwrap();
        assert!(db.get_project("p1").unwrap().is_none());

        let project = record("p1", "Alpha", "2024-01-01T00:00:00.000Z");
        db.insert_project(&project).unwrap();
        assert_eq!(db.get_project("p1").unwrap(), Some(project));
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let db = Database::in_memory().unwrap();
        let project = record("p1", "Alpha", "t1");
        db.insert_project(&project).unwrap();
        assert!(matches!(db.insert_project(&project), Err(MetricsError::Cache(_))));
    }

    #[test]
    fn test_upsert_replaces() {
        let db = Database::in_memory().unwrap();
        db.upsert_project(&record("p1", "Alpha", "t1")).unwrap();
        db.upsert_project(&record("p1", "Alpha renamed", "t2")).unwrap();

        let stored = db.get_project("p1").unwrap().unwrap();
        assert_eq!(stored.project_name, "Alpha renamed");
        assert_eq!(stored.updated_at, "t2");
        assert_eq!(db.count_projects().unwrap(), 1);
    }

    #[test]
    fn test_list_is_ordered_by_name() {
        let db = Database::in_memory().unwrap();
        db.insert_project(&record("p2", "Zulu", "t")).unwrap();
        db.insert_project(&record("p1", "Alpha", "t")).unwrap();

        let names: Vec<String> = db.list_projects().unwrap().into_iter().map(|s| s.project_name).collect();
        assert_eq!(names, vec!["Alpha", "Zulu"]);
    }

    #[test]
    fn test_truncate_reports_removed_rows() {
        let db = Database::in_memory().unwrap();
        db.insert_project(&record("p1", "Alpha", "t")).unwrap();
        db.insert_project(&record("p2", "Beta", "t")).unwrap();
        assert_eq!(db.truncate().unwrap(), 2);
        assert_eq!(db.count_projects().unwrap(), 0);
    }

    #[test]
    fn test_close_releases_store() {
        let db = Database::in_memory().unwrap();
        db.close().unwrap();
    }
}
