//! SQL implementation of the template store.
//!
//! Templates, their manager assignments and the manager directory are
//! recruiter-maintained configuration; this repository only reads them,
//! except for flipping the availability_status flag of an assignment.

use crate::error::DbError;
use crate::repositories::opt_text;
use crate::DbClient;
use panelbook_common::models::{ManagerName, ManagerRole, PanelRuleSet, TemplateSummary};
use panelbook_common::services::{BoxFuture, TemplateStore};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of the template store
#[derive(Debug, Clone)]
pub struct SqlTemplateRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlTemplateRepository {
    /// Create a new SQL template repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the template, assignment and manager tables if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing template schema");

        let queries = [
            r#"
            CREATE TABLE IF NOT EXISTS interview_templates (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                interview_length_minutes INTEGER NOT NULL,
                location_type TEXT NOT NULL DEFAULT 'online',
                online_link TEXT,
                in_person_location TEXT,
                candidate_briefing_text TEXT,
                required_interviewers_count INTEGER NOT NULL DEFAULT 1,
                active INTEGER NOT NULL DEFAULT 1
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS template_hiring_managers (
                template_id TEXT NOT NULL,
                hiring_manager_id TEXT NOT NULL,
                role_type TEXT NOT NULL DEFAULT 'optional',
                availability_status TEXT NOT NULL DEFAULT 'requested',
                PRIMARY KEY (template_id, hiring_manager_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS hiring_managers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL
            )
            "#,
        ];

        for query in queries {
            self.db_client.execute(query).await?;
        }

        info!("Template schema initialized successfully");
        Ok(())
    }

    fn template_from_row(row: &AnyRow) -> Result<TemplateSummary, DbError> {
        Ok(TemplateSummary {
            id: row
                .try_get("id")
                .map_err(|e| DbError::RowError(e.to_string()))?,
            name: row
                .try_get("name")
                .map_err(|e| DbError::RowError(e.to_string()))?,
            interview_length_minutes: row
                .try_get("interview_length_minutes")
                .map_err(|e| DbError::RowError(e.to_string()))?,
            location_type: row
                .try_get("location_type")
                .map_err(|e| DbError::RowError(e.to_string()))?,
            online_link: opt_text(row, "online_link")?,
            in_person_location: opt_text(row, "in_person_location")?,
            candidate_briefing_text: opt_text(row, "candidate_briefing_text")?,
            required_interviewers_count: row
                .try_get("required_interviewers_count")
                .map_err(|e| DbError::RowError(e.to_string()))?,
            active: row
                .try_get::<i64, _>("active")
                .map_err(|e| DbError::RowError(e.to_string()))?
                != 0,
        })
    }
}

impl TemplateStore for SqlTemplateRepository {
    type Error = DbError;

    fn template(&self, template_id: &str) -> BoxFuture<'_, Option<TemplateSummary>, DbError> {
        let template_id = template_id.to_string();
        Box::pin(async move {
            let query = r#"
                SELECT id, name, interview_length_minutes, location_type, online_link,
                       in_person_location, candidate_briefing_text,
                       required_interviewers_count, active
                FROM interview_templates
                WHERE id = $1
            "#;

            let row = sqlx::query(query)
                .bind(&template_id)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to fetch template {}: {}", template_id, e);
                    DbError::QueryError(e.to_string())
                })?;

            row.as_ref().map(Self::template_from_row).transpose()
        })
    }

    fn panel_rules(
        &self,
        template_id: &str,
    ) -> BoxFuture<'_, Option<PanelRuleSet>, DbError> {
        let template_id = template_id.to_string();
        Box::pin(async move {
            debug!("Loading panel rules for template {}", template_id);

            let count_row = sqlx::query(
                "SELECT required_interviewers_count FROM interview_templates WHERE id = $1",
            )
            .bind(&template_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to fetch template {}: {}", template_id, e);
                DbError::QueryError(e.to_string())
            })?;

            let Some(count_row) = count_row else {
                return Ok(None);
            };
            let required_count: i64 = count_row
                .try_get("required_interviewers_count")
                .map_err(|e| DbError::RowError(e.to_string()))?;

            let rows = sqlx::query(
                r#"
                SELECT hiring_manager_id, role_type
                FROM template_hiring_managers
                WHERE template_id = $1
                "#,
            )
            .bind(&template_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to fetch assignments for {}: {}", template_id, e);
                DbError::QueryError(e.to_string())
            })?;

            let mut assignments = Vec::with_capacity(rows.len());
            for row in &rows {
                let manager_id: String = row
                    .try_get("hiring_manager_id")
                    .map_err(|e| DbError::RowError(e.to_string()))?;
                let role_raw: String = row
                    .try_get("role_type")
                    .map_err(|e| DbError::RowError(e.to_string()))?;
                let role: ManagerRole = role_raw.parse().map_err(DbError::RowError)?;
                assignments.push((manager_id, role));
            }

            Ok(Some(PanelRuleSet::from_assignments(
                required_count.max(0) as usize,
                &assignments,
            )))
        })
    }

    fn manager_names(
        &self,
        manager_ids: &[String],
    ) -> BoxFuture<'_, Vec<ManagerName>, DbError> {
        let manager_ids = manager_ids.to_vec();
        Box::pin(async move {
            if manager_ids.is_empty() {
                return Ok(Vec::new());
            }

            // sqlx::Any has no array binds, so build the placeholder list.
            let placeholders = (1..=manager_ids.len())
                .map(|i| format!("${i}"))
                .collect::<Vec<_>>()
                .join(", ");
            let query =
                format!("SELECT id, name FROM hiring_managers WHERE id IN ({placeholders})");

            let mut q = sqlx::query(&query);
            for id in &manager_ids {
                q = q.bind(id);
            }

            let rows = q.fetch_all(self.db_client.pool()).await.map_err(|e| {
                error!("Failed to fetch manager names: {}", e);
                DbError::QueryError(e.to_string())
            })?;

            rows.iter()
                .map(|row| {
                    Ok(ManagerName {
                        id: row
                            .try_get("id")
                            .map_err(|e| DbError::RowError(e.to_string()))?,
                        name: row
                            .try_get("name")
                            .map_err(|e| DbError::RowError(e.to_string()))?,
                    })
                })
                .collect()
        })
    }

    fn mark_availability_provided(&self, manager_id: &str) -> BoxFuture<'_, u64, DbError> {
        let manager_id = manager_id.to_string();
        Box::pin(async move {
            debug!("Marking availability provided for manager {}", manager_id);

            let query = r#"
                UPDATE template_hiring_managers
                SET availability_status = 'provided'
                WHERE hiring_manager_id = $1 AND availability_status = 'requested'
            "#;

            let result = sqlx::query(query)
                .bind(&manager_id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!(
                        "Failed to mark availability provided for {}: {}",
                        manager_id, e
                    );
                    DbError::QueryError(e.to_string())
                })?;

            Ok(result.rows_affected())
        })
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::repositories::testutil::temp_client;

    async fn repository() -> SqlTemplateRepository {
        let repo = SqlTemplateRepository::new(temp_client().await);
        repo.init_schema().await.unwrap();
        repo
    }

    // Recruiters rarely fill every optional field; a template with NULL
    // online_link, in_person_location and briefing text must still load.
    #[tokio::test]
    async fn template_with_null_optional_fields_round_trips() {
        let repo = repository().await;
        repo.db_client
            .execute(
                "INSERT INTO interview_templates \
                 (id, name, interview_length_minutes, location_type, required_interviewers_count, active) \
                 VALUES ('tpl1', 'Engineering Loop', 60, 'online', 2, 1)",
            )
            .await
            .unwrap();

        let template = repo.template("tpl1").await.unwrap().unwrap();
        assert_eq!(template.name, "Engineering Loop");
        assert_eq!(template.interview_length_minutes, 60);
        assert_eq!(template.required_interviewers_count, 2);
        assert!(template.active);
        assert_eq!(template.online_link, None);
        assert_eq!(template.in_person_location, None);
        assert_eq!(template.candidate_briefing_text, None);
    }

    #[tokio::test]
    async fn panel_rules_group_assignments_by_role() {
        let repo = repository().await;
        repo.db_client
            .execute(
                "INSERT INTO interview_templates \
                 (id, name, interview_length_minutes, location_type, required_interviewers_count, active) \
                 VALUES ('tpl1', 'Loop', 45, 'online', 2, 1)",
            )
            .await
            .unwrap();
        repo.db_client
            .execute(
                "INSERT INTO template_hiring_managers (template_id, hiring_manager_id, role_type) VALUES \
                 ('tpl1', 'm1', 'mandatory'), ('tpl1', 'm2', 'at_least_one'), ('tpl1', 'm3', 'optional')",
            )
            .await
            .unwrap();

        let rules = repo.panel_rules("tpl1").await.unwrap().unwrap();
        assert_eq!(rules.required_count, 2);
        assert_eq!(rules.mandatory, vec!["m1".to_string()]);
        assert_eq!(rules.at_least_one, vec!["m2".to_string()]);
    }
}
