use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{info, warn};

use super::{
    AssessmentDetail, AssessmentSummary, BacklogItem, BusinessRepository, Collection, Company,
    Contact, Project, Task, TaskStatus, UserStory,
};
use crate::config::DatabaseConfig;
use crate::error::{RepositoryError, RepositoryResult};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed business data repository
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (or create) the database and apply migrations
    pub async fn new(config: &DatabaseConfig) -> RepositoryResult<Self> {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RepositoryError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| RepositoryError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let repository = Self { pool };
        repository.run_migrations().await?;

        Ok(repository)
    }

    /// Create an in-memory repository with migrations applied
    pub async fn new_in_memory() -> RepositoryResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            RepositoryError::Connection {
                message: format!("Invalid database URL: {}", e),
            }
        })?;

        // Each connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let repository = Self { pool };
        repository.run_migrations().await?;

        Ok(repository)
    }

    async fn run_migrations(&self) -> RepositoryResult<()> {
        info!("Running database migrations...");

        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Migration {
                message: format!("Failed to run migrations: {}", e),
            })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying pool for seeding and ad-hoc queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl BusinessRepository for SqliteRepository {
    async fn list_projects(&self) -> RepositoryResult<Vec<Project>> {
        let rows: Vec<ProjectRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, status, company_name
            FROM projects
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_tasks(&self, project_id: &str) -> RepositoryResult<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            r#"
            SELECT id, project_id, title, status, due_date, assignee
            FROM tasks
            WHERE project_id = ?
            ORDER BY due_date IS NULL, due_date ASC, title ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_all_tasks(&self) -> RepositoryResult<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            r#"
            SELECT id, project_id, title, status, due_date, assignee
            FROM tasks
            ORDER BY project_id ASC, due_date IS NULL, due_date ASC, title ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_contacts(&self) -> RepositoryResult<Vec<Contact>> {
        let rows: Vec<ContactRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, company_name
            FROM contacts
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_companies(&self) -> RepositoryResult<Vec<Company>> {
        let rows: Vec<CompanyRow> = sqlx::query_as(
            r#"
            SELECT id, name, status, website
            FROM companies
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_collections(&self) -> RepositoryResult<Vec<Collection>> {
        let rows: Vec<CollectionRow> = sqlx::query_as(
            r#"
            SELECT id, name, description
            FROM collections
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_user_stories(
        &self,
        collection_id: Option<&str>,
    ) -> RepositoryResult<Vec<UserStory>> {
        let rows: Vec<UserStoryRow> = match collection_id {
            Some(collection_id) => {
                sqlx::query_as(
                    r#"
                    SELECT id, collection_id, title, description, priority
                    FROM user_stories
                    WHERE collection_id = ?
                    ORDER BY title ASC
                    "#,
                )
                .bind(collection_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, collection_id, title, description, priority
                    FROM user_stories
                    ORDER BY title ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_backlog_items(&self, project_id: &str) -> RepositoryResult<Vec<BacklogItem>> {
        let rows: Vec<BacklogItemRow> = sqlx::query_as(
            r#"
            SELECT id, project_id, title, status, priority
            FROM backlog_items
            WHERE project_id = ?
            ORDER BY priority IS NULL, priority ASC, title ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_assessments(&self) -> RepositoryResult<Vec<AssessmentSummary>> {
        let rows: Vec<AssessmentSummaryRow> = sqlx::query_as(
            r#"
            SELECT id, name, company_name, created_at
            FROM assessments
            ORDER BY created_at DESC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_assessments_by_name(
        &self,
        name: &str,
    ) -> RepositoryResult<Vec<AssessmentDetail>> {
        let rows: Vec<AssessmentDetailRow> = sqlx::query_as(
            r#"
            SELECT id, name, company_name, form_data, created_at
            FROM assessments
            WHERE name = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

// Internal row types for SQLx mapping
#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    description: Option<String>,
    status: Option<String>,
    company_name: Option<String>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            status: row.status,
            company_name: row.company_name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    project_id: String,
    title: String,
    status: String,
    due_date: Option<String>,
    assignee: Option<String>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e| {
            warn!(task_id = %row.id, error = %e, "Treating unrecognized task status as todo");
            TaskStatus::Todo
        });

        Self {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            status,
            due_date: row.due_date,
            assignee: row.assignee,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: String,
    name: String,
    email: Option<String>,
    company_name: Option<String>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            company_name: row.company_name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CompanyRow {
    id: String,
    name: String,
    status: Option<String>,
    website: Option<String>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            status: row.status,
            website: row.website,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CollectionRow {
    id: String,
    name: String,
    description: Option<String>,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserStoryRow {
    id: String,
    collection_id: Option<String>,
    title: String,
    description: Option<String>,
    priority: Option<String>,
}

impl From<UserStoryRow> for UserStory {
    fn from(row: UserStoryRow) -> Self {
        Self {
            id: row.id,
            collection_id: row.collection_id,
            title: row.title,
            description: row.description,
            priority: row.priority,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BacklogItemRow {
    id: String,
    project_id: String,
    title: String,
    status: Option<String>,
    priority: Option<i64>,
}

impl From<BacklogItemRow> for BacklogItem {
    fn from(row: BacklogItemRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            status: row.status,
            priority: row.priority,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AssessmentSummaryRow {
    id: String,
    name: String,
    company_name: Option<String>,
    created_at: Option<String>,
}

impl From<AssessmentSummaryRow> for AssessmentSummary {
    fn from(row: AssessmentSummaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            company_name: row.company_name,
            created_at: parse_timestamp(row.created_at),
        }
    }
}

#[derive(sqlx::FromRow)]
struct AssessmentDetailRow {
    id: String,
    name: String,
    company_name: Option<String>,
    form_data: Option<String>,
    created_at: Option<String>,
}

impl From<AssessmentDetailRow> for AssessmentDetail {
    fn from(row: AssessmentDetailRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            company_name: row.company_name,
            form_data: row
                .form_data
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or(serde_json::Value::Null),
            created_at: parse_timestamp(row.created_at),
        }
    }
}
