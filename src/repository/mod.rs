//! Read-only access to business data.
//!
//! The agent's tools query projects, tasks, contacts, companies, user stories,
//! backlog items and assessments through [`BusinessRepository`]. Filtering by
//! company name happens in the tool handlers, not here.

mod sqlite;

pub use sqlite::SqliteRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RepositoryResult;

/// A client project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub company_name: Option<String>,
}

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Blocked,
    Done,
}

impl TaskStatus {
    /// Get the status as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Done => "done",
        }
    }

    /// Anything not done counts as open.
    pub fn is_open(&self) -> bool {
        !matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" => Ok(TaskStatus::InProgress),
            "blocked" => Ok(TaskStatus::Blocked),
            "done" => Ok(TaskStatus::Done),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// A task belonging to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub status: TaskStatus,
    pub due_date: Option<String>,
    pub assignee: Option<String>,
}

/// A person at a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub company_name: Option<String>,
}

/// A client or prospect company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub status: Option<String>,
    pub website: Option<String>,
}

/// A named group of user stories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// A user story, optionally filed under a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub id: String,
    pub collection_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
}

/// A backlog entry for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogItem {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub status: Option<String>,
    pub priority: Option<i64>,
}

/// Assessment listing entry, without form data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub id: String,
    pub name: String,
    pub company_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A full assessment including its raw form data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDetail {
    pub id: String,
    pub name: String,
    pub company_name: Option<String>,
    pub form_data: serde_json::Value,
    pub created_at: Option<DateTime<Utc>>,
}

/// Read-only business data source.
#[async_trait]
pub trait BusinessRepository: Send + Sync {
    async fn list_projects(&self) -> RepositoryResult<Vec<Project>>;

    async fn list_tasks(&self, project_id: &str) -> RepositoryResult<Vec<Task>>;

    /// Tasks across every project.
    async fn list_all_tasks(&self) -> RepositoryResult<Vec<Task>>;

    async fn list_contacts(&self) -> RepositoryResult<Vec<Contact>>;

    async fn list_companies(&self) -> RepositoryResult<Vec<Company>>;

    async fn list_collections(&self) -> RepositoryResult<Vec<Collection>>;

    /// User stories, restricted to one collection when given.
    async fn list_user_stories(
        &self,
        collection_id: Option<&str>,
    ) -> RepositoryResult<Vec<UserStory>>;

    async fn list_backlog_items(&self, project_id: &str) -> RepositoryResult<Vec<BacklogItem>>;

    async fn list_assessments(&self) -> RepositoryResult<Vec<AssessmentSummary>>;

    /// Assessments whose name matches exactly, newest first.
    async fn find_assessments_by_name(&self, name: &str)
        -> RepositoryResult<Vec<AssessmentDetail>>;
}
