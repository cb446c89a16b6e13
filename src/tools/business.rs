use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::registry::{ToolDefinition, ToolHandler, ToolRegistry};
use crate::contract::{FieldKind, Shape};
use crate::error::{RepositoryError, ToolError, ToolResult};
use crate::repository::BusinessRepository;

const COMPANY_NAME_DESC: &str = "Company name to filter by (case-insensitive exact match)";

/// Read-only business query a tool performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessQuery {
    ListProjects,
    ListTasks,
    ListOpenTasks,
    ListContacts,
    ListCompanies,
    ListCollections,
    ListUserStories,
    ListBacklogItems,
    ListAssessments,
    GetAssessmentDetails,
}

impl BusinessQuery {
    pub const ALL: [BusinessQuery; 10] = [
        BusinessQuery::ListProjects,
        BusinessQuery::ListTasks,
        BusinessQuery::ListOpenTasks,
        BusinessQuery::ListContacts,
        BusinessQuery::ListCompanies,
        BusinessQuery::ListCollections,
        BusinessQuery::ListUserStories,
        BusinessQuery::ListBacklogItems,
        BusinessQuery::ListAssessments,
        BusinessQuery::GetAssessmentDetails,
    ];

    /// Tool name as advertised to the backend
    pub fn tool_name(&self) -> &'static str {
        match self {
            BusinessQuery::ListProjects => "list_projects",
            BusinessQuery::ListTasks => "list_tasks",
            BusinessQuery::ListOpenTasks => "list_open_tasks",
            BusinessQuery::ListContacts => "list_contacts",
            BusinessQuery::ListCompanies => "list_companies",
            BusinessQuery::ListCollections => "list_collections",
            BusinessQuery::ListUserStories => "list_user_stories",
            BusinessQuery::ListBacklogItems => "list_backlog_items",
            BusinessQuery::ListAssessments => "list_assessments",
            BusinessQuery::GetAssessmentDetails => "get_assessment_details",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            BusinessQuery::ListProjects => "List projects, optionally for one company",
            BusinessQuery::ListTasks => "List all tasks of a project with status and due date",
            BusinessQuery::ListOpenTasks => {
                "List tasks that are not done, for one project or across all projects"
            }
            BusinessQuery::ListContacts => {
                "List contacts with name, email and company, optionally for one company"
            }
            BusinessQuery::ListCompanies => "List companies with status and website",
            BusinessQuery::ListCollections => "List user story collections",
            BusinessQuery::ListUserStories => {
                "List user stories, optionally within one collection"
            }
            BusinessQuery::ListBacklogItems => "List backlog items of a project",
            BusinessQuery::ListAssessments => {
                "List GTM assessments by name and company, without their answers"
            }
            BusinessQuery::GetAssessmentDetails => {
                "Get the full answers of an assessment by name; use this for any question about an assessment's contents"
            }
        }
    }

    fn input(&self) -> Shape {
        let company = || Shape::new().optional("companyName", COMPANY_NAME_DESC, non_blank());
        let project = |required: bool| {
            let desc = "Project id";
            if required {
                Shape::new().required("projectId", desc, non_blank())
            } else {
                Shape::new().optional("projectId", desc, non_blank())
            }
        };

        match self {
            BusinessQuery::ListProjects
            | BusinessQuery::ListContacts
            | BusinessQuery::ListAssessments => company(),
            BusinessQuery::ListTasks | BusinessQuery::ListBacklogItems => project(true),
            BusinessQuery::ListOpenTasks => project(false),
            BusinessQuery::ListCompanies | BusinessQuery::ListCollections => Shape::new(),
            BusinessQuery::ListUserStories => {
                Shape::new().optional("collectionId", "Collection id", non_blank())
            }
            BusinessQuery::GetAssessmentDetails => Shape::new()
                .required("assessmentName", "Exact assessment name", non_blank())
                .optional(
                    "companyName",
                    "Company name to disambiguate assessments sharing a name",
                    non_blank(),
                ),
        }
    }

    fn output(&self) -> Shape {
        let listing = |key: &'static str| {
            Shape::new()
                .required(key, "Matching records", FieldKind::Records)
                .required(
                    "count",
                    "Number of records",
                    FieldKind::Integer {
                        min: Some(0),
                        max: None,
                    },
                )
        };

        match self {
            BusinessQuery::ListProjects => listing("projects"),
            BusinessQuery::ListTasks | BusinessQuery::ListOpenTasks => listing("tasks"),
            BusinessQuery::ListContacts => listing("contacts"),
            BusinessQuery::ListCompanies => listing("companies"),
            BusinessQuery::ListCollections => listing("collections"),
            BusinessQuery::ListUserStories => listing("userStories"),
            BusinessQuery::ListBacklogItems => listing("backlogItems"),
            BusinessQuery::ListAssessments => listing("assessments"),
            BusinessQuery::GetAssessmentDetails => Shape::new()
                .required("found", "Whether a matching assessment exists", FieldKind::Boolean)
                .optional("assessment", "The assessment with its form data", FieldKind::Object),
        }
    }
}

fn non_blank() -> FieldKind {
    FieldKind::Text { min_len: 1 }
}

/// Tool handler backed by a [`BusinessRepository`].
pub struct BusinessTool {
    query: BusinessQuery,
    repository: Arc<dyn BusinessRepository>,
}

impl BusinessTool {
    pub fn new(query: BusinessQuery, repository: Arc<dyn BusinessRepository>) -> Self {
        Self { query, repository }
    }

    pub fn definition(
        query: BusinessQuery,
        repository: Arc<dyn BusinessRepository>,
    ) -> ToolDefinition {
        ToolDefinition::new(
            query.tool_name(),
            query.description(),
            query.input(),
            query.output(),
            Arc::new(Self::new(query, repository)),
        )
    }

    fn failed(&self, err: RepositoryError) -> ToolError {
        ToolError::Execution {
            tool_name: self.query.tool_name().to_string(),
            message: err.to_string(),
        }
    }

    fn listing<T: Serialize>(&self, key: &str, items: &[T]) -> ToolResult<Value> {
        let records = serde_json::to_value(items).map_err(|e| ToolError::Execution {
            tool_name: self.query.tool_name().to_string(),
            message: format!("Failed to encode {}: {}", key, e),
        })?;
        Ok(json!({ key: records, "count": items.len() }))
    }
}

#[async_trait]
impl ToolHandler for BusinessTool {
    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let arg = |key: &str| arguments.get(key).and_then(Value::as_str);
        let repo = self.repository.as_ref();

        match self.query {
            BusinessQuery::ListProjects => {
                let mut projects = repo.list_projects().await.map_err(|e| self.failed(e))?;
                if let Some(company) = arg("companyName") {
                    projects.retain(|p| company_matches(p.company_name.as_deref(), company));
                }
                self.listing("projects", &projects)
            }
            BusinessQuery::ListTasks => {
                let project_id = arg("projectId").unwrap_or_default();
                let tasks = repo
                    .list_tasks(project_id)
                    .await
                    .map_err(|e| self.failed(e))?;
                self.listing("tasks", &tasks)
            }
            BusinessQuery::ListOpenTasks => {
                let mut tasks = match arg("projectId") {
                    Some(project_id) => repo.list_tasks(project_id).await,
                    None => repo.list_all_tasks().await,
                }
                .map_err(|e| self.failed(e))?;
                tasks.retain(|t| t.status.is_open());
                self.listing("tasks", &tasks)
            }
            BusinessQuery::ListContacts => {
                let mut contacts = repo.list_contacts().await.map_err(|e| self.failed(e))?;
                if let Some(company) = arg("companyName") {
                    contacts.retain(|c| company_matches(c.company_name.as_deref(), company));
                }
                self.listing("contacts", &contacts)
            }
            BusinessQuery::ListCompanies => {
                let companies = repo.list_companies().await.map_err(|e| self.failed(e))?;
                self.listing("companies", &companies)
            }
            BusinessQuery::ListCollections => {
                let collections = repo.list_collections().await.map_err(|e| self.failed(e))?;
                self.listing("collections", &collections)
            }
            BusinessQuery::ListUserStories => {
                let stories = repo
                    .list_user_stories(arg("collectionId"))
                    .await
                    .map_err(|e| self.failed(e))?;
                self.listing("userStories", &stories)
            }
            BusinessQuery::ListBacklogItems => {
                let project_id = arg("projectId").unwrap_or_default();
                let items = repo
                    .list_backlog_items(project_id)
                    .await
                    .map_err(|e| self.failed(e))?;
                self.listing("backlogItems", &items)
            }
            BusinessQuery::ListAssessments => {
                let mut assessments = repo.list_assessments().await.map_err(|e| self.failed(e))?;
                if let Some(company) = arg("companyName") {
                    assessments.retain(|a| company_matches(a.company_name.as_deref(), company));
                }
                self.listing("assessments", &assessments)
            }
            BusinessQuery::GetAssessmentDetails => {
                let name = arg("assessmentName").unwrap_or_default().trim();
                let mut matches = repo
                    .find_assessments_by_name(name)
                    .await
                    .map_err(|e| self.failed(e))?;
                if let Some(company) = arg("companyName") {
                    matches.retain(|a| company_matches(a.company_name.as_deref(), company));
                }

                match matches.into_iter().next() {
                    Some(detail) => {
                        let assessment =
                            serde_json::to_value(detail).map_err(|e| ToolError::Execution {
                                tool_name: self.query.tool_name().to_string(),
                                message: format!("Failed to encode assessment: {}", e),
                            })?;
                        Ok(json!({ "found": true, "assessment": assessment }))
                    }
                    None => Ok(json!({ "found": false, "assessment": null })),
                }
            }
        }
    }
}

/// Case-insensitive exact company match after trimming both sides.
pub fn company_matches(candidate: Option<&str>, wanted: &str) -> bool {
    candidate
        .map(|c| c.trim().to_lowercase() == wanted.trim().to_lowercase())
        .unwrap_or(false)
}

/// Registry holding every built-in business tool.
pub fn business_registry(repository: Arc<dyn BusinessRepository>) -> ToolResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for query in BusinessQuery::ALL {
        registry.register(BusinessTool::definition(query, repository.clone()))?;
    }
    Ok(registry)
}
