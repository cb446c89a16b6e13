//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

use gtm_analyst::error::RepositoryResult;
use gtm_analyst::repository::{
    AssessmentDetail, AssessmentSummary, BacklogItem, BusinessRepository, Collection, Company,
    Contact, Project, Task, TaskStatus, UserStory,
};

/// In-memory business data with a query counter.
#[derive(Default)]
pub struct FakeRepository {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub contacts: Vec<Contact>,
    pub companies: Vec<Company>,
    pub collections: Vec<Collection>,
    pub user_stories: Vec<UserStory>,
    pub backlog_items: Vec<BacklogItem>,
    pub assessments: Vec<AssessmentDetail>,
    queries: AtomicUsize,
}

impl FakeRepository {
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }

    /// Two companies, two projects, four tasks (three open), two assessments.
    pub fn seeded() -> Self {
        Self {
            projects: vec![
                project("p1", "Website Relaunch", "Acme Corp"),
                project("p2", "CRM Migration", "Globex"),
            ],
            tasks: vec![
                task("t1", "p1", "Draft copy", TaskStatus::Todo),
                task("t2", "p1", "Design review", TaskStatus::InProgress),
                task("t3", "p1", "Launch", TaskStatus::Done),
                task("t4", "p2", "Export contacts", TaskStatus::Blocked),
            ],
            contacts: vec![
                Contact {
                    id: "c1".to_string(),
                    name: "Ada Lovelace".to_string(),
                    email: Some("ada@acme.test".to_string()),
                    company_name: Some("Acme Corp".to_string()),
                },
                Contact {
                    id: "c2".to_string(),
                    name: "Hank Scorpio".to_string(),
                    email: None,
                    company_name: Some("Globex".to_string()),
                },
            ],
            companies: vec![
                Company {
                    id: "co1".to_string(),
                    name: "Acme Corp".to_string(),
                    status: Some("customer".to_string()),
                    website: Some("https://acme.test".to_string()),
                },
                Company {
                    id: "co2".to_string(),
                    name: "Globex".to_string(),
                    status: Some("prospect".to_string()),
                    website: None,
                },
            ],
            collections: vec![Collection {
                id: "col1".to_string(),
                name: "Onboarding".to_string(),
                description: None,
            }],
            user_stories: vec![
                UserStory {
                    id: "us1".to_string(),
                    collection_id: Some("col1".to_string()),
                    title: "Sign up with SSO".to_string(),
                    description: None,
                    priority: Some("high".to_string()),
                },
                UserStory {
                    id: "us2".to_string(),
                    collection_id: None,
                    title: "Export report".to_string(),
                    description: None,
                    priority: None,
                },
            ],
            backlog_items: vec![BacklogItem {
                id: "b1".to_string(),
                project_id: "p1".to_string(),
                title: "Dark mode".to_string(),
                status: Some("proposed".to_string()),
                priority: Some(2),
            }],
            assessments: vec![
                assessment("a1", "Q3 GTM Review", "Acme Corp"),
                assessment("a2", "Q3 GTM Review", "Globex"),
            ],
            queries: AtomicUsize::new(0),
        }
    }
}

fn project(id: &str, name: &str, company: &str) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        status: Some("active".to_string()),
        company_name: Some(company.to_string()),
    }
}

fn task(id: &str, project_id: &str, title: &str, status: TaskStatus) -> Task {
    Task {
        id: id.to_string(),
        project_id: project_id.to_string(),
        title: title.to_string(),
        status,
        due_date: None,
        assignee: None,
    }
}

fn assessment(id: &str, name: &str, company: &str) -> AssessmentDetail {
    AssessmentDetail {
        id: id.to_string(),
        name: name.to_string(),
        company_name: Some(company.to_string()),
        form_data: json!({"company": company, "kpis": "Pipeline coverage"}),
        created_at: None,
    }
}

#[async_trait]
impl BusinessRepository for FakeRepository {
    async fn list_projects(&self) -> RepositoryResult<Vec<Project>> {
        self.hit();
        Ok(self.projects.clone())
    }

    async fn list_tasks(&self, project_id: &str) -> RepositoryResult<Vec<Task>> {
        self.hit();
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_all_tasks(&self) -> RepositoryResult<Vec<Task>> {
        self.hit();
        Ok(self.tasks.clone())
    }

    async fn list_contacts(&self) -> RepositoryResult<Vec<Contact>> {
        self.hit();
        Ok(self.contacts.clone())
    }

    async fn list_companies(&self) -> RepositoryResult<Vec<Company>> {
        self.hit();
        Ok(self.companies.clone())
    }

    async fn list_collections(&self) -> RepositoryResult<Vec<Collection>> {
        self.hit();
        Ok(self.collections.clone())
    }

    async fn list_user_stories(
        &self,
        collection_id: Option<&str>,
    ) -> RepositoryResult<Vec<UserStory>> {
        self.hit();
        Ok(self
            .user_stories
            .iter()
            .filter(|s| collection_id.is_none() || s.collection_id.as_deref() == collection_id)
            .cloned()
            .collect())
    }

    async fn list_backlog_items(&self, project_id: &str) -> RepositoryResult<Vec<BacklogItem>> {
        self.hit();
        Ok(self
            .backlog_items
            .iter()
            .filter(|b| b.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_assessments(&self) -> RepositoryResult<Vec<AssessmentSummary>> {
        self.hit();
        Ok(self
            .assessments
            .iter()
            .map(|a| AssessmentSummary {
                id: a.id.clone(),
                name: a.name.clone(),
                company_name: a.company_name.clone(),
                created_at: a.created_at,
            })
            .collect())
    }

    async fn find_assessments_by_name(
        &self,
        name: &str,
    ) -> RepositoryResult<Vec<AssessmentDetail>> {
        self.hit();
        Ok(self
            .assessments
            .iter()
            .filter(|a| a.name == name)
            .cloned()
            .collect())
    }
}
