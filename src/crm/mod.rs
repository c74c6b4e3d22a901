//! The CRM catalog: list records, their query descriptors, and the typed
//! operations the console runs against the API.

pub mod forms;
pub mod graphql;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::{CachePolicy, QueryClient};
use crate::error::Result;
use crate::listview::ListQueryDescriptor;
use graphql::*;

pub const STUDENTS_OPERATION: &str = "Students";
pub const CONTACTS_OPERATION: &str = "Contacts";
pub const TAGS_OPERATION: &str = "Tags";
pub const RUNS_OPERATION: &str = "Runs";
pub const STUDENT_STATS_OPERATION: &str = "StudentStatsQuery";

const META_SELECTION: &str = "meta { total page limit totalPages hasNextPage hasPreviousPage }";

/// A record type that can back a list view.
pub trait CrmRecord: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    fn descriptor() -> ListQueryDescriptor;

    /// Column headers for table output.
    fn headers() -> &'static [&'static str];

    /// One table row, in `headers()` order.
    fn cells(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub status: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A scraping run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub items_scraped: u64,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

fn when(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(crate::display::format_timestamp)
        .unwrap_or_else(|| "-".to_string())
}

impl CrmRecord for Student {
    fn descriptor() -> ListQueryDescriptor {
        ListQueryDescriptor::new(
            STUDENTS_OPERATION,
            format!(
                "query {STUDENTS_OPERATION}($page: Int, $limit: Int, $search: String, $status: String, $tagId: ID) {{ \
                 students(page: $page, limit: $limit, search: $search, status: $status, tagId: $tagId) {{ \
                 data {{ id firstName lastName email status tags {{ id name color }} createdAt }} {META_SELECTION} }} }}"
            ),
            "students",
        )
        .with_filter_keys(["status", "tagId"])
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Email", "Status", "Tags", "Created"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.full_name(),
            or_dash(&self.email),
            self.status.clone(),
            self.tags
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            when(&self.created_at),
        ]
    }
}

impl CrmRecord for Contact {
    fn descriptor() -> ListQueryDescriptor {
        ListQueryDescriptor::new(
            CONTACTS_OPERATION,
            format!(
                "query {CONTACTS_OPERATION}($page: Int, $limit: Int, $search: String, $source: String, $company: String) {{ \
                 contacts(page: $page, limit: $limit, search: $search, source: $source, company: $company) {{ \
                 data {{ id name email phone company source createdAt }} {META_SELECTION} }} }}"
            ),
            "contacts",
        )
        .with_filter_keys(["source", "company"])
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Email", "Phone", "Company", "Source"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            or_dash(&self.email),
            or_dash(&self.phone),
            or_dash(&self.company),
            or_dash(&self.source),
        ]
    }
}

impl CrmRecord for Tag {
    fn descriptor() -> ListQueryDescriptor {
        let no_filters: [&str; 0] = [];
        ListQueryDescriptor::new(
            TAGS_OPERATION,
            format!(
                "query {TAGS_OPERATION}($page: Int, $limit: Int, $search: String) {{ \
                 tags(page: $page, limit: $limit, search: $search) {{ \
                 data {{ id name color }} {META_SELECTION} }} }}"
            ),
            "tags",
        )
        .with_filter_keys(no_filters)
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Color"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone(), or_dash(&self.color)]
    }
}

impl CrmRecord for Run {
    fn descriptor() -> ListQueryDescriptor {
        ListQueryDescriptor::new(
            RUNS_OPERATION,
            format!(
                "query {RUNS_OPERATION}($page: Int, $limit: Int, $search: String, $status: String) {{ \
                 runs(page: $page, limit: $limit, search: $search, status: $status) {{ \
                 data {{ id name status itemsScraped startedAt finishedAt errorMessage }} {META_SELECTION} }} }}"
            ),
            "runs",
        )
        .with_filter_keys(["status"])
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Status", "Items", "Started", "Finished"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.status.clone(),
            self.items_scraped.to_string(),
            when(&self.started_at),
            when(&self.finished_at),
        ]
    }
}

/// The list pages of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EntityKind {
    Students,
    Contacts,
    Tags,
    Runs,
}

impl EntityKind {
    pub fn descriptor(self) -> ListQueryDescriptor {
        match self {
            EntityKind::Students => Student::descriptor(),
            EntityKind::Contacts => Contact::descriptor(),
            EntityKind::Tags => Tag::descriptor(),
            EntityKind::Runs => Run::descriptor(),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            EntityKind::Students => "Students",
            EntityKind::Contacts => "Contacts",
            EntityKind::Tags => "Tags",
            EntityKind::Runs => "Runs",
        }
    }
}

// Typed operations

/// Independent of any list; cached like the lists are.
pub async fn student_stats(client: &QueryClient) -> Result<StudentStats> {
    let operation = StudentStatsQuery::build(());
    Ok(client
        .run(&operation, CachePolicy::CacheFirst)
        .await?
        .student_stats)
}

/// Billing is never served from cache.
pub async fn billing_summary(client: &QueryClient) -> Result<BillingSummary> {
    let operation = BillingSummaryQuery::build(());
    Ok(client
        .run(&operation, CachePolicy::NetworkOnly)
        .await?
        .billing_summary)
}

// Tag edits show up in student rows too.
const TAG_DEPENDENTS: &[&str] = &[TAGS_OPERATION, STUDENTS_OPERATION];
const STUDENT_DEPENDENTS: &[&str] = &[STUDENTS_OPERATION, STUDENT_STATS_OPERATION];

pub async fn create_tag(client: &QueryClient, form: &forms::TagForm) -> Result<TagRef> {
    let operation = CreateTagMutation::build(CreateTagVariables {
        input: form.validate()?,
    });
    Ok(client.mutate(&operation, TAG_DEPENDENTS).await?.create_tag)
}

pub async fn update_tag(client: &QueryClient, id: &str, patch: &forms::TagPatch) -> Result<TagRef> {
    let operation = UpdateTagMutation::build(UpdateTagVariables {
        id: cynic::Id::new(id),
        input: patch.validate()?,
    });
    Ok(client.mutate(&operation, TAG_DEPENDENTS).await?.update_tag)
}

pub async fn delete_tag(client: &QueryClient, id: &str) -> Result<TagRef> {
    let operation = DeleteTagMutation::build(IdVariables {
        id: cynic::Id::new(id),
    });
    Ok(client.mutate(&operation, TAG_DEPENDENTS).await?.delete_tag)
}

pub async fn create_student(client: &QueryClient, form: &forms::StudentForm) -> Result<StudentRef> {
    let operation = CreateStudentMutation::build(CreateStudentVariables {
        input: form.validate()?,
    });
    Ok(client
        .mutate(&operation, STUDENT_DEPENDENTS)
        .await?
        .create_student)
}

pub async fn update_student(
    client: &QueryClient,
    id: &str,
    patch: &forms::StudentPatch,
) -> Result<StudentRef> {
    let operation = UpdateStudentMutation::build(UpdateStudentVariables {
        id: cynic::Id::new(id),
        input: patch.validate()?,
    });
    Ok(client
        .mutate(&operation, STUDENT_DEPENDENTS)
        .await?
        .update_student)
}

pub async fn delete_student(client: &QueryClient, id: &str) -> Result<StudentRef> {
    let operation = DeleteStudentMutation::build(IdVariables {
        id: cynic::Id::new(id),
    });
    Ok(client
        .mutate(&operation, STUDENT_DEPENDENTS)
        .await?
        .delete_student)
}
