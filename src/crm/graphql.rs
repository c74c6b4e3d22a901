//! Typed operations against the CRM schema.
//!
//! List reads go through [`crate::listview`] with plain documents because
//! their filter sets are open-ended. Everything with a fixed shape lives here.

// The import MUST be named `schema` for cynic derives to work.
use roster_schema::crm as schema;

pub use cynic::{MutationBuilder, QueryBuilder};

/// ISO 8601 timestamp
#[derive(cynic::Scalar, Debug, Clone)]
#[cynic(graphql_type = "DateTime")]
pub struct DateTime(pub String);

// Queries

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query")]
pub struct StudentStatsQuery {
    pub student_stats: StudentStats,
}

#[derive(cynic::QueryFragment, Debug, Clone, serde::Serialize)]
pub struct StudentStats {
    pub total: i32,
    pub active: i32,
    pub inactive: i32,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query")]
pub struct BillingSummaryQuery {
    pub billing_summary: BillingSummary,
}

#[derive(cynic::QueryFragment, Debug, Clone)]
pub struct BillingSummary {
    pub plan: String,
    pub seats: i32,
    pub amount_due_cents: i32,
    pub currency: String,
    pub renews_at: Option<DateTime>,
}

// Variables

#[derive(cynic::QueryVariables, Debug)]
pub struct IdVariables {
    pub id: cynic::Id,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct CreateTagVariables {
    pub input: CreateTagInput,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct UpdateTagVariables {
    pub id: cynic::Id,
    pub input: UpdateTagInput,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct CreateStudentVariables {
    pub input: CreateStudentInput,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct UpdateStudentVariables {
    pub id: cynic::Id,
    pub input: UpdateStudentInput,
}

// Input Objects

#[derive(cynic::InputObject, Debug, Clone, PartialEq)]
#[cynic(rename_all = "camelCase")]
pub struct CreateTagInput {
    pub name: String,
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Unset fields are left untouched by the server.
#[derive(cynic::InputObject, Debug, Clone, Default, PartialEq)]
#[cynic(rename_all = "camelCase")]
pub struct UpdateTagInput {
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(cynic::InputObject, Debug, Clone, PartialEq)]
#[cynic(rename_all = "camelCase")]
pub struct CreateStudentInput {
    pub first_name: String,
    pub last_name: String,
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(cynic::InputObject, Debug, Clone, Default, PartialEq)]
#[cynic(rename_all = "camelCase")]
pub struct UpdateStudentInput {
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// Mutations - Tags

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "CreateTagVariables")]
pub struct CreateTagMutation {
    #[arguments(input: $input)]
    pub create_tag: TagRef,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "UpdateTagVariables")]
pub struct UpdateTagMutation {
    #[arguments(id: $id, input: $input)]
    pub update_tag: TagRef,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "IdVariables")]
pub struct DeleteTagMutation {
    #[arguments(id: $id)]
    pub delete_tag: TagRef,
}

#[derive(cynic::QueryFragment, Debug, Clone)]
#[cynic(graphql_type = "Tag")]
pub struct TagRef {
    pub id: cynic::Id,
    pub name: String,
    pub color: Option<String>,
}

// Mutations - Students

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "CreateStudentVariables")]
pub struct CreateStudentMutation {
    #[arguments(input: $input)]
    pub create_student: StudentRef,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "UpdateStudentVariables")]
pub struct UpdateStudentMutation {
    #[arguments(id: $id, input: $input)]
    pub update_student: StudentRef,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "IdVariables")]
pub struct DeleteStudentMutation {
    #[arguments(id: $id)]
    pub delete_student: StudentRef,
}

#[derive(cynic::QueryFragment, Debug, Clone)]
#[cynic(graphql_type = "Student")]
pub struct StudentRef {
    pub id: cynic::Id,
    pub first_name: String,
    pub last_name: String,
    pub status: String,
}
