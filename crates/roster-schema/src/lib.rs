//! GraphQL schema definitions for roster.
//!
//! This crate contains the generated schema types for the CRM GraphQL API.
//! Keeping them in their own crate avoids recompiling the schema module when
//! unrelated code changes.

// Disable all clippy lints for this crate - it's entirely generated code
#![allow(clippy::all)]
#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]

/// CRM GraphQL schema types.
///
/// Generated from `schemas/crm.graphql`; exports everything needed to build
/// type-checked queries and mutations.
#[cynic::schema("crm")]
pub mod crm {}
