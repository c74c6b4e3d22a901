mod common;

use common::RosterTest;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn students_page(page: u32, total: u64) -> serde_json::Value {
    let limit = 10;
    let total_pages = total.div_ceil(limit) as u32;
    json!({
        "data": {
            "students": {
                "data": [
                    {"id": "s1", "firstName": "Ana", "lastName": "Lima", "status": "active",
                     "email": "ana@example.com", "tags": [{"id": "t1", "name": "VIP"}],
                     "createdAt": "2024-03-05T14:07:59Z"},
                    {"id": "s2", "firstName": "Bo", "lastName": "Chen", "status": "inactive"}
                ],
                "meta": {
                    "total": total,
                    "page": page,
                    "limit": limit,
                    "totalPages": total_pages,
                    "hasNextPage": page < total_pages,
                    "hasPreviousPage": page > 1
                }
            }
        }
    })
}

// ls

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ls_sends_composed_variables() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operationName": "Students",
            "variables": {"page": 2, "limit": 10, "search": "ana", "status": "active"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(students_page(2, 12)))
        .expect(1)
        .mount(&server)
        .await;

    let roster = RosterTest::new().with_endpoint(&format!("{}/graphql", server.uri()));
    let output = roster.run_json(&[
        "ls", "students", "--search", " ana ", "-f", "status=active", "-f", "tagId=", "--page",
        "2", "--json",
    ]);

    assert_eq!(output["operation"], "Students");
    assert_eq!(output["items"][0]["firstName"], "Ana");
    assert_eq!(output["meta"]["totalPages"], 2);
    // cleared filters never reach the server
    assert!(output["variables"].get("tagId").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ls_renders_table_and_footer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(students_page(1, 2)))
        .mount(&server)
        .await;

    let roster = RosterTest::new().with_endpoint(&server.uri());
    let stdout = roster.run_success(&["ls", "students"]);

    assert!(stdout.contains("Ana Lima"), "{stdout}");
    assert!(stdout.contains("VIP"));
    assert!(stdout.contains("2024-03-05 14:07"));
    assert!(stdout.contains("Page 1 of 1 (2 total)"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ls_surfaces_graphql_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "Not authorized", "extensions": {"code": "UNAUTHENTICATED"}}]
        })))
        .mount(&server)
        .await;

    let roster = RosterTest::new().with_endpoint(&server.uri());
    let stderr = roster.run_failure(&["ls", "tags"]);
    assert!(stderr.contains("Not authorized"), "{stderr}");
    assert!(stderr.contains("UNAUTHENTICATED"));
}

#[test]
fn test_ls_rejects_unknown_filter_before_any_request() {
    // nothing listens here; the filter check must fail first
    let roster = RosterTest::new().with_endpoint("http://127.0.0.1:9/graphql");
    let stderr = roster.run_failure(&["ls", "tags", "-f", "status=active"]);
    assert!(stderr.contains("invalid filter 'status'"), "{stderr}");
    assert!(stderr.contains("Tags accepts no filters"));

    let stderr = roster.run_failure(&["ls", "students", "-f", "colour=red"]);
    assert!(stderr.contains("status, tagId"), "{stderr}");
}

#[test]
fn test_ls_without_endpoint_explains_setup() {
    let roster = RosterTest::new();
    let stderr = roster.run_failure(&["ls", "students"]);
    assert!(stderr.contains("roster config set api.url"), "{stderr}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_env_endpoint_overrides_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(students_page(1, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let roster = RosterTest::new()
        .with_endpoint("http://127.0.0.1:9/graphql")
        .with_env("ROSTER_API_URL", &server.uri());
    roster.run_success(&["ls", "students", "--json"]);
}

// typed operations

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stats_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"studentStats": {"total": 12, "active": 9, "inactive": 3}}
        })))
        .mount(&server)
        .await;

    let roster = RosterTest::new().with_endpoint(&server.uri());
    let output = roster.run_json(&["stats", "--json"]);
    assert_eq!(output, json!({"total": 12, "active": 9, "inactive": 3}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_billing_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"billingSummary": {
                "plan": "Team", "seats": 5, "amountDueCents": 4900,
                "currency": "usd", "renewsAt": "2024-07-01T00:00:00Z"
            }}
        })))
        .mount(&server)
        .await;

    let roster = RosterTest::new().with_endpoint(&server.uri());
    let stdout = roster.run_success(&["billing"]);
    assert!(stdout.contains("49.00 USD"), "{stdout}");
    assert!(stdout.contains("2024-07-01 00:00"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tag_create() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": {"input": {"name": "VIP", "color": "#1E90FF"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"createTag": {"id": "t9", "name": "VIP", "color": "#1E90FF"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let roster = RosterTest::new().with_endpoint(&server.uri());
    let output = roster.run_json(&["tag", "create", " VIP ", "--color", "#1e90ff", "--json"]);
    assert_eq!(output["id"], "t9");
    assert_eq!(output["success"], true);
}

#[test]
fn test_invalid_tag_is_rejected_locally() {
    let roster = RosterTest::new().with_endpoint("http://127.0.0.1:9/graphql");
    let stderr = roster.run_failure(&["tag", "create", "VIP", "--color", "blue"]);
    assert!(stderr.contains("validation error"), "{stderr}");

    let stderr = roster.run_failure(&["student", "update", "s1"]);
    assert!(stderr.contains("nothing to update"), "{stderr}");
}

// config

#[test]
fn test_config_set_get_show() {
    let roster = RosterTest::new();

    roster.run_success(&["config", "set", "api.url", "https://crm.example.com/graphql"]);
    roster.run_success(&["config", "set", "list.page_size", "25"]);
    roster.run_success(&["config", "set", "auth.token", "tok_secret_value"]);

    let stdout = roster.run_success(&["config", "get", "list.page_size"]);
    assert_eq!(stdout.trim(), "25");

    let stdout = roster.run_success(&["config", "get", "auth.token"]);
    assert_eq!(stdout.trim(), "to...ue");

    let output = roster.run_json(&["config", "show", "--json"]);
    assert_eq!(output["api"]["url"], "https://crm.example.com/graphql");
    assert_eq!(output["list"]["page_size"], 25);
    assert_eq!(output["auth"]["token_configured"], true);

    let stored = roster.read_config();
    assert!(stored.contains("page_size: 25"), "{stored}");
}

#[test]
fn test_config_rejects_bad_keys_and_values() {
    let roster = RosterTest::new();

    let stderr = roster.run_failure(&["config", "set", "api_url", "https://x.dev"]);
    assert!(stderr.contains("Use dot notation: 'api.url'"), "{stderr}");

    let stderr = roster.run_failure(&["config", "set", "list.page_size", "0"]);
    assert!(stderr.contains("at least 1"), "{stderr}");

    let stderr = roster.run_failure(&["config", "set", "list.cache_policy", "sometimes"]);
    assert!(stderr.contains("network-only"), "{stderr}");
}

#[test]
fn test_completions() {
    let roster = RosterTest::new();
    let stdout = roster.run_success(&["completions", "bash"]);
    assert!(stdout.contains("roster"));
    assert!(stdout.contains("browse"));
}
