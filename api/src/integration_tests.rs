//! Full integration tests for the group service
//!
//! These drive the real router and services over an in-memory repository,
//! covering the RPC methods end to end:
//! 1. Register groups in a batch
//! 2. Look them up by identifier and by name
//! 3. List them by department and faculty
//!
//! Run with: cargo test integration_tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use tokio::sync::watch;

    use crate::app::{CancelSignal, GroupService};
    use crate::test_utils::{test_group, InMemoryGroupRepository};
    use crate::{build_router, AppState};

    fn server_with(repo: InMemoryGroupRepository, cancel: CancelSignal) -> TestServer {
        let state = AppState {
            group_service: Arc::new(GroupService::new(Arc::new(repo))),
            cancel,
        };
        let app = build_router(state, None).unwrap();
        TestServer::new(app).unwrap()
    }

    fn server(repo: InMemoryGroupRepository) -> TestServer {
        server_with(repo, CancelSignal::never())
    }

    fn cs_101() -> Value {
        json!({
            "group_name": "CS-101",
            "semester_start_at": "2024-09-01T00:00:00Z",
            "semester_end_at": "2024-12-20T00:00:00Z",
            "is_first_week_numerator": true,
            "department": "CS",
            "faculty": "ENG"
        })
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let server = server(InMemoryGroupRepository::new());
        let response = server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "ok");
    }

    #[tokio::test]
    async fn add_then_list_by_department() {
        let server = server(InMemoryGroupRepository::new());

        let response = server
            .post("/GroupService/AddGroups")
            .json(&json!({ "groups_list": [cs_101()] }))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({ "results_list": [{ "accepted": true, "error": "" }] })
        );

        let response = server
            .post("/GroupService/GetGroupList")
            .json(&json!({ "department": "CS" }))
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        let groups = body["groups_list"].as_array().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["group_name"], "CS-101");
        assert_eq!(groups[0]["semester_start_at"], "2024-09-01T00:00:00Z");
        assert_eq!(groups[0]["semester_end_at"], "2024-12-20T00:00:00Z");
        assert_eq!(groups[0]["is_first_week_numerator"], true);
        assert_eq!(groups[0]["department"], "CS");
        assert_eq!(groups[0]["faculty"], "ENG");
    }

    #[tokio::test]
    async fn accepted_group_round_trips_by_id_and_name() {
        let server = server(InMemoryGroupRepository::new());
        server
            .post("/GroupService/AddGroups")
            .json(&json!({ "groups_list": [cs_101()] }))
            .await
            .assert_status_ok();

        let by_name = server
            .post("/GroupService/GetGroup")
            .json(&json!({ "group_name": "CS-101" }))
            .await;
        by_name.assert_status_ok();
        let by_name = by_name.json::<Value>();

        let id = by_name["group_id"].as_str().unwrap().to_string();
        let by_id = server
            .post("/GroupService/GetGroup")
            .json(&json!({ "group_id": id }))
            .await;
        by_id.assert_status_ok();

        assert_eq!(by_id.json::<Value>(), by_name);
    }

    #[tokio::test]
    async fn identifier_takes_priority_over_name() {
        let group = test_group("CS-101");
        let server = server(InMemoryGroupRepository::new().with_group(group.clone()));

        let response = server
            .post("/GroupService/GetGroup")
            .json(&json!({ "group_id": group.id.to_string(), "group_name": "other" }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["group_name"], "CS-101");
    }

    #[tokio::test]
    async fn get_group_without_keys_is_invalid_argument() {
        let server = server(InMemoryGroupRepository::new());

        let response = server
            .post("/GroupService/GetGroup")
            .json(&json!({ "group_id": "", "group_name": "" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["code"], 3);
        assert_eq!(body["status"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn get_group_unknown_name_is_not_found() {
        let server = server(InMemoryGroupRepository::new().with_group(test_group("CS-101")));

        let response = server
            .post("/GroupService/GetGroup")
            .json(&json!({ "group_name": "MA-404" }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["code"], 5);
    }

    #[tokio::test]
    async fn get_group_malformed_identifier_is_invalid_argument() {
        let server = server(InMemoryGroupRepository::new());

        let response = server
            .post("/GroupService/GetGroup")
            .json(&json!({ "group_id": "42" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_with_no_matches_is_empty_not_error() {
        let server = server(InMemoryGroupRepository::new().with_group(test_group("CS-101")));

        let response = server
            .post("/GroupService/GetGroupList")
            .json(&json!({ "department": "BIO" }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!({ "groups_list": [] }));
    }

    #[tokio::test]
    async fn empty_or_missing_batch_is_invalid_argument() {
        let server = server(InMemoryGroupRepository::new());

        let response = server
            .post("/GroupService/AddGroups")
            .json(&json!({ "groups_list": [] }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/GroupService/AddGroups")
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server.post("/GroupService/GetGroupList").json(&json!({})).await;
        assert_eq!(response.json::<Value>(), json!({ "groups_list": [] }));
    }

    #[tokio::test]
    async fn batch_results_align_with_input() {
        let server = server(InMemoryGroupRepository::new());

        let mut inverted = cs_101();
        inverted["group_name"] = json!("CS-102");
        inverted["semester_start_at"] = json!("2025-01-01T00:00:00Z");
        let mut bad_date = cs_101();
        bad_date["group_name"] = json!("CS-103");
        bad_date["semester_end_at"] = json!("20.12.2024");

        let response = server
            .post("/GroupService/AddGroups")
            .json(&json!({ "groups_list": [cs_101(), cs_101(), inverted, bad_date] }))
            .await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        let results = body["results_list"].as_array().unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0]["accepted"], true);
        assert_eq!(results[1]["accepted"], false);
        assert_eq!(results[1]["error"], "group with this name already exists");
        assert_eq!(results[2]["accepted"], false);
        assert_eq!(
            results[2]["error"],
            "semester start must not be after semester end"
        );
        assert_eq!(results[3]["accepted"], false);

        let response = server
            .post("/GroupService/GetGroup")
            .json(&json!({ "group_name": "CS-102" }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn store_failures_never_leak_details() {
        let server = server(InMemoryGroupRepository::new().failing_reads());

        let response = server
            .post("/GroupService/GetGroup")
            .json(&json!({ "group_name": "CS-101" }))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json::<Value>();
        assert_eq!(body["status"], "INTERNAL");
        assert!(!body["message"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_argument() {
        let server = server(InMemoryGroupRepository::new());

        let response = server.post("/GroupService/AddGroups").text("{").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["status"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn batch_after_shutdown_is_reported_cancelled() {
        let (tx, rx) = watch::channel(false);
        let server = server_with(InMemoryGroupRepository::new(), CancelSignal::new(rx));
        tx.send(true).unwrap();

        let response = server
            .post("/GroupService/AddGroups")
            .json(&json!({ "groups_list": [cs_101()] }))
            .await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["results_list"][0]["accepted"], false);
        assert_eq!(
            body["results_list"][0]["error"],
            "request cancelled before this group was processed"
        );
    }
}
