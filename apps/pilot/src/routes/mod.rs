pub mod health;
pub mod session;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;
use crate::{assessment, ingest, progress, recommendation, roadmap};

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Career flow
        .route(
            "/api/v1/resume",
            post(ingest::handlers::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/recommendations",
            post(recommendation::handlers::handle_recommend),
        )
        .route(
            "/api/v1/recommendations/:index/select",
            post(recommendation::handlers::handle_select),
        )
        .route(
            "/api/v1/assessment",
            get(assessment::handlers::handle_get).post(assessment::handlers::handle_start),
        )
        .route(
            "/api/v1/assessment/questions/:index/answer",
            post(assessment::handlers::handle_answer),
        )
        .route(
            "/api/v1/assessment/finish",
            post(assessment::handlers::handle_finish),
        )
        .route(
            "/api/v1/roadmap/form",
            get(roadmap::handlers::handle_get_form).put(roadmap::handlers::handle_update_form),
        )
        .route(
            "/api/v1/roadmap",
            get(roadmap::handlers::handle_get).post(roadmap::handlers::handle_fetch),
        )
        .route(
            "/api/v1/roadmap/phases/:index/toggle",
            post(roadmap::handlers::handle_toggle_phase),
        )
        .route(
            "/api/v1/roadmap/raw/toggle",
            post(roadmap::handlers::handle_toggle_raw),
        )
        .route(
            "/api/v1/roadmap/complete",
            post(roadmap::handlers::handle_complete),
        )
        .route(
            "/api/v1/roles/roadmap",
            post(roadmap::handlers::handle_role_roadmap),
        )
        // Startup progress
        .route(
            "/api/v1/progress",
            get(progress::handlers::handle_get_progress),
        )
        .route(
            "/api/v1/progress/steps/:id/toggle",
            post(progress::handlers::handle_toggle_step),
        )
        .route(
            "/api/v1/progress/project",
            put(progress::handlers::handle_update_project),
        )
        .route(
            "/api/v1/progress/guidance",
            post(progress::handlers::handle_guidance),
        )
        // Local session
        .route(
            "/api/v1/user",
            get(session::handle_get_user)
                .put(session::handle_put_user)
                .delete(session::handle_sign_out),
        )
        .route("/api/v1/workflow", get(session::handle_workflow_summary))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::advisor_client::testing::FakeAdvisor;
    use crate::advisor_client::{Endpoint, ServiceReply};
    use crate::config::Config;
    use crate::ingest::testing::FakePages;
    use crate::progress::store::MemoryStore;
    use crate::progress::ProgressTracker;

    const BOUNDARY: &str = "pilot-boundary";

    struct Harness {
        app: Router,
        state: AppState,
        advisor: Arc<FakeAdvisor>,
    }

    fn harness(advisor: FakeAdvisor) -> Harness {
        let config = Config::from_lookup(|key| {
            (key == "ADVISOR_BASE_URL").then(|| "http://advisor.test".to_string())
        })
        .unwrap();
        let advisor = Arc::new(advisor);
        let pages = Arc::new(FakePages(vec![
            vec!["Jane Doe", "Data Analyst"],
            vec!["Python", "SQL"],
        ]));
        let state = AppState::new(
            config,
            advisor.clone(),
            pages,
            ProgressTracker::new(Arc::new(MemoryStore::new())),
        );
        Harness {
            app: build_router(state.clone()),
            state,
            advisor,
        }
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        read(app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()).await
    }

    async fn read(response: axum::response::Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn upload(app: &Router, content_type: &str, bytes: &[u8]) -> (StatusCode, Value) {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"resume.pdf\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/resume")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        read(app.clone().oneshot(request).await.unwrap()).await
    }

    fn career_flow_advisor() -> FakeAdvisor {
        FakeAdvisor::new()
            .reply(
                Endpoint::Recommend,
                ServiceReply::json(
                    200,
                    json!({"recommendations": [
                        {"title": "Data Scientist", "rank": 92, "why_fit": ["Python"]},
                        {"title": "BI Analyst", "rank": 80, "why_fit": []}
                    ]}),
                ),
            )
            .reply(
                Endpoint::Assessment,
                ServiceReply::json(
                    200,
                    json!({"questions": [
                        {"type": "mcq", "question": "Mean of 2 and 4?", "options": ["2", "3"], "answer": 1, "points": 5},
                        {"type": "mcq", "question": "Median of 1,2,9?", "options": ["2", "4"], "answer": 0, "points": 5}
                    ]}),
                ),
            )
            .reply(
                Endpoint::Evaluate,
                ServiceReply::json(
                    200,
                    json!({"career": "Data Scientist", "score": 5, "language": "Python", "roadmap": [
                        {"phase": "Foundations", "topics": [{"title": "Statistics", "book_resources": [{"name": "Think Stats"}]}]},
                        {"phase": "Modeling", "topics": []}
                    ]}),
                ),
            )
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(FakeAdvisor::new());
        let (status, body) = send(&h.app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["busy"], json!([]));
    }

    #[tokio::test]
    async fn test_full_career_flow() {
        let h = harness(career_flow_advisor());

        let (status, body) = upload(&h.app, "application/pdf", b"%PDF-1.7 body").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Jane Doe Data Analyst Python SQL");
        assert_eq!(body["page_count"], 2);

        let (status, body) = send(&h.app, Method::POST, "/api/v1/recommendations", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"][0]["title"], "Data Scientist");
        assert_eq!(
            h.advisor.calls()[0].1,
            json!({"resume": "Jane Doe Data Analyst Python SQL"})
        );

        let (status, body) =
            send(&h.app, Method::POST, "/api/v1/recommendations/0/select", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transition"], json!({"to": "assessment", "career": "Data Scientist"}));

        let (status, body) = send(&h.app, Method::POST, "/api/v1/assessment", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "ready");
        assert_eq!(body["max_score"], 10);
        assert!(body["questions"][0].get("answer").is_none());

        let (_, first) = send(
            &h.app,
            Method::POST,
            "/api/v1/assessment/questions/0/answer",
            Some(json!({"choice": 1})),
        )
        .await;
        assert_eq!(first["points_awarded"], 5);
        let (_, second) = send(
            &h.app,
            Method::POST,
            "/api/v1/assessment/questions/1/answer",
            Some(json!({"choice": 1})),
        )
        .await;
        assert_eq!(second["points_awarded"], 0);
        assert_eq!(second["running_score"], 5);

        let (_, repeat) = send(
            &h.app,
            Method::POST,
            "/api/v1/assessment/questions/1/answer",
            Some(json!({"choice": 0})),
        )
        .await;
        assert_eq!(repeat["repeated"], true);
        assert_eq!(repeat["running_score"], 5);

        let (_, finish) = send(&h.app, Method::POST, "/api/v1/assessment/finish", None).await;
        assert_eq!(finish["finished"], true);
        assert_eq!(
            finish["transition"],
            json!({"to": "roadmap", "career": "Data Scientist", "score": 5})
        );
        let (_, again) = send(&h.app, Method::POST, "/api/v1/assessment/finish", None).await;
        assert_eq!(again["finished"], false);

        let (_, form) = send(&h.app, Method::GET, "/api/v1/roadmap/form", None).await;
        assert_eq!(form, json!({"score": 5, "career": "Data Scientist", "language": null}));

        let (status, view) = send(&h.app, Method::POST, "/api/v1/roadmap", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            h.advisor.calls().last().unwrap().1,
            json!({"score": 5, "career": "Data Scientist", "language": "Python"})
        );
        let phases = &view["roadmap"]["phases"];
        assert_eq!(phases[0]["open"], false);
        assert!(phases[0].get("topics").is_none());

        let (_, view) = send(&h.app, Method::POST, "/api/v1/roadmap/phases/0/toggle", None).await;
        let books = &view["roadmap"]["phases"][0]["topics"][0]["books"];
        assert_eq!(books[0], json!({"kind": "text", "label": "Think Stats"}));
        assert_eq!(view["roadmap"]["phases"][1]["open"], false);

        let (status, completion) =
            send(&h.app, Method::POST, "/api/v1/roadmap/complete", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(completion["career"], "Data Scientist");
        assert_eq!(completion["score"], 5);

        let (_, summary) = send(&h.app, Method::GET, "/api/v1/workflow", None).await;
        assert_eq!(summary["last_completion"]["career"], "Data Scientist");
        assert_eq!(summary["recommendation_count"], 2);
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_unsupported() {
        let h = harness(FakeAdvisor::new());
        let (status, body) = upload(&h.app, "text/plain", b"hello").await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_recommend_without_resume_is_rejected() {
        let h = harness(FakeAdvisor::new());
        let (status, _) = send(&h.app, Method::POST, "/api/v1/recommendations", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.advisor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_assessment_without_career_makes_no_call() {
        let h = harness(FakeAdvisor::new());
        let (status, body) = send(&h.app, Method::POST, "/api/v1/assessment", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "no_career_selected");
        assert_eq!(h.advisor.call_count(), 0);

        let (_, finish) = send(&h.app, Method::POST, "/api/v1/assessment/finish", None).await;
        assert_eq!(finish["finished"], false);
    }

    #[tokio::test]
    async fn test_assessment_load_failure_degrades_to_empty_ready() {
        let h = harness(FakeAdvisor::new().fail(Endpoint::Assessment, "connection refused"));
        h.state
            .workflow
            .lock()
            .await
            .bridge
            .emit(crate::navigation::Transition::Assessment {
                career: "QA Engineer".to_string(),
            });

        let (status, body) = send(&h.app, Method::POST, "/api/v1/assessment", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "ready");
        assert_eq!(body["questions"], json!([]));
        assert!(body["load_error"]
            .as_str()
            .unwrap()
            .contains("connection refused"));

        let (_, finish) = send(&h.app, Method::POST, "/api/v1/assessment/finish", None).await;
        assert_eq!(finish["finished"], false);
    }

    #[tokio::test]
    async fn test_roadmap_error_reply_stays_displayable() {
        let h = harness(FakeAdvisor::new().reply(
            Endpoint::Evaluate,
            ServiceReply::json(
                500,
                json!({"error": "Failed to parse AI response", "raw_text": "{oops"}),
            ),
        ));
        let (status, view) = send(&h.app, Method::POST, "/api/v1/roadmap", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(view["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to parse AI response"));
        assert_eq!(view["roadmap"]["raw_toggle_available"], true);
        assert_eq!(view["roadmap"]["raw_visible"], true);
        assert_eq!(view["roadmap"]["career"], "Software Engineer");

        let (_, hidden) = send(&h.app, Method::POST, "/api/v1/roadmap/raw/toggle", None).await;
        assert_eq!(hidden["roadmap"]["raw_visible"], false);
        assert!(hidden["roadmap"].get("raw_payload").is_none());
    }

    #[tokio::test]
    async fn test_roadmap_form_edits_are_sent() {
        let h = harness(FakeAdvisor::new().reply(
            Endpoint::Evaluate,
            ServiceReply::json(200, json!({"roadmap": []})),
        ));
        let (_, form) = send(
            &h.app,
            Method::PUT,
            "/api/v1/roadmap/form",
            Some(json!({"career": "SRE", "language": "Go", "score": 12})),
        )
        .await;
        assert_eq!(form["career"], "SRE");
        send(&h.app, Method::POST, "/api/v1/roadmap", None).await;
        assert_eq!(
            h.advisor.calls()[0].1,
            json!({"score": 12, "career": "SRE", "language": "Go"})
        );
    }

    #[tokio::test]
    async fn test_busy_surface_is_refused() {
        let h = harness(FakeAdvisor::new());
        let _held = h.state.pending.roadmap.try_raise().unwrap();
        let (status, body) = send(&h.app, Method::POST, "/api/v1/roadmap", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "BUSY");
        assert_eq!(h.advisor.call_count(), 0);

        let (_, health) = send(&h.app, Method::GET, "/health", None).await;
        assert_eq!(health["busy"], json!(["roadmap request"]));
    }

    #[tokio::test]
    async fn test_progress_toggle_scenario() {
        let h = harness(FakeAdvisor::new());
        let (_, initial) = send(&h.app, Method::GET, "/api/v1/progress", None).await;
        assert_eq!(initial["stage"], "Just Starting");
        assert_eq!(initial["steps"].as_array().unwrap().len(), 8);
        assert_eq!(initial["steps"][7]["details"].as_array().unwrap().len(), 4);
        assert!(initial["steps"][0]["description"].is_string());

        for id in [1, 3, 5] {
            send(
                &h.app,
                Method::POST,
                &format!("/api/v1/progress/steps/{id}/toggle"),
                None,
            )
            .await;
        }
        let (_, record) = send(&h.app, Method::GET, "/api/v1/progress", None).await;
        assert_eq!(record["completed_count"], 3);
        assert_eq!(record["stage"], "Development Stage");

        let (_, record) =
            send(&h.app, Method::POST, "/api/v1/progress/steps/3/toggle", None).await;
        assert_eq!(record["completed"], json!([1, 5]));
        assert_eq!(record["stage"], "Early Stage");

        let (status, body) =
            send(&h.app, Method::POST, "/api/v1/progress/steps/9/toggle", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_guidance_requires_project_details() {
        let h = harness(FakeAdvisor::new());
        let (status, body) = send(&h.app, Method::POST, "/api/v1/progress/guidance", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Please fill in at least project name and description"
        );
        assert_eq!(h.advisor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_guidance_is_sanitized() {
        let h = harness(FakeAdvisor::new().reply(
            Endpoint::StartupGuidance,
            ServiceReply::json(
                200,
                json!({"guidance": "<h2>Focus</h2><script>alert(1)</script><ul><li>Ship</li></ul>"}),
            ),
        ));
        send(
            &h.app,
            Method::PUT,
            "/api/v1/progress/project",
            Some(json!({"projectName": "Sprout", "description": "Plant care"})),
        )
        .await;
        send(&h.app, Method::POST, "/api/v1/progress/steps/2/toggle", None).await;

        let (status, body) = send(&h.app, Method::POST, "/api/v1/progress/guidance", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["content"],
            json!([
                {"kind": "heading", "text": "Focus"},
                {"kind": "bullet", "text": "Ship"}
            ])
        );
        assert_eq!(body["snapshot"]["stage"], "Early Stage");
        let sent = &h.advisor.calls()[0].1;
        assert_eq!(sent["completedSteps"], json!([2]));
        assert_eq!(sent["projectDetails"]["projectName"], "Sprout");
    }

    #[tokio::test]
    async fn test_user_profile_lifecycle() {
        let h = harness(FakeAdvisor::new());
        let (_, user) = send(&h.app, Method::GET, "/api/v1/user", None).await;
        assert_eq!(user, json!({"name": "Guest"}));

        let (status, _) = send(&h.app, Method::PUT, "/api/v1/user", Some(json!({"name": " "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        send(&h.app, Method::PUT, "/api/v1/user", Some(json!({"name": "Asha"}))).await;
        let (_, user) = send(&h.app, Method::GET, "/api/v1/user", None).await;
        assert_eq!(user["name"], "Asha");

        send(&h.app, Method::DELETE, "/api/v1/user", None).await;
        let (_, user) = send(&h.app, Method::GET, "/api/v1/user", None).await;
        assert_eq!(user["name"], "Guest");
    }

    #[tokio::test]
    async fn test_role_roadmap_rejects_blank_role() {
        let h = harness(FakeAdvisor::new());
        let (status, _) = send(
            &h.app,
            Method::POST,
            "/api/v1/roles/roadmap",
            Some(json!({"role": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.advisor.call_count(), 0);
    }
}
