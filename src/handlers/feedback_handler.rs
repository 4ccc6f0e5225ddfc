use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::{app_state::AppState, errors::AppError, models::domain::AttemptRecord};

#[post("/generate_personalised_feedback")]
pub async fn generate_personalised_feedback(
    state: web::Data<AppState>,
    attempt: web::Json<AttemptRecord>,
) -> Result<HttpResponse, AppError> {
    let attempt = attempt.into_inner();
    attempt.validate()?;

    let feedback = state.feedback_service.generate_feedback(&attempt).await;
    Ok(HttpResponse::Ok().json(feedback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::configure;
    use crate::services::{blob_storage::MockBlobStore, model_service::MockChatModel};
    use crate::test_utils::test_helpers::{assert_success_status, test_state};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_feedback_is_returned() {
        let mut model = MockChatModel::new();
        model.expect_complete().times(1).returning(|_| {
            Ok(json!({
                "strengths": ["Recall of definitions"],
                "weaknesses": [],
                "recommendations": "Keep going.",
                "question_feedback": {}
            })
            .to_string())
        });
        let app = test::init_service(
            App::new()
                .app_data(test_state(MockBlobStore::new(), model))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/generate_personalised_feedback")
            .set_json(json!({ "answers": [{ "question_id": "q1", "is_correct": true }] }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["strengths"][0], "Recall of definitions");
        assert!(body["question_feedback"].as_object().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_feedback_falls_back_when_model_fails() {
        let mut model = MockChatModel::new();
        model
            .expect_complete()
            .returning(|_| Err(AppError::GenerationError("model request failed".to_string())));
        let app = test::init_service(
            App::new()
                .app_data(test_state(MockBlobStore::new(), model))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/generate_personalised_feedback")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_success_status(resp.status());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["strengths"][0], "Completed the quiz");
        assert_eq!(body["recommendations"], "Keep practicing to improve your understanding.");
    }

    #[actix_web::test]
    async fn test_feedback_rejects_oversized_attempts() {
        let mut model = MockChatModel::new();
        model.expect_complete().never();
        let app = test::init_service(
            App::new()
                .app_data(test_state(MockBlobStore::new(), model))
                .configure(configure),
        )
        .await;

        let answers: Vec<Value> = (0..501).map(|i| json!({ "question_id": i })).collect();
        let req = test::TestRequest::post()
            .uri("/generate_personalised_feedback")
            .set_json(json!({ "answers": answers }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
