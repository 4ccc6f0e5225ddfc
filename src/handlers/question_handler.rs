use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::{app_state::AppState, errors::AppError, models::dto::request::GenerateQuestionsRequest};

#[post("/generate_questions_from_document")]
pub async fn generate_questions_from_document(
    state: web::Data<AppState>,
    request: web::Json<GenerateQuestionsRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let questions = state
        .question_service
        .generate_questions(
            &request.document_id,
            request.num_questions,
            request.difficulty,
            &request.requested_types(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(questions))
}
