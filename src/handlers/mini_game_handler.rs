use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::{app_state::AppState, errors::AppError, models::dto::request::GenerateMiniGameRequest};

#[post("/generate_mini_game")]
pub async fn generate_mini_game(
    state: web::Data<AppState>,
    request: web::Json<GenerateMiniGameRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let game = state
        .mini_game_service
        .generate_mini_game(&request.document_id, request.game_type, request.item_count)
        .await?;
    Ok(HttpResponse::Ok().json(game))
}
