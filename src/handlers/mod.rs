pub mod feedback_handler;
pub mod health_handler;
pub mod mini_game_handler;
pub mod question_handler;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::errors::AppError;

pub use feedback_handler::generate_personalised_feedback;
pub use health_handler::health_check;
pub use mini_game_handler::generate_mini_game;
pub use question_handler::generate_questions_from_document;

/// Largest accepted JSON body. Attempt records are the biggest payload.
const MAX_JSON_BYTES: usize = 2 * 1024 * 1024;

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(format!("invalid request body: {}", err)).into()
}

/// Registers every route with the JSON extractor settings they share.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_JSON_BYTES)
            .error_handler(json_error_handler),
    )
    .service(generate_questions_from_document)
    .service(generate_personalised_feedback)
    .service(generate_mini_game)
    .service(health_check);
}
