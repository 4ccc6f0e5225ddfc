pub mod blob_storage;
pub mod document_service;
pub mod feedback_service;
pub mod mini_game_service;
pub mod model_service;
pub mod output_parser;
pub mod prompt_template;
pub mod question_service;
pub mod storage_connection;
pub mod text_extraction;
