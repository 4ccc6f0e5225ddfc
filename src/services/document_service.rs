use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    services::{
        blob_storage::BlobStore,
        text_extraction::{extract_text, DocumentFormat},
    },
};

/// Text pulled out of a stored document, ready for prompting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub document_id: String,
    pub format: DocumentFormat,
    pub text: String,
    pub truncated: bool,
}

pub struct DocumentService {
    store: Arc<dyn BlobStore>,
    prefix: String,
    max_chars: usize,
}

impl DocumentService {
    pub fn new(store: Arc<dyn BlobStore>, prefix: impl Into<String>, max_chars: usize) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            max_chars,
        }
    }

    pub async fn retrieve_text(&self, document_id: &str) -> AppResult<ExtractedDocument> {
        let document_id = document_id.trim();
        validate_document_id(document_id)?;
        let format = DocumentFormat::from_document_id(document_id)?;

        let blob_name = format!("{}{}", self.prefix, document_id);
        let bytes = self.store.fetch(&blob_name).await?;

        // Parsing is CPU-bound and the PDF parser may panic on hostile input.
        let text = tokio::task::spawn_blocking(move || extract_text(format, &bytes))
            .await
            .map_err(|e| {
                if e.is_panic() {
                    AppError::UnsupportedDocument(format!("'{}' could not be parsed", document_id))
                } else {
                    AppError::InternalError(format!("text extraction was cancelled: {}", e))
                }
            })??;

        if text.trim().is_empty() {
            return Err(AppError::ValidationError(format!(
                "Document '{}' contains no extractable text",
                document_id
            )));
        }

        let (text, truncated) = truncate_chars(text, self.max_chars);
        if truncated {
            log::warn!(
                "Document {} exceeds {} characters and was truncated",
                document_id,
                self.max_chars
            );
        }

        log::info!(
            "Extracted {} characters from {} ({:?})",
            text.chars().count(),
            document_id,
            format
        );

        Ok(ExtractedDocument {
            document_id: document_id.to_string(),
            format,
            text,
            truncated,
        })
    }
}

fn validate_document_id(document_id: &str) -> AppResult<()> {
    if document_id.is_empty() {
        return Err(AppError::ValidationError("document_id must not be empty".to_string()));
    }
    if document_id.starts_with('/')
        || document_id.contains('\\')
        || document_id.split('/').any(|segment| segment == ".." || segment == ".")
    {
        return Err(AppError::ValidationError(format!(
            "document_id '{}' is not a valid document path",
            document_id
        )));
    }
    Ok(())
}

fn truncate_chars(mut text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            text.truncate(byte_index);
            (text, true)
        }
        None => (text, false),
    }
}
