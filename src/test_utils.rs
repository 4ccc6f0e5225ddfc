#[cfg(test)]
pub mod fixtures {
    use std::io::{Cursor, Write};

    use serde_json::json;
    use zip::{write::SimpleFileOptions, ZipWriter};

    use crate::services::blob_storage::MockBlobStore;

    fn escape_xml(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    /// Builds an in-memory zip archive from `(path, contents)` entries
    pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("zip entry should start");
            writer
                .write_all(contents.as_bytes())
                .expect("zip entry should be written");
        }
        writer.finish().expect("zip should finish").into_inner()
    }

    /// Creates a minimal Word document with one paragraph per entry
    pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| {
                if p.is_empty() {
                    "<w:p/>".to_string()
                } else {
                    format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", escape_xml(p))
                }
            })
            .collect();
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );

        zip_bytes(&[
            ("[Content_Types].xml", "<Types/>"),
            ("word/document.xml", document.as_str()),
        ])
    }

    /// Creates a minimal presentation, one text run per line of each slide.
    /// `reversed` stores the slide parts in reverse order inside the archive.
    pub fn pptx_bytes(slides: &[&[&str]], reversed: bool) -> Vec<u8> {
        let mut parts: Vec<(String, String)> = slides
            .iter()
            .enumerate()
            .map(|(index, runs)| {
                let paragraphs: String = runs
                    .iter()
                    .map(|run| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", escape_xml(run)))
                    .collect();
                let xml = format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody>{}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
                    paragraphs
                );
                (format!("ppt/slides/slide{}.xml", index + 1), xml)
            })
            .collect();
        if reversed {
            parts.reverse();
        }

        let mut entries: Vec<(&str, &str)> = vec![("ppt/presentation.xml", "<p:presentation/>")];
        entries.extend(parts.iter().map(|(name, xml)| (name.as_str(), xml.as_str())));
        zip_bytes(&entries)
    }

    /// A valid question list reply with `count` multiple choice questions
    pub fn question_list_json(count: u32) -> String {
        let questions: Vec<_> = (1..=count)
            .map(|number| {
                json!({
                    "number": number,
                    "text": format!("Question {}?", number),
                    "hint": "Think about the lecture",
                    "question_type": "multiple_choice",
                    "answers": [
                        { "text": "Right", "is_correct": true, "reason": "Stated in the notes" },
                        { "text": "Wrong", "is_correct": false, "reason": "Contradicts the notes" }
                    ]
                })
            })
            .collect();

        json!({ "questions": questions }).to_string()
    }

    /// A store that serves `text` for every blob name
    pub fn text_store(text: &str) -> MockBlobStore {
        let bytes = text.as_bytes().to_vec();
        let mut store = MockBlobStore::new();
        store
            .expect_fetch()
            .returning(move |_| Ok(bytes.clone()));
        store
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, web};

    use crate::{
        app_state::AppState,
        config::Config,
        services::{blob_storage::MockBlobStore, model_service::MockChatModel},
    };

    /// Application state over mocked storage and model
    pub fn test_state(store: MockBlobStore, model: MockChatModel) -> web::Data<AppState> {
        web::Data::new(AppState::with_services(
            Arc::new(store),
            Arc::new(model),
            Config::test_config(),
        ))
    }

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::QuestionList;
    use crate::services::blob_storage::BlobStore;
    use std::io::Cursor;
    use validator::Validate;

    #[test]
    fn test_fixtures_zip_bytes() {
        let bytes = zip_bytes(&[("a.txt", "alpha"), ("b/c.txt", "gamma")]);
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(archive.len(), 2);
        assert!(names.contains(&"b/c.txt"));
    }

    #[test]
    fn test_fixtures_pptx_bytes_reversed() {
        let bytes = pptx_bytes(&[&["one"], &["two"]], true);
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.by_index(1).unwrap().name(), "ppt/slides/slide2.xml");
    }

    #[test]
    fn test_fixtures_question_list_json() {
        let list: QuestionList = serde_json::from_str(&question_list_json(3)).unwrap();
        assert_eq!(list.questions.len(), 3);
        assert!(list.validate().is_ok());
    }

    #[tokio::test]
    async fn test_fixtures_text_store() {
        let store = text_store("hello");
        assert_eq!(store.fetch("documents/any.txt").await.unwrap(), b"hello");
    }
}
