//! Multipart form parsing for the post routes.

use actix_multipart::{Field, Multipart, MultipartError};
use futures::TryStreamExt;

use inkpost_core::domain::PostDraft;
use inkpost_core::services::CoverUpload;

use crate::middleware::error::{AppError, AppResult};

/// Upper bound for a single text field.
const MAX_TEXT_BYTES: usize = 1024 * 1024;

/// Fields of the create/edit post form.
#[derive(Debug, Default)]
pub struct PostForm {
    pub id: Option<String>,
    pub title: String,
    pub summary: String,
    pub content: String,
    /// The first non-empty `file` part.
    pub file: Option<CoverUpload>,
}

impl PostForm {
    /// Read the whole form. Unknown parts are skipped; file parts above
    /// `max_file_bytes` are rejected.
    pub async fn read(mut payload: Multipart, max_file_bytes: usize) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = payload.try_next().await.map_err(bad_multipart)? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "file" if form.file.is_none() => {
                    let file_name = field
                        .content_disposition()
                        .and_then(|cd| cd.get_filename())
                        .unwrap_or_default()
                        .to_owned();
                    let bytes = read_field(field, &name, max_file_bytes).await?;

                    // Browsers send an empty part when no file was picked.
                    if !(bytes.is_empty() && file_name.is_empty()) {
                        form.file = Some(CoverUpload { bytes, file_name });
                    }
                }
                "id" | "title" | "summary" | "content" => {
                    let bytes = read_field(field, &name, MAX_TEXT_BYTES).await?;
                    let value = String::from_utf8(bytes).map_err(|_| {
                        AppError::BadRequest(format!("Field '{name}' is not valid UTF-8"))
                    })?;
                    form.set_text(&name, value);
                }
                _ => skip_field(field).await?,
            }
        }

        Ok(form)
    }

    fn set_text(&mut self, name: &str, value: String) {
        match name {
            "id" => self.id = Some(value),
            "title" => self.title = value,
            "summary" => self.summary = value,
            "content" => self.content = value,
            _ => {}
        }
    }

    /// The text fields as a draft.
    pub fn draft(&self) -> PostDraft {
        PostDraft::new(&self.title, &self.summary, &self.content)
    }
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {err}"))
}

async fn read_field(mut field: Field, name: &str, limit: usize) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
        if buf.len() + chunk.len() > limit {
            return Err(AppError::BadRequest(format!(
                "Field '{name}' exceeds the {limit} byte limit"
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

async fn skip_field(mut field: Field) -> AppResult<()> {
    while field.try_next().await.map_err(bad_multipart)?.is_some() {}
    Ok(())
}
