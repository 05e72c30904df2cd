//! Request extractors whose rejections render as [`AppError`].
//!
//! Axum's built-in extractors reject with plain-text bodies. These wrappers
//! route every rejection through `AppError`, so malformed JSON, a bad query
//! string or a non-numeric path id all produce `400 {"message": ...}`.

use std::collections::HashMap;

use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};

use crate::error::AppError;
use crate::services::UploadedFile;

/// `axum::Json` with an `AppError` rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Query` with an `AppError` rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// `axum::extract::Path` with an `AppError` rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Name of the multipart part carrying an upload.
const FILE_FIELD: &str = "file";

/// A fully buffered `multipart/form-data` body.
///
/// Text parts are kept by name; the `file` part, if any, is kept as an
/// [`UploadedFile`]. The body size is bounded by `DefaultBodyLimit`.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    file: Option<UploadedFile>,
}

impl FormData {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();

            if name == FILE_FIELD {
                let file_name = field.file_name().map(str::to_owned);
                let bytes = field.bytes().await?;
                form.file = Some(UploadedFile { file_name, bytes });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Trimmed value of a text field; `None` when absent or blank.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Owned variant of [`Self::text`].
    #[must_use]
    pub fn text_owned(&self, name: &str) -> Option<String> {
        self.text(name).map(str::to_owned)
    }

    /// Form with the given text fields and no file.
    #[cfg(test)]
    pub(crate) fn from_fields(fields: &[(&str, &str)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            file: None,
        }
    }

    /// Take the uploaded file, if one was sent.
    pub fn take_file(&mut self) -> Option<UploadedFile> {
        self.file.take()
    }
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        Self::read(multipart).await
    }
}
