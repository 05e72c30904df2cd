//! Uploaded file storage.
//!
//! Files are written under `<upload_dir>/<folder>/` and referenced from the
//! database by file name only. Stored names are prefixed with a timestamp and
//! a random tag, so two uploads of `logo.png` never collide.

use std::io;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Sub-directory an upload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFolder {
    BrandIcons,
    ProductImages,
}

impl UploadFolder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BrandIcons => "brand-icons",
            Self::ProductImages => "product-images",
        }
    }
}

/// A file part taken from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied name, untrusted.
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Local-disk upload storage rooted at `ADMIN_UPLOAD_DIR`.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn folder_path(&self, folder: UploadFolder) -> PathBuf {
        self.root.join(folder.as_str())
    }

    /// Store `file` and return its generated file name.
    ///
    /// Returns `Ok(None)` when no file was sent or the file is empty.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the folder cannot be created or the file
    /// cannot be written.
    pub async fn save(
        &self,
        folder: UploadFolder,
        file: Option<UploadedFile>,
    ) -> Result<Option<String>, UploadError> {
        let Some(file) = file.filter(|f| !f.bytes.is_empty()) else {
            return Ok(None);
        };

        let dir = self.folder_path(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| UploadError::Io {
                path: dir.clone(),
                source,
            })?;

        let name = unique_file_name(file.file_name.as_deref().unwrap_or_default());
        let path = dir.join(&name);
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|source| UploadError::Io { path, source })?;

        tracing::info!(folder = folder.as_str(), file = %name, bytes = file.bytes.len(), "Stored upload");
        Ok(Some(name))
    }

    /// Delete a stored file. Failures are logged and otherwise ignored.
    pub async fn remove(&self, folder: UploadFolder, name: &str) {
        // Names come from the database; refuse anything that is not a bare file name.
        if Path::new(name).file_name().and_then(|n| n.to_str()) != Some(name) {
            tracing::warn!(folder = folder.as_str(), file = %name, "Refusing to remove non-file upload path");
            return;
        }

        let path = self.folder_path(folder).join(name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove upload");
        }
    }
}

/// `{unix_millis}_{8 hex chars}_{sanitized original name}`
fn unique_file_name(original: &str) -> String {
    let tag: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!(
        "{}_{tag}_{}",
        Utc::now().timestamp_millis(),
        sanitize_file_name(original)
    )
}

/// Longest sanitized name kept; the tail is kept so the extension survives.
const MAX_NAME_CHARS: usize = 128;

/// Reduce a client file name to a safe final path component.
///
/// Keeps the last component, collapses whitespace runs into `_`, and drops
/// everything outside `[A-Za-z0-9._-]`. Long names keep their last
/// `MAX_NAME_CHARS` characters. Falls back to `upload`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let mut out = String::with_capacity(last.len());
    let mut in_space = false;
    for c in last.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
        }
    }

    // ASCII only from here, so byte offsets are char offsets.
    if out.len() > MAX_NAME_CHARS {
        out = out.split_off(out.len() - MAX_NAME_CHARS);
    }

    if out.is_empty() || out.chars().all(|c| c == '.') {
        return "upload".to_string();
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn file(name: &str, bytes: &'static [u8]) -> Option<UploadedFile> {
        Some(UploadedFile {
            file_name: Some(name.to_string()),
            bytes: Bytes::from_static(bytes),
        })
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("logo.png"), "logo.png");
        assert_eq!(sanitize_file_name("my  brand logo.PNG"), "my_brand_logo.PNG");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\pic (1).jpg"), "pic_1.jpg");
        assert_eq!(sanitize_file_name("ürün.jpg"), "rn.jpg");
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name("%%%"), "upload");
    }

    #[test]
    fn test_sanitize_file_name_caps_length() {
        let long = format!("{}.png", "a".repeat(600));
        let name = sanitize_file_name(&long);

        assert_eq!(name.len(), MAX_NAME_CHARS);
        assert!(name.ends_with("aaa.png"));
    }

    #[test]
    fn test_unique_file_name_shape() {
        let name = unique_file_name("logo.png");
        let parts: Vec<&str> = name.splitn(3, '_').collect();

        assert_eq!(parts.len(), 3);
        assert!(parts[0].parse::<i64>().is_ok());
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(parts[2], "logo.png");
    }

    #[tokio::test]
    async fn test_save_writes_into_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let name = store
            .save(UploadFolder::BrandIcons, file("logo.png", b"png-bytes"))
            .await
            .unwrap()
            .unwrap();

        let path = dir.path().join("brand-icons").join(&name);
        assert_eq!(std::fs::read(path).unwrap(), b"png-bytes");
        assert!(name.ends_with("_logo.png"));
    }

    #[tokio::test]
    async fn test_save_skips_missing_or_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        assert!(store.save(UploadFolder::ProductImages, None).await.unwrap().is_none());
        assert!(
            store
                .save(UploadFolder::ProductImages, file("empty.png", b""))
                .await
                .unwrap()
                .is_none()
        );
        assert!(!dir.path().join("product-images").exists());
    }

    #[tokio::test]
    async fn test_remove_is_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let name = store
            .save(UploadFolder::ProductImages, file("a.jpg", b"x"))
            .await
            .unwrap()
            .unwrap();
        store.remove(UploadFolder::ProductImages, &name).await;
        assert!(!dir.path().join("product-images").join(&name).exists());

        // Missing files and path-like names are ignored.
        store.remove(UploadFolder::ProductImages, &name).await;
        store.remove(UploadFolder::ProductImages, "../secret").await;
    }
}
