//! Local file handling for uploads and downloads.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};

use super::error::ToolError;

/// A local file encoded for the upstream.
#[derive(Debug, Clone)]
pub struct EncodedFile {
    /// File name including extension.
    pub file_name: String,
    /// File name without extension.
    pub stem: String,
    /// MIME type guessed from the extension.
    pub mime: &'static str,
    /// Size on disk in bytes.
    pub size: usize,
    /// `data:{mime};base64,{payload}`.
    pub data_url: String,
}

/// Guesses a MIME type from a file extension.
#[must_use]
pub fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}

/// Reads a file and encodes it as a base64 data URL.
///
/// # Errors
///
/// Returns [`ToolError::FileNotFound`] when the path does not exist, or
/// [`ToolError::Io`] when it cannot be read.
pub async fn read_as_data_url(path: &str) -> Result<EncodedFile, ToolError> {
    let path = PathBuf::from(path);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolError::FileNotFound { path });
        }
        Err(source) => return Err(ToolError::Io { path, source }),
    };

    let mime = mime_for(&path);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(EncodedFile {
        file_name,
        stem,
        mime,
        size: bytes.len(),
        data_url: format!("data:{mime};base64,{}", BASE64_STANDARD.encode(&bytes)),
    })
}

/// Strips an optional `data:...;base64,` prefix.
#[must_use]
pub fn strip_data_url(payload: &str) -> &str {
    if payload.starts_with("data:") {
        payload
            .split_once(',')
            .map_or(payload, |(_, encoded)| encoded)
    } else {
        payload
    }
}

/// Decodes a base64 payload (plain or data URL) and writes it to `path`,
/// creating parent directories as needed. Returns the number of bytes
/// written.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] if the payload is not valid
/// base64, or [`ToolError::Io`] if writing fails.
pub async fn write_base64(path: &str, payload: &str) -> Result<usize, ToolError> {
    let path = PathBuf::from(path);
    let bytes = BASE64_STANDARD
        .decode(strip_data_url(payload).trim())
        .map_err(|e| ToolError::invalid(format!("downloaded file is not valid base64: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ToolError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| ToolError::Io {
            path: path.clone(),
            source,
        })?;

    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_by_extension() {
        assert_eq!(mime_for(Path::new("a/contract.PDF")), "application/pdf");
        assert_eq!(
            mime_for(Path::new("signers.xlsx")),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(mime_for(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn strip_prefix_only_for_data_urls() {
        assert_eq!(strip_data_url("data:application/pdf;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url("QUJD"), "QUJD");
    }

    #[tokio::test]
    async fn read_missing_file() {
        let err = read_as_data_url("/definitely/not/here.pdf").await.unwrap_err();
        assert!(matches!(err, ToolError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn read_and_write_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("contract.pdf");
        std::fs::write(&source, b"%PDF-1.4 test").unwrap();

        let encoded = read_as_data_url(source.to_str().unwrap()).await.unwrap();
        assert_eq!(encoded.file_name, "contract.pdf");
        assert_eq!(encoded.stem, "contract");
        assert_eq!(encoded.size, 13);
        assert!(encoded.data_url.starts_with("data:application/pdf;base64,"));

        let target = dir.path().join("nested/out/signed.pdf");
        let written = write_base64(target.to_str().unwrap(), &encoded.data_url)
            .await
            .unwrap();
        assert_eq!(written, 13);
        assert_eq!(std::fs::read(target).unwrap(), b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn invalid_base64_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("x.pdf");
        let err = write_base64(target.to_str().unwrap(), "***").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
