//! Serves files produced by the download worker.

use std::path::{Component, Path as FsPath};

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::IntoResponse,
};
use tokio_util::io::ReaderStream;

use crate::{app::AppState, error::AppError, extract::ApiPath};

/// Stream a downloaded file as an attachment.
///
/// # Endpoint
///
/// `GET /downloads/{filename}`
///
/// Only bare file names inside the downloads directory are served; anything
/// containing a path separator or `..` is treated as not found.
pub async fn serve_download(
    State(state): State<AppState>,
    ApiPath(filename): ApiPath<String>,
) -> Result<impl IntoResponse, AppError> {
    if !is_plain_file_name(&filename) {
        return Err(AppError::FileNotFound);
    }

    let path = state.downloads_dir.join(&filename);
    let (file, len) = match open_regular_file(&path).await {
        Ok(opened) => opened,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "download file unavailable");
            return Err(AppError::FileNotFound);
        }
    };

    let disposition = format!(
        "attachment; filename=\"{}\"",
        filename.replace(['"', '\\'], "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    ))
}

async fn open_regular_file(path: &FsPath) -> std::io::Result<(tokio::fs::File, u64)> {
    let file = tokio::fs::File::open(path).await?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not a regular file",
        ));
    }
    Ok((file, metadata.len()))
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = FsPath::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_bare_names_are_plain() {
        assert!(is_plain_file_name("clip.mp4"));
        assert!(is_plain_file_name("My Song (live).mp3"));

        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("../secret"));
        assert!(!is_plain_file_name("sub/clip.mp4"));
        assert!(!is_plain_file_name("/etc/passwd"));
        assert!(!is_plain_file_name("clip.mp4/"));
    }
}
