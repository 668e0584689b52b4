//! `POST /admin/upload-image`: stores a place image on disk and returns its
//! path relative to the static `/uploads` mount.

use std::path::Path as FsPath;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppQuery, AppResult},
    state::AppState,
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/upload-image", post(upload_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageKind {
    Cover,
    Highlight,
}

impl ImageKind {
    fn dir(self) -> &'static str {
        match self {
            ImageKind::Cover     => "CoverImage",
            ImageKind::Highlight => "HighlightImages",
        }
    }
}

#[derive(Deserialize)]
struct UploadQuery {
    #[serde(rename = "imgType", default)]
    img_type: Option<String>,
}

impl UploadQuery {
    /// Anything other than `highlight` is stored as a cover image.
    fn kind(&self) -> ImageKind {
        match self.img_type.as_deref() {
            Some("highlight") => ImageKind::Highlight,
            _                 => ImageKind::Cover,
        }
    }
}

/// Split an uploaded filename into a safe stem and a lowercase, allowed extension.
fn split_filename(file_name: &str) -> AppResult<(String, String)> {
    let path = FsPath::new(file_name);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if !matches!(ext.as_str(), "jpg" | "jpeg" | "png" | "gif" | "webp") {
        return Err(AppError::BadRequest("Unsupported image type".into()));
    }

    // `file_stem` drops any directory components a client smuggles in.
    let stem: String = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image")
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "image".to_owned() } else { stem };

    Ok((stem, ext))
}

/// Multipart field `image` carries the file; `?imgType=cover|highlight` picks the folder.
async fn upload_image(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UploadQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Value>> {
    let mut multipart = multipart?;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await
        .map_err(|e| AppError::BadRequest(e.to_string()))? {
        if field.name() == Some("image") {
            let name = field.file_name().map(str::to_owned).unwrap_or_else(|| "image".into());
            let bytes = field.bytes().await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            file = Some((name, bytes.to_vec()));
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| AppError::BadRequest("No file is received".into()))?;
    let (stem, ext) = split_filename(&file_name)?;

    let kind = query.kind();
    let dir  = FsPath::new(&state.config.upload_dir).join(kind.dir());
    fs::create_dir_all(&dir).await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Could not create upload dir: {e}")))?;

    let unique = format!("{stem}-{}-{}.{ext}", Utc::now().timestamp(), Uuid::new_v4());
    fs::write(dir.join(&unique), &bytes).await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Write failed: {e}")))?;

    let image_url = format!("uploads/{}/{unique}", kind.dir());
    tracing::info!(%image_url, size = bytes.len(), "Image uploaded");
    Ok(Json(json!({ "imageUrl": image_url })))
}
