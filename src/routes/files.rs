use std::path::Path;

use super::*;

pub async fn script(State(state): State<AppState>, ReqPath(file_name): ReqPath<String>) -> Response {
    static_file(&state, "scripts", &file_name).await
}

pub async fn style(State(state): State<AppState>, ReqPath(file_name): ReqPath<String>) -> Response {
    static_file(&state, "styles", &file_name).await
}

pub async fn asset(State(state): State<AppState>, ReqPath(file_name): ReqPath<String>) -> Response {
    static_file(&state, "assets", &file_name).await
}

fn content_type(file_name: &str) -> &'static str {
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

async fn static_file(state: &AppState, subfolder: &str, file_name: &str) -> Response {
    // Only plain file names inside the subfolder are served.
    if file_name.contains("..") || file_name.contains('/') || file_name.contains('\\') {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = state
        .settings
        .content
        .static_dir
        .join(subfolder)
        .join(file_name);
    match tokio::fs::read(&path).await {
        Ok(content) => (
            [(header::CONTENT_TYPE, content_type(file_name))],
            content,
        )
            .into_response(),
        Err(_) => {
            warn!(path = %path.display(), "static file not found");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
