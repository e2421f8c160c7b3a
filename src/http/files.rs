//! Static file serving.
//!
//! # Responsibilities
//! - Resolve a captured wildcard path against a root directory
//! - Refuse paths that escape the root or touch hidden entries
//! - Pick a Content-Type from the file extension
//!
//! # Design Decisions
//! - Files are read whole; dispatch is synchronous and bodies are buffered
//! - Directories serve their `index.html`, never a listing

use std::path::{Component, Path, PathBuf};

use axum::http::StatusCode;

use crate::http::{Request, ResponseWriter};

/// Collaborator that writes a file below `root` to the response.
pub trait FileServer: Send + Sync {
    fn serve_file(&self, w: &mut ResponseWriter, req: &Request, root: &Path, path: &str);
}

/// Serves files straight from the local filesystem.
#[derive(Debug, Clone)]
pub struct FsFileServer {
    index_file: String,
}

impl Default for FsFileServer {
    fn default() -> Self {
        Self {
            index_file: "index.html".to_string(),
        }
    }
}

impl FsFileServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index_file(index_file: impl Into<String>) -> Self {
        Self {
            index_file: index_file.into(),
        }
    }
}

impl FileServer for FsFileServer {
    fn serve_file(&self, w: &mut ResponseWriter, _req: &Request, root: &Path, path: &str) {
        let Some(relative) = sanitize(path) else {
            tracing::debug!(path = %path, "Rejected file path");
            w.text(StatusCode::FORBIDDEN, "403 forbidden\n");
            return;
        };
        if has_hidden_component(&relative) {
            w.text(StatusCode::NOT_FOUND, "404 page not found\n");
            return;
        }

        let mut full = root.join(&relative);
        if full.is_dir() {
            full = full.join(&self.index_file);
        }

        match std::fs::read(&full) {
            Ok(contents) => {
                let content_type = full
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(mime_type_for_extension)
                    .unwrap_or("application/octet-stream");
                w.set_status(StatusCode::OK);
                w.set_content_type(content_type);
                w.write_bytes(&contents);
            }
            Err(e) => {
                tracing::debug!(file = %full.display(), error = %e, "File not served");
                w.text(StatusCode::NOT_FOUND, "404 page not found\n");
            }
        }
    }
}

/// Turn a request path into a relative path that stays below the root.
fn sanitize(path: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

fn has_hidden_component(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(part) => part.to_str().is_some_and(|s| s.starts_with('.')),
        _ => false,
    })
}

pub fn mime_type_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "wasm" => "application/wasm",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
