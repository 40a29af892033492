//! Read-only web viewer for translated chunks.
//!
//! `GET /` renders the original/translation pairs as an HTML table,
//! `GET /api/chunks` returns every row as JSON.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::{ChunkStore, SqliteChunkStore, TranslatedPair};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    store: Arc<dyn ChunkStore>,
}

/// Run the web viewer.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let store: Arc<dyn ChunkStore> = Arc::new(SqliteChunkStore::new(&settings.sqlite_path())?);
    let app = router(store);

    let host = host.unwrap_or_else(|| settings.serve.host.clone());
    let port = port.unwrap_or(settings.serve.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("subtrans viewer");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Table", "GET  /");
    Output::kv("Chunks", "GET  /api/chunks");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(store: Arc<dyn ChunkStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(table_page))
        .route("/api/chunks", get(list_chunks))
        .route("/health", get(health))
        .layer(cors)
        .with_state(Arc::new(AppState { store }))
}

// === Response Types ===

#[derive(Serialize)]
struct ChunkListResponse {
    chunks: Vec<crate::store::Chunk>,
    total: usize,
    translated: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn table_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.translated_pairs().await {
        Ok(pairs) => Html(render_table(&pairs)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("<p>{}</p>", escape_html(&e.to_string()))),
        )
            .into_response(),
    }
}

async fn list_chunks(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.all_chunks().await {
        Ok(chunks) => {
            let translated = chunks.iter().filter(|c| c.is_translated()).count();
            Json(ChunkListResponse {
                total: chunks.len(),
                translated,
                chunks,
            })
            .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

// === Rendering ===

fn render_table(pairs: &[TranslatedPair]) -> String {
    let mut rows = String::new();
    for pair in pairs {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(&pair.original_text),
            escape_html(&pair.translation)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8">
<title>subtrans</title>
<style>
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ccc; padding: 8px; vertical-align: top; white-space: pre-wrap; }}
th {{ background: #f4f4f4; }}
</style>
</head>
<body>
<table>
<tr><th>원문</th><th>번역</th></tr>
{}</table>
</body>
</html>
"#,
        rows
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryChunkStore;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_table() {
        let html = render_table(&[TranslatedPair {
            id: 1,
            original_text: "Hello <world>\n".to_string(),
            translation: "안녕 세계".to_string(),
        }]);

        assert!(html.contains("<th>원문</th><th>번역</th>"));
        assert!(html.contains("<td>Hello &lt;world&gt;\n</td><td>안녕 세계</td>"));
    }

    #[tokio::test]
    async fn test_table_page_lists_translated_rows_only() {
        let store = MemoryChunkStore::new();
        let ids = store
            .insert_chunks(&["Hello\n".to_string(), "World\n".to_string()])
            .await
            .unwrap();
        store.record_translation(ids[0], "안녕").await.unwrap();

        let state = Arc::new(AppState {
            store: Arc::new(store),
        });
        let pairs = state.store.translated_pairs().await.unwrap();
        let html = render_table(&pairs);

        assert!(html.contains("안녕"));
        assert!(!html.contains("World"));
    }
}
