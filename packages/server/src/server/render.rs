//! Render bridge - hands page requests to the page renderer.
//!
//! The page framework itself lives outside this service. The bridge passes it
//! the request path, query, resolved user and pending flash messages.

use async_trait::async_trait;
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use std::collections::HashMap;

use crate::domains::users::User;

/// Everything a page renderer gets to see about a request
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub user: Option<User>,
    pub flash: Vec<String>,
}

#[async_trait]
pub trait RenderBridge: Send + Sync {
    async fn render(&self, page: PageRequest) -> Response;
}

/// Default renderer: an HTML shell carrying the page context as JSON
///
/// A client-side app picks up `window.__PAGE_CONTEXT__` and renders the page.
#[derive(Debug, Clone, Default)]
pub struct HtmlShellRenderer;

impl HtmlShellRenderer {
    pub fn render_html(page: &PageRequest) -> String {
        let context = serde_json::to_string(page)
            .unwrap_or_else(|_| "{}".to_string())
            .replace('<', "\\u003c")
            .replace('>', "\\u003e")
            .replace('&', "\\u0026");

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
</head>
<body>
    <div id="root" data-path="{title}"></div>
    <script>window.__PAGE_CONTEXT__ = {context};</script>
    <script src="/static/app.js"></script>
</body>
</html>
"#,
            title = escape_html(&page.path),
            context = context,
        )
    }
}

#[async_trait]
impl RenderBridge for HtmlShellRenderer {
    async fn render(&self, page: PageRequest) -> Response {
        Html(Self::render_html(&page)).into_response()
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
