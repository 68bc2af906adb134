use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

macro_rules! asset {
    ($file:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/web/assets/", $file))
    };
}

pub const INDEX_HTML: &str = asset!("index.html");

/// Static file served next to the preview page.
pub struct Asset {
    content_type: &'static str,
    body: &'static str,
}

pub fn lookup(name: &str) -> Option<Asset> {
    let (content_type, body) = match name {
        "app.js" => ("application/javascript; charset=utf-8", asset!("app.js")),
        "styles.css" => ("text/css; charset=utf-8", asset!("styles.css")),
        _ => return None,
    };
    Some(Asset { content_type, body })
}

impl IntoResponse for Asset {
    fn into_response(self) -> Response {
        ([(axum::http::header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "").into_response()
}
