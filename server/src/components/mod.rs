use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use maud::{html, Markup, Render, DOCTYPE};

/// Bare-bones operator-facing page used by the OAuth callback outcomes.
/// These render once during setup, so the styling stays minimal.
pub struct Page {
    pub status: StatusCode,
    pub title: String,
    pub content: Markup,
}

impl Page {
    pub fn new(status: StatusCode, title: impl Into<String>, content: Markup) -> Self {
        Self {
            status,
            title: title.into(),
            content,
        }
    }
}

impl Render for Page {
    fn render(&self) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    title { (self.title) }
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                }
                body style="font-family: system-ui, sans-serif; max-width: 40rem; margin: 3rem auto; padding: 0 1rem;" {
                    h2 { (self.title) }
                    (self.content)
                }
            }
        }
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        let body = self.render();

        // Setup pages carry credentials or handshake detail; never cacheable.
        (self.status, [(header::CACHE_CONTROL, "no-store")], body).into_response()
    }
}
