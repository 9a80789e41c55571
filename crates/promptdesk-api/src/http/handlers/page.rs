//! The HTML form page.

use axum::response::Html;

/// GET / - The single-page form. It creates its session on load and deletes it on unload.
pub async fn form_page() -> Html<&'static str> {
    Html(include_str!("../assets/form.html"))
}
