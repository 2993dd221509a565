use axum::response::Response;
use scraper::Html;

async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    String::from_utf8_lossy(&body).into_owned()
}

pub(crate) async fn parse_html_document(response: Response) -> Html {
    Html::parse_document(&body_text(response).await)
}

/// Parse a response that holds an htmx fragment rather than a whole page.
pub(crate) async fn parse_html_fragment(response: Response) -> Html {
    Html::parse_fragment(&body_text(response).await)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(html.errors.is_empty(), "HTML has errors: {:?}", html.errors);
}
