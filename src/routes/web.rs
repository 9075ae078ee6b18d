//! # 공개 페이지 라우트
//!
//! `/web/{username}`은 로그인 없이 누구나 볼 수 있습니다.
//! - `GET /web/{username}`: 서버에서 렌더링한 HTML
//! - `GET /api/v1/web/{username}`: 같은 내용을 JSON으로
//!
//! 모르는 사용자는 404와 함께 "User not found"를 보여줍니다.
//! 사용자가 입력한 값은 모두 HTML 이스케이프를 거쳐 출력됩니다.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};

use crate::{models::PublicPage, routes::AppState, services::public_page};

fn status_for(page: &PublicPage) -> StatusCode {
    if page.found {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

pub async fn public_page_json(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> (StatusCode, Json<PublicPage>) {
    let store = state.stores.scoped(None);
    let page = public_page::resolve(store.as_ref(), &username).await;
    (status_for(&page), Json(page))
}

pub async fn public_page_html(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> (StatusCode, Html<String>) {
    let store = state.stores.scoped(None);
    let page = public_page::resolve(store.as_ref(), &username).await;
    (status_for(&page), Html(render(&page)))
}

/// 공개 페이지 HTML
///
/// 사용자가 없으면 안내 문구만, 있으면 `@username` 줄과 제목,
/// 발행된 적이 있으면 발행 시각(UTC)까지 보여줍니다.
pub fn render(page: &PublicPage) -> String {
    let body = if page.found {
        let published = page
            .published_at
            .map(|at| {
                format!(
                    "<p class=\"published\">Published {}</p>\n",
                    escape_html(&at.format("%Y-%m-%d %H:%M UTC").to_string())
                )
            })
            .unwrap_or_default();
        format!(
            "<p class=\"handle\">@{username}</p>\n<h1>{heading}</h1>\n{published}",
            username = escape_html(&page.username),
            heading = escape_html(page.heading()),
        )
    } else {
        format!("<p>{}</p>\n", escape_html(page.heading()))
    };

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <meta name=\"description\" content=\"{description}\">\n\
         <meta property=\"og:title\" content=\"{title}\">\n\
         </head>\n\
         <body>\n\
         <main>\n\
         {body}\
         </main>\n\
         </body>\n\
         </html>\n",
        title = escape_html(page.document_title()),
        description = escape_html(&page.description()),
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
