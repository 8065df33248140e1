use astra::{Body, ResponseBuilder};
use maud::Markup;

use crate::errors::ResultResp;

pub fn html_response(markup: Markup) -> ResultResp {
    html_response_with_status(markup, 200)
}

/// Same body shape with an explicit status, e.g. 409 for an edit conflict
/// page that still renders the editor.
pub fn html_response_with_status(markup: Markup, status: u16) -> ResultResp {
    let body = markup.into_string();

    let resp = ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(body))
        .unwrap();

    Ok(resp)
}
