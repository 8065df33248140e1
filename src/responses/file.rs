use astra::{Body, ResponseBuilder};

use crate::errors::ResultResp;

/// Serve attachment bytes fetched through a valid signed URL. Rendered
/// inline (the browser previews PDFs/images); the filename still gives
/// downloads a sensible name.
pub fn file_response(bytes: Vec<u8>, content_type: Option<&str>, filename: &str) -> ResultResp {
    let ct = content_type.unwrap_or("application/octet-stream");
    // quotes stripped so the header stays well-formed
    let safe_name: String = filename.chars().filter(|c| *c != '"').collect();

    let resp = ResponseBuilder::new()
        .status(200)
        .header("Content-Type", ct)
        .header(
            "Content-Disposition",
            format!("inline; filename=\"{safe_name}\""),
        )
        .header("Cache-Control", "private, no-store")
        .body(Body::from(bytes))
        .unwrap();
    Ok(resp)
}
