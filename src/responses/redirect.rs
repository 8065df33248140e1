use astra::{Body, ResponseBuilder};

use crate::errors::ResultResp;

pub fn redirect(location: &str) -> ResultResp {
    let resp = ResponseBuilder::new()
        .status(302)
        .header("Location", location)
        .body(Body::empty())
        .unwrap();
    Ok(resp)
}

/// Redirect that also sets the session cookie (or clears it when the value
/// is empty). HttpOnly keeps the token away from page scripts.
pub fn redirect_with_session_cookie(location: &str, session_token: &str) -> ResultResp {
    let cookie = if session_token.is_empty() {
        "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0".to_string()
    } else {
        format!("session={session_token}; Path=/; HttpOnly; SameSite=Lax")
    };

    let resp = ResponseBuilder::new()
        .status(302)
        .header("Location", location)
        .header("Set-Cookie", cookie)
        .body(Body::empty())
        .unwrap();
    Ok(resp)
}
