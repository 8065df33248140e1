pub mod errors;
pub mod file;
pub mod html;
pub mod redirect;

pub use errors::html_error_response;
pub use file::file_response;
pub use html::{html_response, html_response_with_status};
pub use redirect::{redirect, redirect_with_session_cookie};

pub use crate::errors::ResultResp;
