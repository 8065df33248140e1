pub mod sessions;
pub mod signin;
pub mod token;
