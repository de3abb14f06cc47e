pub mod auth;
pub mod marks;
