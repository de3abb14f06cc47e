pub mod marks;
pub mod user;
