pub mod handler;
pub mod response;
pub mod validation;
