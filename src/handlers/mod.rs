pub mod health_handler;
pub mod register_handler;
