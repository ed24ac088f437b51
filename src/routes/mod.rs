pub mod health_routes;
pub mod registration_routes;
