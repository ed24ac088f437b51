pub mod register_schema;

pub use register_schema::{RegisterResponseSchema, RegisterSchema, RegisteredUserSchema};
