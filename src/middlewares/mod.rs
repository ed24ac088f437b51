pub mod proxy;
pub mod rate_limiter;
