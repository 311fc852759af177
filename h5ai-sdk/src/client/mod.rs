pub mod cookies;
pub mod core;
pub mod http;
