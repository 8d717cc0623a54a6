//! HTTP middleware applied at the outermost router layer.

pub mod security;

pub use security::security_headers;
