// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: JWT Authentication Required
// Route Prefix: /bi/*
// Middleware: jwt_auth_middleware → validate_tenant_middleware

pub mod bi;

pub use bi::*;
