// handlers/protected/mod.rs - Protected handlers (USER role required)
//
// Security Level: HTTP Basic authentication, role USER (admins hold it too)
// Route Prefix: /api/v1/employees
// Middleware: require_user

pub mod employees;

pub use employees::*;
