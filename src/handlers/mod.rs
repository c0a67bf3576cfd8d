// handlers/mod.rs
//
// auth:   register / login / logout / profile / refresh, mounted on both
//         /api/auth (current envelope) and /api/v01 (legacy envelope)
// system: root, health, 404 fallback, panic rendering
pub mod auth;
pub mod system;
