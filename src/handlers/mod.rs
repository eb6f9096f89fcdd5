// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (USER role) → Elevated (ADMIN role)
pub mod elevated;
pub mod protected;
pub mod public;
