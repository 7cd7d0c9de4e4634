//! Domain services shared by the route handlers.

pub mod interview;
pub mod users;
