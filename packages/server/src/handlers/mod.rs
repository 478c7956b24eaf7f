pub mod auth;
pub mod fallback;
pub mod queue;
pub mod song;
pub mod table;
