pub mod auth;
pub mod queue;
pub mod shared;
pub mod song;
pub mod table;
