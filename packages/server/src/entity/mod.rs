pub mod queue_item;
pub mod song;
pub mod table;
pub mod user;
