pub mod queue_status;
pub mod storage;

pub use queue_status::QueueStatus;
