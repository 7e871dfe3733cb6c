pub mod claim;
pub mod query;
pub mod write;

pub use claim::{claim_messages, mark_processed, ClaimRequest};
pub use query::{get_message, pending_messages, queue_stats};
pub use write::insert_message;
