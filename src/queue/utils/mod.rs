pub mod naming;

pub use naming::{parse_payload, quote_identifier, validate_queue_name};
