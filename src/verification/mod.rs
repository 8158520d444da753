pub mod address;

pub use address::{validate_address, validate_request};
