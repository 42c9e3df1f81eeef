pub mod client;
pub mod error;
pub mod types;

pub use client::{JobSource, OozieClient};
pub use error::OozieError;
pub use types::RawJobRecord;
