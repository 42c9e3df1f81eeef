mod code;
mod record;

pub use code::{StatusCode, symbol_of};
pub use record::{NormalizedRecord, normalize_all};
