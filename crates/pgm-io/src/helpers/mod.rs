pub mod conversions;

pub use conversions::{parse_infinity, safe_i64_to_i32, safe_i64_to_i8};
