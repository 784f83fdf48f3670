pub mod completions;
pub mod inspect;
pub mod parse;
pub mod schema;
