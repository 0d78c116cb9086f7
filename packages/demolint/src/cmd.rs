pub mod grammar;
pub mod parse;
pub mod settings;
pub mod validate;
