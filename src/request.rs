//! Request side collaborators.
mod parser;

pub use parser::RequestParser;
