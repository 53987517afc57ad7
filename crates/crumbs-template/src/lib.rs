pub mod ast;
pub mod error;
pub mod parser;


pub use ast::*;
pub use error::{ParseError, ParseErrorKind};
pub use parser::parse_template;
