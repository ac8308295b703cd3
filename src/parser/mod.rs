pub mod error;
pub mod raw;
pub mod scanner;

pub use error::{Expected, ExpectedKind, Location, Position, SyntaxError, SyntaxErrorKind};
pub use raw::{Rule, SelectorParser};
