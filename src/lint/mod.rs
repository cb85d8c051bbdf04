mod issue;
mod linter;

pub use issue::*;
pub use linter::*;
