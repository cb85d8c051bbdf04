mod compiler;
mod error;
mod shared;
#[cfg(test)]
pub(crate) mod test_support;
mod token;
mod validator;
mod walker;

pub use compiler::*;
pub use error::*;
pub use shared::*;
pub use token::*;
pub use validator::*;
pub use walker::*;
