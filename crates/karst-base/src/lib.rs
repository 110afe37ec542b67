mod error;
mod key;
mod kind;

pub use error::{fatal, ConstError};
pub use key::ContentKey;
pub use kind::LiteralKind;
