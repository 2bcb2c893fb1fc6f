pub mod arg;
pub mod assembler;
pub mod block;
pub mod db;
pub mod encode;
pub mod error;
pub mod label;
pub mod lexer;
pub mod literal;
pub mod msg;
pub mod source;
pub mod util;

pub use assembler::{build, Assembler, Assembly, CompiledLine};
pub use block::{Collision, CollisionKind};
pub use error::Error;
pub use msg::{Msg, Msgs, Severity};
