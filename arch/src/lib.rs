pub mod error;
pub mod isa;
pub mod op;
pub mod reg;
pub mod template;

pub use error::Error;
pub use isa::{Form, Isa, ISA};
pub use op::OpKind;
pub use reg::{Flag, FloatReg, Reg, Special};
pub use template::{Field, Template};
