use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Error;

/// Instruction mnemonics. The discriminant is the primary opcode byte.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    Display,
)]
#[repr(u8)]
pub enum OpKind {
    NOP,
    LD,
    ADD,
    SUB,
    DIV,
    MUL,
    INC,
    DEC,
    AND,
    OR,
    XOR,
    CP,
    JP,
    JR,
    CALL,
    CALLR,
    RET,
    PUSH,
    POP,
    HALT,
}

impl OpKind {
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s.to_ascii_uppercase().parse::<Self>() {
            Ok(op) => Ok(op),
            Err(_) => Err(Error::UnknownOperation(s.to_string())),
        }
    }

    pub fn opcode(self) -> u8 {
        self.into()
    }
}

impl OpKind {
    /// Label operands of these ops resolve to a signed displacement from the
    /// instruction address instead of the label address.
    pub fn is_relative(self) -> bool {
        matches!(self, OpKind::JR | OpKind::CALLR)
    }

    /// Whether the first of `argc` operands is a condition flag.
    pub fn takes_condition(self, argc: usize) -> bool {
        use OpKind::*;
        match self {
            JP | JR | CALL | CALLR => argc == 2,
            RET => argc == 1,
            _ => false,
        }
    }

    /// Ops whose generic immediate is sized by the destination register.
    pub fn sized_by_destination(self) -> bool {
        matches!(self, OpKind::LD | OpKind::ADD | OpKind::SUB | OpKind::DIV)
    }
}
