use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

use crate::error::Error;

// ----------------------------------------------------------------------------
// Integer register

/// A run of 1-4 consecutive letter registers (`A`, `AB`, `ABC`, `ABCD`).
/// The run wraps around after `Z`, so `ZA` and `YZAB` are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reg {
    pub index: u8,
    pub width: u8,
}

impl Reg {
    pub const COUNT: u8 = 26;

    pub fn parse(s: &str) -> Result<Self, Error> {
        let unknown = || Error::UnknownRegister(s.to_string());
        let letters = s.to_ascii_uppercase().into_bytes();
        if letters.is_empty() || letters.len() > 4 {
            return Err(unknown());
        }
        if !letters.iter().all(|c| c.is_ascii_uppercase()) {
            return Err(unknown());
        }
        let index = letters[0] - b'A';
        for (offset, letter) in letters.iter().enumerate() {
            if (letter - b'A') != (index + offset as u8) % Self::COUNT {
                return Err(unknown());
            }
        }
        Ok(Reg {
            index,
            width: letters.len() as u8,
        })
    }

    pub fn bits(&self) -> u8 {
        self.width * 8
    }

    /// Shape token: `r`, `rr`, `rrr` or `rrrr`.
    pub fn shape(&self) -> String {
        "r".repeat(self.width as usize)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for offset in 0..self.width {
            let letter = b'A' + (self.index + offset) % Self::COUNT;
            write!(f, "{}", letter as char)?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Float register

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloatReg(pub u8);

impl FloatReg {
    pub const COUNT: u8 = 16;

    pub fn parse(s: &str) -> Result<Self, Error> {
        let unknown = || Error::UnknownFloatRegister(s.to_string());
        let digits = s
            .strip_prefix('F')
            .or_else(|| s.strip_prefix('f'))
            .ok_or_else(unknown)?;
        if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
            return Err(unknown());
        }
        match digits.parse::<u8>() {
            Ok(index) if index < Self::COUNT => Ok(FloatReg(index)),
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for FloatReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Flag

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
pub enum Flag {
    NZ,
    Z,
    C,
    NC,
    SP,
    SN,
    NO,
    OV,
    PE,
    PO,
    NE,
    EQ,
    LTE,
    GT,
    GTE,
    LT,
}

impl Flag {
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s.to_ascii_uppercase().parse::<Self>() {
            Ok(flag) => Ok(flag),
            Err(_) => Err(Error::UnknownFlag(s.to_string())),
        }
    }
}

// ----------------------------------------------------------------------------
// Special register

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
pub enum Special {
    /// Call stack pointer
    SPC,
    /// Register stack pointer
    SPR,
}

impl Special {
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s.to_ascii_uppercase().parse::<Self>() {
            Ok(special) => Ok(special),
            Err(_) => Err(Error::UnknownSpecial(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_reg {
        ($($name:ident: $src:expr => ($index:expr, $width:expr),)*) => {
            $(
                #[test]
                fn $name() {
                    let reg = Reg::parse($src).unwrap();
                    assert_eq!(reg, Reg { index: $index, width: $width });
                    assert_eq!(reg.to_string(), $src.to_ascii_uppercase());
                }
            )*
        }
    }

    test_reg! {
        test_a: "A" => (0, 1),
        test_z: "Z" => (25, 1),
        test_ab: "AB" => (0, 2),
        test_lower: "bcd" => (1, 3),
        test_abcd: "ABCD" => (0, 4),
        test_wrap16: "ZA" => (25, 2),
        test_wrap32: "XYZA" => (23, 4),
    }

    #[test]
    fn test_reg_rejects() {
        for src in ["", "AC", "ABCDE", "A1", "BA", "F0"] {
            assert!(Reg::parse(src).is_err(), "{src}");
        }
    }

    #[test]
    fn test_float_reg() {
        assert_eq!(FloatReg::parse("F0"), Ok(FloatReg(0)));
        assert_eq!(FloatReg::parse("f15"), Ok(FloatReg(15)));
        assert!(FloatReg::parse("F16").is_err());
        assert!(FloatReg::parse("F").is_err());
        assert!(FloatReg::parse("FA").is_err());
    }

    #[test]
    fn test_flag() {
        assert_eq!(Flag::parse("nz"), Ok(Flag::NZ));
        assert_eq!(u8::from(Flag::NZ), 0);
        assert_eq!(u8::from(Flag::GTE), 14);
        assert_eq!(u8::from(Flag::LT), 15);
        assert!(Flag::parse("XX").is_err());
    }

    #[test]
    fn test_special() {
        assert_eq!(Special::parse("spc"), Ok(Special::SPC));
        assert_eq!(Special::SPR.to_string(), "SPR");
        assert!(Special::parse("SP").is_err());
    }
}
