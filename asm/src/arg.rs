use arch::{Flag, FloatReg, OpKind, Reg, Special};
use once_cell::sync::Lazy;
use std::fmt;

use crate::{
    error::Error,
    label::{self, LabelRef},
    literal::{self, Number},
};

// ----------------------------------------------------------------------------
// Argument

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Imm {
    pub value: i64,
    /// Shape width in bytes. 3 (`nnn`) until normalized.
    pub width: u8,
}

/// Which part of a memory operand an argument is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// `(x)`
    Whole,
    /// `(x` in `(x + y)`
    Open,
    /// `y)` in `(x + y)`
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Imm(Imm),
    Float(f32),
    Reg(Reg),
    FloatReg(FloatReg),
    Flag(Flag),
    Special(Special),
    Label(LabelRef),
    Addr(Addressing, Box<Argument>),
}

impl Argument {
    /// Shape token used in the general form.
    pub fn shape(&self) -> String {
        match self {
            Argument::Imm(imm) => "n".repeat(imm.width as usize),
            Argument::Float(_) => "fnnn".to_string(),
            Argument::Reg(reg) => reg.shape(),
            Argument::FloatReg(_) => "fr".to_string(),
            Argument::Flag(_) => "ff".to_string(),
            Argument::Special(special) => special.to_string(),
            Argument::Label(r) => "n".repeat(r.width as usize),
            Argument::Addr(Addressing::Whole, inner) => format!("({})", inner.shape()),
            Argument::Addr(Addressing::Open, inner) => format!("({}", inner.shape()),
            Argument::Addr(Addressing::Close, inner) => format!("{})", inner.shape()),
        }
    }

    /// The unwrapped value, looking through addressing.
    pub fn inner(&self) -> &Argument {
        match self {
            Argument::Addr(_, inner) => inner.inner(),
            other => other,
        }
    }

    pub fn label_mut(&mut self) -> Option<&mut LabelRef> {
        match self {
            Argument::Label(r) => Some(r),
            Argument::Addr(_, inner) => inner.label_mut(),
            _ => None,
        }
    }

    fn set_width(&mut self, width: u8) {
        match self {
            Argument::Imm(imm) => imm.width = width,
            Argument::Label(r) => r.width = width,
            _ => {}
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Imm(imm) if imm.value < 0 => write!(f, "{}", imm.value),
            Argument::Imm(imm) => write!(f, "0x{:X}", imm.value),
            Argument::Float(v) => write!(f, "{v:?}"),
            Argument::Reg(reg) => write!(f, "{reg}"),
            Argument::FloatReg(reg) => write!(f, "{reg}"),
            Argument::Flag(flag) => write!(f, "{flag}"),
            Argument::Special(special) => write!(f, "{special}"),
            Argument::Label(r) => write!(f, "{}", r.name),
            Argument::Addr(Addressing::Whole, inner) => write!(f, "({inner})"),
            Argument::Addr(Addressing::Open, inner) => write!(f, "({inner}"),
            Argument::Addr(Addressing::Close, inner) => write!(f, "{inner})"),
        }
    }
}

// ----------------------------------------------------------------------------
// Classification

/// Classify one operand token. A memory operand with an offset,
/// `(BCD + 4)`, yields two arguments.
pub fn classify(token: &str, condition: bool, relative: bool) -> Result<Vec<Argument>, Error> {
    let token = token.trim();
    let Some(inner) = token.strip_prefix('(') else {
        return Ok(vec![classify_value(token, condition, relative)?]);
    };
    let inner = inner
        .strip_suffix(')')
        .ok_or_else(|| Error::ParseArgument(token.to_string()))?
        .trim();

    match split_offset(inner) {
        Some((base, offset)) => {
            let base = classify_value(base, false, relative)?;
            let offset = classify_value(&offset, false, relative)?;
            Ok(vec![
                Argument::Addr(Addressing::Open, Box::new(base)),
                Argument::Addr(Addressing::Close, Box::new(offset)),
            ])
        }
        None => {
            let value = classify_value(inner, false, relative)?;
            Ok(vec![Argument::Addr(Addressing::Whole, Box::new(value))])
        }
    }
}

/// `x + y` → (`x`, `y`); `x - y` → (`x`, `-y`). A leading sign is not a split.
fn split_offset(inner: &str) -> Option<(&str, String)> {
    let (idx, sign) = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')?;
    let base = inner[..idx].trim();
    let offset = inner[idx + 1..].trim();
    let offset = match (sign, offset.strip_prefix('-')) {
        ('-', Some(positive)) => positive.trim().to_string(),
        ('-', None) => format!("-{offset}"),
        _ => offset.to_string(),
    };
    Some((base, offset))
}

fn classify_value(token: &str, condition: bool, relative: bool) -> Result<Argument, Error> {
    if token.is_empty() {
        return Err(Error::ParseArgument(token.to_string()));
    }
    if condition {
        if let Ok(flag) = Flag::parse(token) {
            return Ok(Argument::Flag(flag));
        }
    }
    if let Ok(special) = Special::parse(token) {
        return Ok(Argument::Special(special));
    }
    if let Ok(reg) = FloatReg::parse(token) {
        return Ok(Argument::FloatReg(reg));
    }
    if let Ok(reg) = Reg::parse(token) {
        return Ok(Argument::Reg(reg));
    }
    if token.starts_with(label::MARKERS) {
        let name = label::normalize(token)?;
        return Ok(Argument::Label(LabelRef::new(name, relative)));
    }
    match Number::parse(token) {
        Ok(num) => {
            return Ok(Argument::Imm(Imm {
                value: num.value(),
                width: 3,
            }))
        }
        Err(err @ Error::NumberTooLarge(_)) => return Err(err),
        Err(_) => {}
    }
    if let Some(v) = literal::parse_float(token) {
        return Ok(Argument::Float(v));
    }
    Err(Error::ParseArgument(token.to_string()))
}

// ----------------------------------------------------------------------------
// General form

pub fn general_form(op: OpKind, args: &[Argument]) -> String {
    if args.is_empty() {
        return op.to_string();
    }
    let shapes: Vec<String> = args.iter().map(Argument::shape).collect();
    format!("{} {}", op, shapes.join(","))
}

/// Operand patterns whose trailing `nnn` takes the width of the destination
/// register. `R` is any integer register shape.
static WIDTH_PATTERNS: Lazy<Vec<Vec<&'static str>>> = Lazy::new(|| {
    [
        "R,nnn",
        "R,R,nnn",
        "R,(rrr,nnn),nnn",
        "R,(nnn,nnn),nnn",
        "R,(rrr,nnn),R,nnn",
        "R,(rrr,nnn),(rrr,nnn),nnn",
    ]
    .iter()
    .map(|p| p.split(',').collect())
    .collect()
});

fn matches_pattern(pattern: &[&str], args: &[Argument]) -> bool {
    pattern.len() == args.len()
        && pattern.iter().zip(args).all(|(p, arg)| match *p {
            "R" => matches!(arg, Argument::Reg(_)),
            p => arg.shape() == p,
        })
}

/// Resize the generic value operand of `LD`, `ADD`, `SUB` and `DIV` to the
/// destination register width. Runs once, right after classification.
pub fn normalize_shapes(op: OpKind, mut args: Vec<Argument>) -> Vec<Argument> {
    if !op.sized_by_destination() {
        return args;
    }
    let Some(Argument::Reg(dest)) = args.first() else {
        return args;
    };
    let width = dest.width;
    if WIDTH_PATTERNS.iter().any(|p| matches_pattern(p, &args)) {
        if let Some(last) = args.last_mut() {
            last.set_width(width);
        }
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(op: OpKind, tokens: &[&str]) -> Vec<Argument> {
        let mut out = vec![];
        for (idx, token) in tokens.iter().enumerate() {
            let condition = idx == 0 && op.takes_condition(tokens.len());
            out.extend(classify(token, condition, op.is_relative()).unwrap());
        }
        normalize_shapes(op, out)
    }

    macro_rules! test_form {
        ($($name:ident: $op:ident [$($tok:expr),*] => $form:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let args = args(OpKind::$op, &[$($tok),*]);
                    assert_eq!(general_form(OpKind::$op, &args), $form);
                }
            )*
        }
    }

    test_form! {
        form_ld_r_n: LD ["A", "0x10"] => "LD r,n",
        form_ld_rr_nn: LD ["AB", "-10"] => "LD rr,nn",
        form_ld_rrrr_nnnn: LD ["ABCD", "1"] => "LD rrrr,nnnn",
        form_ld_label: LD ["BCD", ".data"] => "LD rrr,nnn",
        form_ld_fr_fr: LD ["F0", "F1"] => "LD fr,fr",
        form_ld_fr_float: LD ["F2", "1.5"] => "LD fr,fnnn",
        form_ld_mem: LD ["A", "(0x1000)"] => "LD r,(nnn)",
        form_ld_offset: LD ["AB", "(CDE + 4)"] => "LD rr,(rrr,nnn)",
        form_ld_special: LD ["SPC", "0x100"] => "LD SPC,nnn",
        form_add_three: ADD ["AB", "CD", "7"] => "ADD rr,rr,nn",
        form_add_four: ADD ["A", "(BCD - 2)", "7"] => "ADD r,(rrr,nnn),n",
        form_add_four_abs: SUB ["A", "(0x10 + 2)", "7"] => "SUB r,(nnn,nnn),n",
        form_div_five: DIV ["A", "(BCD + 1)", "E", "7"] => "DIV r,(rrr,nnn),r,n",
        form_add_six: ADD ["AB", "(CDE + 1)", "(FGH + 2)", "7"] => "ADD rr,(rrr,nnn),(rrr,nnn),nn",
        form_cp_generic: CP ["AB", "0"] => "CP rr,nnn",
        form_xor_generic: XOR ["A", "5"] => "XOR r,nnn",
        form_mul_generic: MUL ["A", "5"] => "MUL r,nnn",
        form_jp_cond: JP ["NZ", ".Repeat"] => "JP ff,nnn",
        form_jp_z_flag: JP ["Z", ".L"] => "JP ff,nnn",
        form_jp_plain: JP [".L"] => "JP nnn",
        form_jp_reg: JP ["BCD"] => "JP rrr",
        form_ret_cond: RET ["C"] => "RET ff",
        form_ret: RET [] => "RET",
        form_dec: DEC ["AB"] => "DEC rr",
        form_inc_mem: INC ["(BCD)"] => "INC (rrr)",
    }

    #[test]
    fn test_flag_only_in_condition_position() {
        let args = args(OpKind::LD, &["Z", "C"]);
        assert_eq!(args[0], Argument::Reg(Reg { index: 25, width: 1 }));
        assert_eq!(args[1], Argument::Reg(Reg { index: 2, width: 1 }));
    }

    #[test]
    fn test_relative_label() {
        let args = args(OpKind::JR, &[".back"]);
        match &args[0] {
            Argument::Label(r) => {
                assert!(r.relative);
                assert_eq!(r.name, ".BACK");
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_offset_split() {
        let args = classify("(BCD - 4)", false, false).unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].shape(), "(rrr");
        assert_eq!(args[1].shape(), "nnn)");
        assert_eq!(
            *args[1].inner(),
            Argument::Imm(Imm { value: -4, width: 3 })
        );
    }

    #[test]
    fn test_negated_offset() {
        let args = classify("(BCD - -4)", false, false).unwrap();
        assert_eq!(*args[1].inner(), Argument::Imm(Imm { value: 4, width: 3 }));
        let args = classify("(BCD + -4)", false, false).unwrap();
        assert_eq!(*args[1].inner(), Argument::Imm(Imm { value: -4, width: 3 }));
    }

    #[test]
    fn test_offset_not_normalized() {
        let args = args(OpKind::LD, &["A", "(BCD + 4)"]);
        assert_eq!(general_form(OpKind::LD, &args), "LD r,(rrr,nnn)");
    }

    #[test]
    fn test_normalize_is_pure() {
        let once = args(OpKind::LD, &["AB", "5"]);
        let twice = normalize_shapes(OpKind::LD, once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_classify_errors() {
        for bad in ["", "A+", "(A", "%", ".", "0x1_0000_0000", "(BCD + )"] {
            assert!(classify(bad, false, false).is_err(), "{bad}");
        }
    }
}
