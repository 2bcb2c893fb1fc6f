use arch::Form;

use crate::{
    arg::Argument,
    literal::truncate,
};

/// Field value of one argument for a `bits`-wide operand field.
/// Pending labels encode as 0.
pub fn operand_value(arg: &Argument, bits: usize) -> u32 {
    match arg.inner() {
        Argument::Imm(imm) => truncate(imm.value, bits),
        Argument::Float(v) => v.to_bits(),
        Argument::Reg(reg) => reg.index as u32,
        Argument::FloatReg(reg) => reg.0 as u32,
        Argument::Flag(flag) => u8::from(*flag) as u32,
        Argument::Special(_) => 0,
        Argument::Label(r) => truncate(r.value.unwrap_or(0), bits),
        Argument::Addr(..) => 0,
    }
}

/// Opcode byte followed by the packed payload. Pure: same inputs, same bytes.
pub fn encode(form: &Form, args: &[Argument]) -> Vec<u8> {
    let operands: Vec<u32> = args
        .iter()
        .enumerate()
        .map(|(idx, arg)| operand_value(arg, form.template.operand_width(idx)))
        .collect();
    form.encode(&operands)
}
