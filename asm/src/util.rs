use arch::ISA;
use color_print::cformat;

use crate::{
    assembler::{Assembly, CompiledLine},
    lexer,
};

const BYTES_SHOWN: usize = 6;

/// Hex column: the first few bytes, `..` when there are more.
fn hex(bytes: &[u8]) -> String {
    let mut out: Vec<String> = bytes
        .iter()
        .take(BYTES_SHOWN)
        .map(|b| format!("{b:02X}"))
        .collect();
    if bytes.len() > BYTES_SHOWN {
        out.push("..".to_string());
    }
    out.join(" ")
}

/// Form name decoded back from the opcode and sub-operand bytes.
fn decoded_form(line: &CompiledLine) -> Option<&'static str> {
    let op = line.op?;
    let form = ISA.form(line.form.as_deref()?)?;
    let sub = match form.template.sub_width() {
        0 => 0,
        width => line.bytes.get(1).map(|b| b >> (8 - width))?,
    };
    ISA.general_form(op.opcode(), sub)
}

fn body(line: &CompiledLine) -> String {
    let label = line
        .label
        .as_ref()
        .map(|l| cformat!("<g>{}</> ", l))
        .unwrap_or_default();
    let code = match (&line.mnemonic, line.op) {
        (Some(_), Some(op)) => {
            let args: Vec<String> = line.args.iter().map(|a| a.to_string()).collect();
            let form = decoded_form(line)
                .map(|f| cformat!(" <m>[{}]</>", f))
                .unwrap_or_default();
            cformat!("<s>{}</> {}{}", op, args.join(", "), form)
        }
        (Some(directive), None) if directive.starts_with('#') => {
            let args = lexer::tokenize(&line.source.text)
                .map(|t| t.args.to_string())
                .unwrap_or_default();
            cformat!("<c>{}</> {}", directive, args)
        }
        (Some(other), None) => cformat!("<y>{}</>", other),
        (None, _) => String::new(),
    };
    let comment = line
        .comment
        .as_ref()
        .map(|c| format!(" ;{c}"))
        .unwrap_or_default();
    format!("{label}{code}{comment}")
}

pub fn print_dump(assembly: &Assembly) {
    let mut file = None;
    for line in assembly.lines() {
        if file != Some(&line.source.file) {
            file = Some(&line.source.file);
            println!(
                "{}+------[{}]{}",
                "-".repeat(27),
                line.source.file,
                "-".repeat(45usize.saturating_sub(line.source.file.len()))
            );
        }
        let addr = if line.bytes.is_empty() && line.label.is_none() {
            "      ".to_string()
        } else {
            format!("{:06X}", line.address)
        };
        let bytes = match &line.error {
            Some(_) => cformat!("<r,s>{}</>", format!("{:<20}", "!!")),
            None => format!("{:<20}", hex(&line.bytes)),
        };
        println!(
            "[{}] {}| {:>4}: {}",
            addr,
            bytes,
            line.source.number,
            body(line)
        );
    }
    println!("{}+{}", "-".repeat(27), "-".repeat(53));
    println!(
        "entry 0x{:06X}{}, last origin 0x{:06X}, {} block(s)",
        assembly.entry(),
        if assembly.entry_from_org() { " (from #ORG)" } else { "" },
        assembly.origin(),
        assembly.block_count()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[]), "");
        assert_eq!(hex(&[0x01, 0xAB]), "01 AB");
        assert_eq!(hex(&[0; 8]), "00 00 00 00 00 00 ..");
    }

    #[test]
    fn test_decoded_form() {
        let assembly = crate::build("LD AB, 0x10\nJP NZ, .L\n.L RET", std::path::Path::new("."));
        let lines = assembly.lines();
        assert_eq!(decoded_form(&lines[0]), Some("LD rr,nn"));
        assert_eq!(decoded_form(&lines[1]), Some("JP ff,nnn"));
        assert_eq!(decoded_form(&lines[2]), Some("RET"));
    }
}
