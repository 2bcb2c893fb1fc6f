use crate::error::Error;

/// One run of equal characters in a format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `o`: suboperand code bits
    Sub,
    /// `u`: always-zero filler
    Zero,
    /// `A`, `B`, ...: operand by argument index
    Operand(usize),
}

/// A bit template parsed once from its format string.
///
/// The alphabet is `o` (suboperand code), `u` (zero filler) and one capital
/// letter per argument (`A` is argument 0). Whitespace is ignored. Every field
/// is a single run, at most 32 bits wide, and the total is a whole number of
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    fields: Vec<(Field, usize)>,
    bits: usize,
}

impl Template {
    pub fn parse(src: &str) -> Result<Self, Error> {
        let mut fields: Vec<(Field, usize)> = Vec::new();
        let mut bits = 0;
        for c in src.chars().filter(|c| !c.is_whitespace()) {
            let field = match c {
                'o' => Field::Sub,
                'u' => Field::Zero,
                'A'..='Z' => Field::Operand((c as u8 - b'A') as usize),
                _ => return Err(Error::TemplateChar(src.to_string(), c)),
            };
            bits += 1;
            match fields.last_mut() {
                Some((last, width)) if *last == field => *width += 1,
                _ => {
                    if field != Field::Zero && fields.iter().any(|(f, _)| *f == field) {
                        return Err(Error::SplitField(src.to_string(), c));
                    }
                    fields.push((field, 1));
                }
            }
        }

        for (field, width) in &fields {
            let limit = match field {
                Field::Sub => 8,
                Field::Zero => usize::MAX,
                Field::Operand(_) => 32,
            };
            if *width > limit {
                return Err(Error::FieldTooWide(src.to_string(), letter(*field), *width));
            }
        }

        if bits % 8 != 0 {
            return Err(Error::UnalignedTemplate(src.to_string(), bits));
        }

        Ok(Template {
            source: src.to_string(),
            fields,
            bits,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Payload length in bytes (the opcode byte is not included).
    pub fn len(&self) -> usize {
        self.bits / 8
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Width of the `o` run, 0 when the template has none.
    pub fn sub_width(&self) -> usize {
        self.width_of(Field::Sub)
    }

    /// Width of operand `index`, 0 when the operand takes no bits.
    pub fn operand_width(&self, index: usize) -> usize {
        self.width_of(Field::Operand(index))
    }

    fn width_of(&self, field: Field) -> usize {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, width)| *width)
            .unwrap_or(0)
    }

    /// Pack the suboperand code and operand values, most significant bit
    /// first. Values wider than their field are truncated to its low bits.
    pub fn pack(&self, sub: u8, operands: &[u32]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        let mut acc: u8 = 0;
        let mut filled = 0;
        for (field, width) in &self.fields {
            let value: u32 = match field {
                Field::Sub => sub as u32,
                Field::Zero => 0,
                Field::Operand(index) => operands.get(*index).copied().unwrap_or(0),
            };
            for bit in (0..*width).rev() {
                let set = bit < 32 && (value >> bit) & 1 == 1;
                acc = (acc << 1) | set as u8;
                filled += 1;
                if filled == 8 {
                    out.push(acc);
                    acc = 0;
                    filled = 0;
                }
            }
        }
        out
    }
}

fn letter(field: Field) -> char {
    match field {
        Field::Sub => 'o',
        Field::Zero => 'u',
        Field::Operand(index) => (b'A' + index as u8) as char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields() {
        let t = Template::parse("oooooooo AAAAAuuu BBBBBBBB").unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.sub_width(), 8);
        assert_eq!(t.operand_width(0), 5);
        assert_eq!(t.operand_width(1), 8);
        assert_eq!(t.operand_width(2), 0);
    }

    #[test]
    fn test_empty() {
        let t = Template::parse("").unwrap();
        assert!(t.is_empty());
        assert_eq!(t.pack(0, &[]), Vec::<u8>::new());
    }

    #[test]
    fn test_pack() {
        let t = Template::parse("oooooooo AAAAAuuu BBBBBBBB").unwrap();
        assert_eq!(t.pack(0x00, &[0, 0x10]), vec![0x00, 0x00, 0x10]);
        assert_eq!(t.pack(0x07, &[1, 0xFF]), vec![0x07, 0x08, 0xFF]);
    }

    #[test]
    fn test_pack_truncates() {
        let t = Template::parse("AAAAAAAA").unwrap();
        assert_eq!(t.pack(0, &[0x1234]), vec![0x34]);
    }

    #[test]
    fn test_pack_order_follows_template() {
        let t = Template::parse("oooo BBBB AAAAAAAA").unwrap();
        assert_eq!(t.pack(0xA, &[0x12, 0x3]), vec![0xA3, 0x12]);
    }

    #[test]
    fn test_pack_unaligned_fields() {
        // 6 + 5 + 5 bits across a byte boundary
        let t = Template::parse("ooooooAAAAABBBBB").unwrap();
        assert_eq!(t.pack(0b000001, &[0b00011, 0b00001]), vec![0b0000_0100, 0b0110_0001]);
    }

    #[test]
    fn test_rejects() {
        assert!(matches!(
            Template::parse("oooooo"),
            Err(Error::UnalignedTemplate(_, 6))
        ));
        assert!(matches!(
            Template::parse("AAAABBBBAAAAAAAA"),
            Err(Error::SplitField(_, 'A'))
        ));
        assert!(matches!(
            Template::parse("ooooxxxx"),
            Err(Error::TemplateChar(_, 'x'))
        ));
        assert!(matches!(
            Template::parse("ooooooooo uuuuuuu"),
            Err(Error::FieldTooWide(_, 'o', 9))
        ));
    }
}
