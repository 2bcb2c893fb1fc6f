use crate::error::Error;

/// An integer literal as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Number {
    pub magnitude: u32,
    pub negative: bool,
    pub radix: u32,
    /// Digits written after the prefix, leading zeros included.
    pub digits: usize,
}

impl Number {
    /// `0x` hex, `0b` binary, `0o` octal or decimal, with an optional leading
    /// `-` and `_` digit separators.
    pub fn parse(s: &str) -> Result<Number, Error> {
        let err = || Error::ParseNumber(s.to_string());
        let s = s.trim();
        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (radix, body) = match unsigned.get(..2).map(|p| p.to_ascii_lowercase()) {
            Some(p) if p == "0x" => (16, &unsigned[2..]),
            Some(p) if p == "0b" => (2, &unsigned[2..]),
            Some(p) if p == "0o" => (8, &unsigned[2..]),
            _ => (10, unsigned),
        };
        let body: String = body.chars().filter(|c| *c != '_').collect();
        if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
            return Err(err());
        }
        let value = u64::from_str_radix(&body, radix).map_err(|_| err())?;
        let magnitude = u32::try_from(value).map_err(|_| Error::NumberTooLarge(s.to_string()))?;
        if negative && magnitude > 0x8000_0000 {
            return Err(Error::NumberTooLarge(s.to_string()));
        }
        Ok(Number {
            magnitude,
            negative,
            radix,
            digits: body.len(),
        })
    }

    pub fn value(&self) -> i64 {
        if self.negative {
            -(self.magnitude as i64)
        } else {
            self.magnitude as i64
        }
    }

    /// Smallest byte width (1-4) holding the value. Zero padding widens it:
    /// `0x0010` and `0023` take two bytes.
    pub fn min_width(&self) -> usize {
        let m = self.magnitude as u64;
        let by_value = if self.negative {
            match m {
                0..=0x80 => 1,
                0x81..=0x8000 => 2,
                0x8001..=0x80_0000 => 3,
                _ => 4,
            }
        } else {
            match m {
                0..=0xFF => 1,
                0x100..=0xFFFF => 2,
                0x1_0000..=0xFF_FFFF => 3,
                _ => 4,
            }
        };
        let by_digits = (1..=4)
            .find(|w| self.digits <= max_digits(self.radix, *w))
            .unwrap_or(4);
        by_value.max(by_digits)
    }

    /// Big-endian bytes of the value truncated to `width` bytes.
    pub fn to_be_bytes(&self, width: usize) -> Vec<u8> {
        let width = width.min(4);
        truncate(self.value(), width * 8).to_be_bytes()[4 - width..].to_vec()
    }
}

/// Digits needed to write the largest `width`-byte value in `radix`.
fn max_digits(radix: u32, width: usize) -> usize {
    let mut max = u32::MAX >> (32 - 8 * width);
    let mut digits = 1;
    while max >= radix {
        max /= radix;
        digits += 1;
    }
    digits
}

/// Low `bits` bits of `value`; negative values become two's complement.
pub fn truncate(value: i64, bits: usize) -> u32 {
    let mask: u64 = if bits >= 32 {
        0xFFFF_FFFF
    } else {
        (1 << bits) - 1
    };
    (value as u64 & mask) as u32
}

/// Float literals need a digit before the point: `1.5`, `-0.25`, `3.0e2`.
pub fn parse_float(s: &str) -> Option<f32> {
    let s = s.trim();
    let body = s.strip_prefix('-').unwrap_or(s);
    if !body.starts_with(|c: char| c.is_ascii_digit()) || !body.contains('.') {
        return None;
    }
    s.parse::<f32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_number {
        ($($name:ident: $src:expr => ($value:expr, $width:expr),)*) => {
            $(
                #[test]
                fn $name() {
                    let num = Number::parse($src).unwrap();
                    assert_eq!(num.value(), $value);
                    assert_eq!(num.min_width(), $width);
                }
            )*
        }
    }

    test_number! {
        test_dec: "23" => (23, 1),
        test_dec_wide: "256" => (256, 2),
        test_hex: "0x10" => (0x10, 1),
        test_hex_upper: "0XFF" => (0xFF, 1),
        test_hex_padded: "0x0010" => (0x10, 2),
        test_hex_padded24: "0x000001" => (1, 3),
        test_bin: "0b1010" => (10, 1),
        test_bin_padded: "0b0000_0000_0000_0001" => (1, 2),
        test_oct: "0o17" => (15, 1),
        test_separators: "1_000_000" => (1_000_000, 3),
        test_neg: "-10" => (-10, 1),
        test_neg_edge: "-128" => (-128, 1),
        test_neg_wide: "-129" => (-129, 2),
        test_neg_hex: "-0x10" => (-16, 1),
        test_u32: "0xFFFFFFFF" => (0xFFFF_FFFF, 4),
        test_dec_padded: "0023" => (23, 2),
        test_dec_padded24: "00000300" => (300, 3),
        test_oct_padded: "0o0000017" => (15, 3),
        test_neg_min: "-0x80000000" => (-0x8000_0000, 4),
    }

    #[test]
    fn test_rejects() {
        for src in ["", "-", "0x", "12a", "+5", "0b102", "AB", ".L", "1.5"] {
            assert!(Number::parse(src).is_err(), "{src}");
        }
        assert!(matches!(
            Number::parse("0x1_0000_0000"),
            Err(Error::NumberTooLarge(_))
        ));
        assert!(matches!(
            Number::parse("-0xFFFFFFFF"),
            Err(Error::NumberTooLarge(_))
        ));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate(-10, 16), 0xFFF6);
        assert_eq!(truncate(-10, 8), 0xF6);
        assert_eq!(truncate(0x1234, 8), 0x34);
        assert_eq!(truncate(-1, 32), 0xFFFF_FFFF);
        assert_eq!(truncate(-1, 24), 0xFF_FFFF);
    }

    #[test]
    fn test_bytes() {
        assert_eq!(Number::parse("0x0010").unwrap().to_be_bytes(2), vec![0x00, 0x10]);
        assert_eq!(Number::parse("-2").unwrap().to_be_bytes(1), vec![0xFE]);
        assert_eq!(
            Number::parse("0x123456").unwrap().to_be_bytes(3),
            vec![0x12, 0x34, 0x56]
        );
    }

    #[test]
    fn test_float() {
        assert_eq!(parse_float("1.5"), Some(1.5));
        assert_eq!(parse_float("-0.25"), Some(-0.25));
        assert_eq!(parse_float("10"), None);
        assert_eq!(parse_float(".5"), None);
        assert_eq!(parse_float("inf"), None);
    }
}
