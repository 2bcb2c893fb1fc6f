use crate::{
    error::Error,
    label::{self, LabelRef},
    lexer,
    literal::{self, truncate, Number},
};

const MAX_REPEAT: u32 = 0xFF_FFFF;

#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    Bytes(Vec<u8>),
    /// 24-bit address, zero until resolved.
    Label(LabelRef),
}

/// One comma-separated `#DB` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct DbArg {
    pub raw: String,
    pub repeat: u32,
    pub value: DbValue,
}

impl DbArg {
    pub fn parse(raw: &str) -> Result<DbArg, Error> {
        let raw = raw.trim();
        let (repeat, body) = match raw.strip_prefix('[') {
            Some(rest) => {
                let (count, body) = rest
                    .split_once(']')
                    .ok_or_else(|| Error::RepeatCount(raw.to_string()))?;
                let count = Number::parse(count)?;
                if count.negative || count.magnitude == 0 || count.magnitude > MAX_REPEAT {
                    return Err(Error::RepeatCount(raw.to_string()));
                }
                (count.magnitude, body.trim())
            }
            None => (1, raw),
        };
        Ok(DbArg {
            raw: raw.to_string(),
            repeat,
            value: parse_value(body)?,
        })
    }

    pub fn bytes(&self) -> Vec<u8> {
        let unit = match &self.value {
            DbValue::Bytes(bytes) => bytes.clone(),
            DbValue::Label(r) => truncate(r.value.unwrap_or(0), 24).to_be_bytes()[1..].to_vec(),
        };
        unit.repeat(self.repeat as usize)
    }

    pub fn label_mut(&mut self) -> Option<&mut LabelRef> {
        match &mut self.value {
            DbValue::Label(r) => Some(r),
            DbValue::Bytes(_) => None,
        }
    }
}

fn parse_value(body: &str) -> Result<DbValue, Error> {
    if body.starts_with('"') {
        let inner = body
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .ok_or_else(|| Error::UnterminatedString(body.to_string()))?;
        if !inner.is_ascii() {
            return Err(Error::NonAscii(body.to_string()));
        }
        return Ok(DbValue::Bytes(inner.as_bytes().to_vec()));
    }
    if body.starts_with(label::MARKERS) {
        let name = label::normalize(body)?;
        return Ok(DbValue::Label(LabelRef::new(name, false)));
    }
    match Number::parse(body) {
        Ok(num) => return Ok(DbValue::Bytes(num.to_be_bytes(num.min_width()))),
        Err(err @ Error::NumberTooLarge(_)) => return Err(err),
        Err(_) => {}
    }
    if let Some(v) = literal::parse_float(body) {
        return Ok(DbValue::Bytes(v.to_be_bytes().to_vec()));
    }
    Err(Error::ParseData(body.to_string()))
}

/// Parse the whole argument text of a `#DB` line.
pub fn parse_args(text: &str) -> Result<Vec<DbArg>, Error> {
    let args = lexer::split_args(text);
    if args.is_empty() {
        return Err(Error::MissingArgument("#DB".to_string()));
    }
    args.into_iter().map(DbArg::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(text: &str) -> Vec<u8> {
        parse_args(text)
            .unwrap()
            .iter()
            .flat_map(DbArg::bytes)
            .collect()
    }

    macro_rules! test_db {
        ($($name:ident: $src:expr => $bytes:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(bytes($src), $bytes);
                }
            )*
        }
    }

    test_db! {
        db_repeat: "[10] 23" => vec![0x17; 10],
        db_empty_string: "\"\"" => Vec::<u8>::new(),
        db_string: "\"Hi, you\"" => b"Hi, you".to_vec(),
        db_string_repeat: "[2] \"ab\"" => b"abab".to_vec(),
        db_byte: "0x10" => vec![0x10],
        db_padded_hex: "0x0010" => vec![0x00, 0x10],
        db_padded_bin: "0b0000_0001_0000_0000" => vec![0x01, 0x00],
        db_wide: "0x123456" => vec![0x12, 0x34, 0x56],
        db_negative: "-1" => vec![0xFF],
        db_negative_wide: "-300" => vec![0xFE, 0xD4],
        db_float: "1.0" => vec![0x3F, 0x80, 0x00, 0x00],
        db_list: "1, 2, \"a\"" => vec![1, 2, b'a'],
        db_pending_label: ".data" => vec![0, 0, 0],
        db_padded_dec: "0023" => vec![0x00, 0x17],
        db_padded_dec24: "00000300" => vec![0x00, 0x01, 0x2C],
        db_padded_oct: "0o0000017" => vec![0x00, 0x00, 0x0F],
    }

    #[test]
    fn test_label_refresh() {
        let mut args = parse_args(".data, [2] ~x").unwrap();
        args[0].label_mut().unwrap().value = Some(0x123456);
        args[1].label_mut().unwrap().value = Some(0x10);
        let bytes: Vec<u8> = args.iter().flat_map(DbArg::bytes).collect();
        assert_eq!(bytes, vec![0x12, 0x34, 0x56, 0x00, 0x00, 0x10, 0x00, 0x00, 0x10]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_args(""), Err(Error::MissingArgument(_))));
        assert!(matches!(parse_args("[0] 1"), Err(Error::RepeatCount(_))));
        assert!(matches!(parse_args("[0x1000000] 1"), Err(Error::RepeatCount(_))));
        assert!(matches!(parse_args("[3 1"), Err(Error::RepeatCount(_))));
        assert!(matches!(parse_args("\"abc"), Err(Error::UnterminatedString(_))));
        assert!(matches!(parse_args("\""), Err(Error::UnterminatedString(_))));
        assert!(matches!(parse_args("\"é\""), Err(Error::NonAscii(_))));
        assert!(matches!(parse_args("A"), Err(Error::ParseData(_))));
        assert!(matches!(parse_args("1, , 2"), Err(Error::ParseData(_))));
        assert!(matches!(parse_args("-0xFFFFFFFF"), Err(Error::NumberTooLarge(_))));
    }
}
