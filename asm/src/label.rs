use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Error;

pub const ABSOLUTE: char = '.';
pub const RELATIVE: char = '~';
pub const MARKERS: [char; 2] = [ABSOLUTE, RELATIVE];

/// Check a label and return its table key (upper case, marker kept).
/// The body allows `A-Z`, `0-9`, `_` and `?`.
pub fn normalize(name: &str) -> Result<String, Error> {
    let invalid = || Error::InvalidLabel(name.to_string());
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if MARKERS.contains(&c) => {}
        _ => return Err(invalid()),
    }
    let body = chars.as_str();
    if body.is_empty()
        || !body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '?')
    {
        return Err(invalid());
    }
    Ok(name.to_ascii_uppercase())
}

/// A label operand. `value` stays `None` until the resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRef {
    pub name: String,
    pub relative: bool,
    /// Shape width in bytes.
    pub width: u8,
    pub value: Option<i64>,
}

impl LabelRef {
    pub fn new(name: String, relative: bool) -> Self {
        LabelRef {
            name,
            relative,
            width: 3,
            value: None,
        }
    }
}

/// Label name → 24-bit address, in declaration order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Labels(IndexMap<String, u32>);

impl Labels {
    pub fn new() -> Self {
        Labels(IndexMap::new())
    }

    pub fn declare(&mut self, name: &str) -> Result<(), Error> {
        let key = normalize(name)?;
        if self.0.contains_key(&key) {
            return Err(Error::RedefinedLabel(name.to_string()));
        }
        self.0.insert(key, 0);
        Ok(())
    }

    /// Update a declared label. Returns false for unknown names.
    pub fn set(&mut self, key: &str, address: u32) -> bool {
        match self.0.get_mut(key) {
            Some(slot) => {
                *slot = address;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.0.get(key).copied()
    }

    /// Fill in `r.value`: the label address, or the signed distance from
    /// `at` for relative operands.
    pub fn resolve(&self, r: &mut LabelRef, at: u32) -> Result<(), Error> {
        match self.get(&r.name) {
            Some(address) => {
                r.value = Some(if r.relative {
                    address as i64 - at as i64
                } else {
                    address as i64
                });
                Ok(())
            }
            None => {
                r.value = None;
                Err(Error::UndefinedLabel(r.name.clone()))
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u32)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(".Repeat").unwrap(), ".REPEAT");
        assert_eq!(normalize("~loop_2?").unwrap(), "~LOOP_2?");
        for bad in ["", ".", "~", "Repeat", ".a-b", ".a.b", "~é"] {
            assert!(normalize(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_declare() {
        let mut labels = Labels::new();
        labels.declare(".Loop").unwrap();
        assert!(matches!(labels.declare(".LOOP"), Err(Error::RedefinedLabel(_))));
        labels.declare("~Loop").unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get(".LOOP"), Some(0));
    }

    #[test]
    fn test_resolve() {
        let mut labels = Labels::new();
        labels.declare(".L").unwrap();
        assert!(labels.set(".L", 0x100));
        assert!(!labels.set(".MISSING", 0x100));

        let mut abs = LabelRef::new(".L".to_string(), false);
        labels.resolve(&mut abs, 0x180).unwrap();
        assert_eq!(abs.value, Some(0x100));

        let mut rel = LabelRef::new(".L".to_string(), true);
        labels.resolve(&mut rel, 0x180).unwrap();
        assert_eq!(rel.value, Some(-0x80));

        let mut missing = LabelRef::new(".NOPE".to_string(), false);
        assert!(labels.resolve(&mut missing, 0).is_err());
        assert_eq!(missing.value, None);
    }
}
