use crate::{error::Error, label};

/// The parts of one source line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tokens<'a> {
    pub label: Option<&'a str>,
    pub mnemonic: Option<&'a str>,
    pub args: &'a str,
    pub comment: Option<&'a str>,
}

impl Tokens<'_> {
    pub fn is_directive(&self) -> bool {
        self.mnemonic.is_some_and(|m| m.starts_with('#'))
    }
}

/// Split at the first `;` that is not inside a double-quoted string.
pub fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut quoted = false;
    for (idx, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ';' if !quoted => return (&line[..idx], Some(&line[idx + 1..])),
            _ => {}
        }
    }
    (line, None)
}

pub fn tokenize(line: &str) -> Result<Tokens<'_>, Error> {
    let (code, comment) = split_comment(line);
    let mut rest = code.trim();

    let mut labels = vec![];
    while let Some((head, tail)) = next_word(rest) {
        if !head.starts_with(label::MARKERS) {
            break;
        }
        labels.push(head);
        rest = tail;
    }
    if labels.len() > 1 {
        return Err(Error::MultipleLabels(labels.join(" ")));
    }

    let (mnemonic, args) = match next_word(rest) {
        Some((head, tail)) => (Some(head), tail),
        None => (None, ""),
    };

    Ok(Tokens {
        label: labels.pop(),
        mnemonic,
        args,
        comment,
    })
}

fn next_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some((&s[..end], s[end..].trim())),
        None => Some((s, "")),
    }
}

/// Split operand text on commas outside quotes and parentheses.
pub fn split_args(text: &str) -> Vec<&str> {
    let text = text.trim();
    if text.is_empty() {
        return vec![];
    }
    let mut args = vec![];
    let mut quoted = false;
    let mut depth = 0;
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted && depth > 0 => depth -= 1,
            ',' if !quoted && depth == 0 => {
                args.push(text[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    args.push(text[start..].trim());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(line: &str, label: Option<&str>, mnemonic: Option<&str>, args: &str, comment: Option<&str>) {
        let tokens = tokenize(line).unwrap();
        assert_eq!(tokens.label, label, "{line}");
        assert_eq!(tokens.mnemonic, mnemonic, "{line}");
        assert_eq!(tokens.args, args, "{line}");
        assert_eq!(tokens.comment, comment, "{line}");
    }

    #[test]
    fn tests() {
        case("", None, None, "", None);
        case("   ; only a comment", None, None, "", Some(" only a comment"));
        case("LD A, 0x10", None, Some("LD"), "A, 0x10", None);
        case(".Repeat", Some(".Repeat"), None, "", None);
        case("~loop  DEC AB ; count", Some("~loop"), Some("DEC"), "AB", Some(" count"));
        case("  RET", None, Some("RET"), "", None);
        case("#DB \"a;b\", 1 ; tail", None, Some("#DB"), "\"a;b\", 1", Some(" tail"));
        case("JP NZ, .L", None, Some("JP"), "NZ, .L", None);
    }

    #[test]
    fn test_multiple_labels() {
        assert!(matches!(tokenize(".a ~b RET"), Err(Error::MultipleLabels(_))));
        assert!(matches!(tokenize(".a .b"), Err(Error::MultipleLabels(_))));
    }

    #[test]
    fn test_directive() {
        assert!(tokenize("#ORG 0x100").unwrap().is_directive());
        assert!(!tokenize("NOP").unwrap().is_directive());
    }

    #[test]
    fn test_split_args() {
        assert_eq!(split_args(""), Vec::<&str>::new());
        assert_eq!(split_args("A, 0x10"), vec!["A", "0x10"]);
        assert_eq!(split_args("\"a,b\", [3] \",\""), vec!["\"a,b\"", "[3] \",\""]);
        assert_eq!(split_args("A, (BCD + 4), 5"), vec!["A", "(BCD + 4)", "5"]);
        assert_eq!(split_args("A,,B"), vec!["A", "", "B"]);
    }
}
