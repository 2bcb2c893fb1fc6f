use std::path::{Path, PathBuf};

use crate::{error::Error, lexer, msg::Msgs};

/// One physical line after include expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub file: String,
    /// 1-based
    pub number: usize,
    pub text: String,
}

/// Split `text` into lines and inline `#include "path"` directives.
/// Include paths are relative to the directory of the including file;
/// `base` is that directory for `text` itself. `origin` is the file `text`
/// was read from, if any, so that it cannot include itself.
pub fn preprocess(
    text: &str,
    name: &str,
    base: &Path,
    origin: Option<PathBuf>,
    msgs: &mut Msgs,
) -> Vec<SourceLine> {
    let mut out = vec![];
    let mut stack: Vec<PathBuf> = origin.into_iter().collect();
    expand(text, name, base, &mut stack, &mut out, msgs);
    out
}

fn expand(
    text: &str,
    name: &str,
    base: &Path,
    stack: &mut Vec<PathBuf>,
    out: &mut Vec<SourceLine>,
    msgs: &mut Msgs,
) {
    for (idx, raw) in text.lines().enumerate() {
        let line = SourceLine {
            file: name.to_string(),
            number: idx + 1,
            text: raw.to_string(),
        };

        let include = match lexer::tokenize(raw) {
            Ok(tokens) if tokens.label.is_none() => tokens
                .mnemonic
                .filter(|m| m.eq_ignore_ascii_case("#include"))
                .map(|_| tokens.args),
            _ => None,
        };
        let Some(arg) = include else {
            out.push(line);
            continue;
        };

        let file = match include_path(arg) {
            Some(file) => file,
            None => {
                msgs.error(Error::MissingArgument("#include".to_string()), Some(&line));
                continue;
            }
        };
        let path = base.join(file);
        let canonical = match path.canonicalize() {
            Ok(canonical) => canonical,
            Err(err) => {
                let err = Error::FileOpen(path.display().to_string(), err);
                msgs.error(format!("{err}: {}", source_text(&err)), Some(&line));
                continue;
            }
        };
        if stack.contains(&canonical) {
            msgs.error(Error::RecursiveInclude(file.to_string()), Some(&line));
            continue;
        }
        let content = match std::fs::read_to_string(&canonical) {
            Ok(content) => content,
            Err(err) => {
                let err = Error::FileOpen(path.display().to_string(), err);
                msgs.error(format!("{err}: {}", source_text(&err)), Some(&line));
                continue;
            }
        };

        tracing::debug!("include {}", canonical.display());
        let dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| base.to_path_buf());
        stack.push(canonical);
        expand(&content, &path.display().to_string(), &dir, stack, out, msgs);
        stack.pop();
    }
}

fn include_path(arg: &str) -> Option<&str> {
    let arg = arg.trim();
    let inner = arg.strip_prefix('"')?.strip_suffix('"')?;
    (!inner.is_empty()).then_some(inner)
}

fn source_text(err: &Error) -> String {
    use std::error::Error as _;
    err.source().map(|s| s.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("casm-source-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_plain_lines() {
        let mut msgs = Msgs::new();
        let lines = preprocess("NOP\n\nRET", "main", Path::new("."), None, &mut msgs);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].number, 3);
        assert_eq!(lines[2].text, "RET");
        assert!(msgs.is_empty());
    }

    #[test]
    fn test_include() {
        let dir = scratch("include");
        fs::write(dir.join("lib.asm"), "INC A\nDEC B").unwrap();
        let mut msgs = Msgs::new();
        let lines = preprocess(
            "NOP\n#include \"lib.asm\" ; pulls two lines\nRET",
            "main",
            &dir,
            None,
            &mut msgs,
        );
        assert!(!msgs.has_error());
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["NOP", "INC A", "DEC B", "RET"]);
        assert!(lines[1].file.ends_with("lib.asm"));
        assert_eq!(lines[2].number, 2);
    }

    #[test]
    fn test_recursive_include() {
        let dir = scratch("cycle");
        fs::write(dir.join("a.asm"), "#include \"b.asm\"\nNOP").unwrap();
        fs::write(dir.join("b.asm"), "#include \"a.asm\"\nRET").unwrap();
        let mut msgs = Msgs::new();
        let lines = preprocess("#include \"a.asm\"", "main", &dir, None, &mut msgs);
        assert!(msgs.has_error());
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["RET", "NOP"]);
    }

    #[test]
    fn test_missing_include() {
        let dir = scratch("missing");
        let mut msgs = Msgs::new();
        let lines = preprocess("#include \"nope.asm\"\nNOP", "main", &dir, None, &mut msgs);
        assert_eq!(lines.len(), 1);
        assert_eq!(msgs.count(crate::msg::Severity::Error), 1);
    }
}
