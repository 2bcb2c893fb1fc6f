use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use arch::{Form, OpKind, ISA};

use crate::{
    arg::{self, Argument},
    block::{Blocks, Collision},
    db::{self, DbArg},
    encode,
    error::Error,
    label::{self, LabelRef, Labels},
    lexer,
    literal::Number,
    msg::Msgs,
    source::{self, SourceLine},
};

/// First address past the 24-bit address space.
pub const ADDRESS_LIMIT: u64 = 0x100_0000;

/// One source line after pass 1, patched in pass 2.
#[derive(Debug, Clone)]
pub struct CompiledLine {
    pub source: SourceLine,
    pub block: Option<usize>,
    pub address: u32,
    /// Table key of the label defined on this line.
    pub label: Option<String>,
    pub mnemonic: Option<String>,
    pub op: Option<OpKind>,
    pub args: Vec<Argument>,
    /// General form, e.g. `LD rr,nn`.
    pub form: Option<String>,
    pub bytes: Vec<u8>,
    pub error: Option<String>,
    pub comment: Option<String>,
    pub db: Vec<DbArg>,
    encoding: Option<&'static Form>,
}

impl CompiledLine {
    fn new(source: SourceLine) -> Self {
        CompiledLine {
            source,
            block: None,
            address: 0,
            label: None,
            mnemonic: None,
            op: None,
            args: vec![],
            form: None,
            bytes: vec![],
            error: None,
            comment: None,
            db: vec![],
            encoding: None,
        }
    }

    pub fn is_instruction(&self) -> bool {
        self.encoding.is_some()
    }
}

/// Entry point given by `#RUN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunTarget {
    Address(u32),
    Label(LabelRef),
}

#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub cursor: u64,
    pub origin: u32,
    pub first_org: Option<u32>,
    /// `#RUN` target and the index of its line.
    pub run: Option<(usize, RunTarget)>,
    pub labels: Labels,
    pub directive_bytes: usize,
}

// ----------------------------------------------------------------------------
// Pass 0 and pass 1

/// State of one build.
#[derive(Debug, Default)]
pub struct Assembler {
    msgs: Msgs,
    stats: Stats,
    blocks: Blocks,
    block: Option<usize>,
    lines: Vec<CompiledLine>,
    placed: HashSet<String>,
}

impl Assembler {
    pub fn new() -> Self {
        Assembler::default()
    }

    /// Assemble `text`. `base` is the directory `#include` paths are
    /// relative to.
    pub fn build(mut self, text: &str, name: &str, base: &Path, origin: Option<PathBuf>) -> Assembly {
        let sources = source::preprocess(text, name, base, origin, &mut self.msgs);
        tracing::debug!("preprocess: {} lines", sources.len());

        let failed_at = self.prescan(&sources);
        tracing::debug!("pre-scan: {} labels", self.stats.labels.len());

        for (idx, src) in sources.into_iter().enumerate() {
            self.compile_line(src, failed_at == Some(idx));
        }
        tracing::debug!(
            "pass 1: {} lines, {} blocks, cursor 0x{:06X}",
            self.lines.len(),
            self.blocks.len(),
            self.stats.cursor
        );

        let mut assembly = Assembly {
            lines: self.lines,
            msgs: self.msgs,
            stats: self.stats,
            blocks: self.blocks,
            collisions: vec![],
            entry: 0,
            entry_from_org: false,
        };

        for (idx, err) in assembly.resolve() {
            let at = assembly.lines.get(idx).map(|line| line.source.clone());
            assembly.msgs.error(err, at.as_ref());
        }
        tracing::debug!("pass 2: entry 0x{:06X}", assembly.entry);

        assembly.check_blocks();
        assembly
    }

    /// Read `path` and assemble it.
    pub fn build_file(self, path: &Path) -> Result<Assembly, Error> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| Error::FileOpen(path.display().to_string(), err))?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(self.build(&text, &path.display().to_string(), &base, path.canonicalize().ok()))
    }

    /// Collect label names. Stops at the first bad line; returns its index.
    fn prescan(&mut self, sources: &[SourceLine]) -> Option<usize> {
        for (idx, src) in sources.iter().enumerate() {
            let result = lexer::tokenize(&src.text).and_then(|tokens| match tokens.label {
                Some(name) => self.stats.labels.declare(name),
                None => Ok(()),
            });
            if let Err(err) = result {
                self.msgs.error(err, Some(src));
                return Some(idx);
            }
        }
        None
    }

    fn compile_line(&mut self, src: SourceLine, reported: bool) {
        let mut line = CompiledLine::new(src);
        let text = line.source.text.clone();
        let tokens = match lexer::tokenize(&text) {
            Ok(tokens) => tokens,
            Err(err) => {
                line.error = Some(err.to_string());
                if !reported {
                    self.msgs.error(err, Some(&line.source));
                }
                self.lines.push(line);
                return;
            }
        };
        line.comment = tokens.comment.map(str::to_string);
        line.mnemonic = tokens.mnemonic.map(str::to_ascii_uppercase);

        let result = self.directive_org(&tokens);
        if let Err(err) = result {
            self.fail(&mut line, err);
        }

        line.block = self.block;
        line.address = self.stats.cursor.min(ADDRESS_LIMIT - 1) as u32;

        if let Some(name) = tokens.label {
            match self.place_label(name, &line) {
                Ok(key) => line.label = Some(key),
                Err(err) if reported => line.error = Some(err.to_string()),
                Err(err) => self.fail(&mut line, err),
            }
        }

        let mnemonic = line.mnemonic.clone();
        let result = match mnemonic.as_deref() {
            None | Some("#ORG") => Ok(()),
            Some("#RUN") => self.directive_run(tokens.args),
            Some("#DB") => self.directive_db(&mut line, tokens.args),
            Some(other) if other.starts_with('#') => Err(Error::UnknownDirective(other.to_string())),
            Some(_) => self.instruction(&mut line, tokens.args),
        };
        if let Err(err) = result {
            self.fail(&mut line, err);
        }

        if !line.bytes.is_empty() {
            let block = match self.block {
                Some(block) => block,
                None => {
                    tracing::trace!("implicit block at 0x000000");
                    let block = self.blocks.open(0);
                    self.block = Some(block);
                    block
                }
            };
            line.block = Some(block);

            let end = self.stats.cursor + line.bytes.len() as u64;
            if end > ADDRESS_LIMIT {
                self.fail(&mut line, Error::AddressOverflow(end));
            }
            self.stats.cursor = end;
        }
        tracing::trace!("{:06X} {:?} {:02X?}", line.address, line.form, line.bytes);
        self.lines.push(line);
    }

    fn fail(&mut self, line: &mut CompiledLine, err: Error) {
        line.error = Some(err.to_string());
        self.msgs.error(err, Some(&line.source));
    }

    fn place_label(&mut self, name: &str, line: &CompiledLine) -> Result<String, Error> {
        let key = label::normalize(name)?;
        if !self.placed.insert(key.clone()) {
            return Err(Error::RedefinedLabel(name.to_string()));
        }
        if self.stats.cursor >= ADDRESS_LIMIT {
            return Err(Error::AddressOverflow(self.stats.cursor));
        }
        if !self.stats.labels.set(&key, line.address) {
            self.msgs.info(
                format!("Label `{name}` is not recorded: label collection stopped at an earlier error"),
                Some(&line.source),
            );
        }
        Ok(key)
    }

    fn directive_org(&mut self, tokens: &lexer::Tokens<'_>) -> Result<(), Error> {
        let is_org = tokens
            .mnemonic
            .is_some_and(|m| m.eq_ignore_ascii_case("#ORG"));
        if !is_org {
            return Ok(());
        }
        let arg = tokens.args.trim();
        if arg.is_empty() {
            return Err(Error::MissingArgument("#ORG".to_string()));
        }
        let num = Number::parse(arg)?;
        if num.negative || num.magnitude as u64 >= ADDRESS_LIMIT {
            return Err(Error::AddressOverflow(num.magnitude as u64));
        }
        let start = num.magnitude;
        self.stats.cursor = start as u64;
        self.stats.origin = start;
        self.stats.first_org.get_or_insert(start);
        self.block = Some(self.blocks.open(start));
        tracing::trace!("block {} at 0x{:06X}", self.blocks.len() - 1, start);
        Ok(())
    }

    fn directive_run(&mut self, args: &str) -> Result<(), Error> {
        let arg = args.trim();
        if arg.is_empty() {
            return Err(Error::MissingArgument("#RUN".to_string()));
        }
        let target = if arg.starts_with(label::MARKERS) {
            RunTarget::Label(LabelRef::new(label::normalize(arg)?, false))
        } else {
            let num = Number::parse(arg)?;
            if num.negative || num.magnitude as u64 >= ADDRESS_LIMIT {
                return Err(Error::AddressOverflow(num.magnitude as u64));
            }
            RunTarget::Address(num.magnitude)
        };
        self.stats.run = Some((self.lines.len(), target));
        Ok(())
    }

    fn directive_db(&mut self, line: &mut CompiledLine, args: &str) -> Result<(), Error> {
        line.db = db::parse_args(args)?;
        line.bytes = line.db.iter().flat_map(DbArg::bytes).collect();
        self.stats.directive_bytes += line.bytes.len();
        Ok(())
    }

    fn instruction(&mut self, line: &mut CompiledLine, args: &str) -> Result<(), Error> {
        let mnemonic = line.mnemonic.clone().unwrap_or_default();
        let op = match OpKind::parse(&mnemonic) {
            Ok(op) => op,
            Err(_) => {
                let err = Error::UnknownOperation(mnemonic);
                line.error = Some(err.to_string());
                self.msgs.warn(err, Some(&line.source));
                return Ok(());
            }
        };
        line.op = Some(op);

        let tokens = lexer::split_args(args);
        let mut classified = vec![];
        for (idx, token) in tokens.iter().enumerate() {
            let condition = idx == 0 && op.takes_condition(tokens.len());
            classified.extend(arg::classify(token, condition, op.is_relative())?);
        }
        line.args = arg::normalize_shapes(op, classified);

        let general = arg::general_form(op, &line.args);
        let form: Option<&'static Form> = ISA.form(&general);
        line.form = Some(general.clone());
        let form = form.ok_or(Error::UnknownForm(general))?;
        line.bytes = encode::encode(form, &line.args);
        line.encoding = Some(form);
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Result and pass 2

/// A finished build.
#[derive(Debug)]
pub struct Assembly {
    lines: Vec<CompiledLine>,
    msgs: Msgs,
    stats: Stats,
    blocks: Blocks,
    collisions: Vec<Collision>,
    entry: u32,
    entry_from_org: bool,
}

impl Assembly {
    /// Patch label operands, re-encode and refill the blocks. Returns the
    /// lines whose labels could not be resolved, `#RUN` included; they keep
    /// zero operands.
    pub fn resolve(&mut self) -> Vec<(usize, Error)> {
        let labels = &self.stats.labels;
        let mut failures = vec![];

        for (idx, line) in self.lines.iter_mut().enumerate() {
            if line.encoding.is_none() && line.db.is_empty() {
                continue;
            }
            let mut failed = None;
            for arg in line.args.iter_mut() {
                if let Some(r) = arg.label_mut() {
                    if let Err(err) = labels.resolve(r, line.address) {
                        failed.get_or_insert(err);
                    }
                }
            }
            for db in line.db.iter_mut() {
                if let Some(r) = db.label_mut() {
                    if let Err(err) = labels.resolve(r, line.address) {
                        failed.get_or_insert(err);
                    }
                }
            }

            if let Some(form) = line.encoding {
                line.bytes = encode::encode(form, &line.args);
            } else if !line.db.is_empty() {
                line.bytes = line.db.iter().flat_map(DbArg::bytes).collect();
            }
            if let Some(err) = failed {
                line.error = Some(err.to_string());
                failures.push((idx, err));
            }
        }

        (self.entry, self.entry_from_org) = match &mut self.stats.run {
            Some((_, RunTarget::Address(address))) => (*address, false),
            Some((idx, RunTarget::Label(r))) => {
                if let Err(err) = labels.resolve(r, 0) {
                    if let Some(line) = self.lines.get_mut(*idx) {
                        line.error = Some(err.to_string());
                    }
                    failures.push((*idx, err));
                }
                (r.value.unwrap_or(0) as u32, false)
            }
            None => match self.stats.first_org {
                Some(org) => (org, true),
                None => (0, false),
            },
        };

        self.blocks.clear_bytes();
        for line in &self.lines {
            if let Some(block) = line.block {
                self.blocks.fill(block, &line.bytes);
            }
        }
        failures
    }

    fn check_blocks(&mut self) {
        self.collisions = self.blocks.collisions();
        for collision in &self.collisions {
            tracing::warn!("{collision}");
            self.msgs.warn(collision, None);
        }
    }

    pub fn lines(&self) -> &[CompiledLine] {
        &self.lines
    }

    pub fn diagnostics(&self) -> &Msgs {
        &self.msgs
    }

    pub fn has_errors(&self) -> bool {
        self.msgs.has_error()
    }

    pub fn entry(&self) -> u32 {
        self.entry
    }

    /// True when the entry point comes from the first `#ORG`.
    pub fn entry_from_org(&self) -> bool {
        self.entry_from_org
    }

    /// All blocks, in `#ORG` order.
    pub fn bytes(&self) -> Vec<u8> {
        self.blocks.iter().flat_map(|b| b.bytes.iter().copied()).collect()
    }

    pub fn block_bytes(&self, index: usize) -> Option<&[u8]> {
        self.blocks.get(index).map(|b| b.bytes.as_slice())
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    pub fn labels(&self) -> &Labels {
        &self.stats.labels
    }

    pub fn directive_bytes(&self) -> usize {
        self.stats.directive_bytes
    }

    /// Start of the last block opened by `#ORG`, 0 without one.
    pub fn origin(&self) -> u32 {
        self.stats.origin
    }
}

/// Assemble `source`; `#include` paths are relative to `base`.
pub fn build(source: &str, base: &Path) -> Assembly {
    Assembler::new().build(source, "<input>", base, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asm(src: &str) -> Assembly {
        build(src, Path::new("."))
    }

    #[test]
    fn test_label_on_org_line() {
        let a = asm(".start #ORG 0x100\nNOP");
        assert_eq!(a.labels().get(".START"), Some(0x100));
        assert_eq!(a.lines()[1].address, 0x100);
    }

    #[test]
    fn test_implicit_block() {
        let a = asm("NOP\n#ORG 0x10\nNOP");
        assert_eq!(a.block_count(), 2);
        assert_eq!(a.block_bytes(0), Some(&[0x00][..]));
        assert_eq!(a.blocks().get(1).map(|b| b.start), Some(0x10));
    }

    #[test]
    fn test_directive_bytes() {
        let a = asm("#DB 1, 2\n#DB [3] 0\nNOP");
        assert_eq!(a.directive_bytes(), 5);
        assert_eq!(a.bytes(), vec![1, 2, 0, 0, 0, 0]);
    }

    #[test]
    fn test_unknown_directive() {
        let a = asm("#FOO 1");
        assert!(a.has_errors());
        assert!(a.lines()[0].error.is_some());
    }

    #[test]
    fn test_bad_operand_is_line_local() {
        let a = asm("LD A, %\nNOP");
        assert!(a.has_errors());
        assert!(a.lines()[0].error.is_some());
        assert!(a.lines()[0].bytes.is_empty());
        assert_eq!(a.bytes(), vec![0x00]);
    }

    #[test]
    fn test_unknown_form() {
        let a = asm("MUL A, 5");
        assert!(a.has_errors());
        assert_eq!(a.lines()[0].form.as_deref(), Some("MUL r,nnn"));
    }

    #[test]
    fn test_address_overflow() {
        let a = asm("#ORG 0xFFFFFE\nLD A, 1");
        assert!(a.has_errors());
        assert!(asm("#ORG 0x1000000").has_errors());
    }

    #[test]
    fn test_every_line_past_the_end_is_flagged() {
        let a = asm("#ORG 0xFFFFFE\nLD A, 1\nNOP\n.late");
        assert_eq!(a.diagnostics().count(crate::msg::Severity::Error), 3);
        assert!(a.lines()[1..].iter().all(|l| l.error.is_some()));
    }

    #[test]
    fn test_label_after_failed_prescan() {
        let a = asm(".bad-name NOP\nJP .L\n.L RET");
        assert!(a.has_errors());
        assert_eq!(a.diagnostics().count(crate::msg::Severity::Info), 1);
        let note = a
            .diagnostics()
            .iter()
            .find(|m| m.severity == crate::msg::Severity::Info)
            .unwrap();
        assert!(note.text.contains(".L"));
        assert_eq!(note.at.as_ref().map(|l| l.number), Some(3));
    }

    #[test]
    fn test_origin() {
        assert_eq!(asm("NOP").origin(), 0);
        assert_eq!(asm("#ORG 0x10\nNOP\n#ORG 0x80\nNOP").origin(), 0x80);
    }

    #[test]
    fn test_run() {
        let a = asm("#ORG 0x40\n#RUN .main\nNOP\n.main RET");
        assert_eq!(a.entry(), 0x41);
        assert!(!a.entry_from_org());

        let a = asm("#RUN 0x1234\nNOP");
        assert_eq!(a.entry(), 0x1234);

        let mut a = asm("#RUN .nope\nNOP");
        assert!(a.has_errors());
        assert!(a.lines()[0].error.is_some());
        let failures = a.resolve();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 0);
        assert!(matches!(failures[0].1, Error::UndefinedLabel(_)));
    }

    #[test]
    fn test_entry_defaults() {
        let a = asm("#ORG 0x200\nNOP\n#ORG 0x100\nNOP");
        assert_eq!(a.entry(), 0x200);
        assert!(a.entry_from_org());

        let a = asm("NOP");
        assert_eq!(a.entry(), 0);
        assert!(!a.entry_from_org());
    }

    #[test]
    fn test_multiple_labels_reported_once() {
        let a = asm(".a .b NOP");
        assert_eq!(a.diagnostics().count(crate::msg::Severity::Error), 1);
    }
}
