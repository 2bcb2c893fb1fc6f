use color_print::cprintln;

use crate::source::SourceLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Msg {
    pub severity: Severity,
    pub text: String,
    pub at: Option<SourceLine>,
}

impl Msg {
    pub fn print(&self) {
        match self.severity {
            Severity::Error => cprintln!("<red,bold>error</>: {}", self.text),
            Severity::Warning => cprintln!("<yellow,bold>warn</>: {}", self.text),
            Severity::Info => cprintln!("<green,bold>note</>: {}", self.text),
        }
        if let Some(line) = &self.at {
            cprintln!("     <blue>--></> <underline>{}:{}</>", line.file, line.number);
            cprintln!("      <blue>|</>");
            cprintln!(" <blue>{:>4} |</> {}", line.number, line.text);
            cprintln!("      <blue>|</>");
        }
    }
}

/// Diagnostics collected during one build.
#[derive(Debug, Clone, Default)]
pub struct Msgs(Vec<Msg>);

impl Msgs {
    pub fn new() -> Self {
        Msgs(Vec::new())
    }

    pub fn push(&mut self, severity: Severity, text: impl ToString, at: Option<&SourceLine>) {
        self.0.push(Msg {
            severity,
            text: text.to_string(),
            at: at.cloned(),
        });
    }

    pub fn info(&mut self, text: impl ToString, at: Option<&SourceLine>) {
        self.push(Severity::Info, text, at);
    }

    pub fn warn(&mut self, text: impl ToString, at: Option<&SourceLine>) {
        self.push(Severity::Warning, text, at);
    }

    pub fn error(&mut self, text: impl ToString, at: Option<&SourceLine>) {
        self.push(Severity::Error, text, at);
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(|msg| msg.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.0.iter().filter(|msg| msg.severity == severity).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Msg> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn dump(&self) {
        for msg in &self.0 {
            msg.print();
        }
    }
}
