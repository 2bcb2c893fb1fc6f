use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown operation: `{0}`")]
    UnknownOperation(String),

    #[error("Unknown directive: `{0}`")]
    UnknownDirective(String),

    #[error("Unknown instruction form: `{0}`")]
    UnknownForm(String),

    #[error("More argument required for `{0}`")]
    MissingArgument(String),

    #[error("Cannot parse `{0}` as an operand")]
    ParseArgument(String),

    #[error("Cannot parse `{0}` as a number")]
    ParseNumber(String),

    #[error("Number `{0}` does not fit in 32 bits")]
    NumberTooLarge(String),

    #[error("Invalid label: `{0}`")]
    InvalidLabel(String),

    #[error("Re-defined label: `{0}`")]
    RedefinedLabel(String),

    #[error("Several labels on one line: {0}")]
    MultipleLabels(String),

    #[error("Undefined label: `{0}`")]
    UndefinedLabel(String),

    #[error("Unterminated string: `{0}`")]
    UnterminatedString(String),

    #[error("Non-ASCII character in string: `{0}`")]
    NonAscii(String),

    #[error("Repeat count must be between 1 and 0xFFFFFF: `{0}`")]
    RepeatCount(String),

    #[error("Cannot encode `{0}` as data")]
    ParseData(String),

    #[error("Address 0x{0:X} is outside the 24-bit address space")]
    AddressOverflow(u64),

    #[error("Recursive include: `{0}`")]
    RecursiveInclude(String),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),

    #[error(transparent)]
    Arch(#[from] arch::Error),
}
