use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown operation: `{0}`")]
    UnknownOperation(String),

    #[error("Unknown register: `{0}`")]
    UnknownRegister(String),

    #[error("Unknown float register: `{0}`")]
    UnknownFloatRegister(String),

    #[error("Unknown flag: `{0}`")]
    UnknownFlag(String),

    #[error("Unknown special register: `{0}`")]
    UnknownSpecial(String),

    #[error("Template `{0}` has {1} bits, not a multiple of 8")]
    UnalignedTemplate(String, usize),

    #[error("Template `{0}` splits field `{1}` into several runs")]
    SplitField(String, char),

    #[error("Template `{0}` has unexpected character `{1}`")]
    TemplateChar(String, char),

    #[error("Template `{0}` field `{1}` is {2} bits wide")]
    FieldTooWide(String, char, usize),

    #[error("Suboperand code 0x{1:02X} does not fit in template `{0}`")]
    SubTooWide(String, u8),

    #[error("Duplicate general form: `{0}`")]
    DuplicateForm(String),
}
