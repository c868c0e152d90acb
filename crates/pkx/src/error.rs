use miette::Diagnostic;
use thiserror::Error;

use crate::FormatVariant;

#[derive(Error, Diagnostic, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("model file reading error")]
    #[diagnostic(code(pkx::io_error))]
    Io(#[from] std::io::Error),

    #[error("model file truncated: cannot read offset {offset:#x} (stream length {len:#x})")]
    #[diagnostic(code(pkx::truncated))]
    Truncated { offset: u64, len: u64 },

    #[error("{} model files carry no color", .variant.name())]
    #[diagnostic(code(pkx::unsupported_format))]
    UnsupportedFormat { variant: FormatVariant },
}
