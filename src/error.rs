//! Error type shared by the scoring kernel and the file layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZHuntError {
    /// A character outside `a,t,g,c` reached dinucleotide classification.
    #[error("invalid base {base:?} at position {position}")]
    InvalidBase { position: usize, base: char },

    /// A conformation state outside AS/SA reached the energy lookup.
    #[error("invalid anti/syn state {found:?} at dinucleotide {position}")]
    InvalidConformation { position: usize, found: String },

    #[error("length mismatch: need {expected} entries, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, ZHuntError>;

impl ZHuntError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn check_len(expected: usize, found: usize) -> Result<()> {
        if found < expected {
            Err(Self::LengthMismatch { expected, found })
        } else {
            Ok(())
        }
    }
}
