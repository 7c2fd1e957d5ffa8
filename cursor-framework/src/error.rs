use thiserror::Error;

use crate::options::Encoding;

/// Fatal errors raised while building a cursor or compiling a pattern.
///
/// A failed match or an exhausted input is not an error; those are reported
/// through `Option` results.
#[derive(Error, Debug)]
pub enum CursorError {
    /// The pattern engine rejected the expression.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    /// A modifier flag that the pattern engine does not understand.
    #[error("unknown pattern modifier '{0}'")]
    UnknownModifier(char),

    /// The declared encoding label is not one the cursor can index.
    #[error("unsupported encoding `{0}`")]
    UnsupportedEncoding(String),

    /// The input bytes are not valid in the declared encoding.
    #[error("input is not valid {encoding} (valid up to byte {valid_up_to})")]
    InvalidEncoding {
        encoding: Encoding,
        valid_up_to: usize,
    },
}

/// Why a pattern failed to compile.
#[derive(Error, Debug)]
pub enum PatternError {
    /// The expression could not be parsed.
    #[error(transparent)]
    Syntax(#[from] regex_syntax::Error),

    /// The parsed expression could not be built, e.g. it exceeds the size
    /// limit.
    #[error(transparent)]
    Build(#[from] regex::Error),
}

pub type CursorResult<T> = Result<T, CursorError>;
