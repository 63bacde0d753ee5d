#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("constant {0} out of range: -32768 to 32767 inclusive")]
    ConstantOutOfRange(i32),

    #[error("timer period too short (needs faster cycle time)")]
    PeriodTooShort,

    #[error("timer period too long (max 32767 times cycle time); use a slower cycle time")]
    PeriodTooLong,

    #[error("empty row; delete it or add instructions before compiling")]
    Placeholder,

    #[error("piecewise linear lookup table with zero elements")]
    EmptyPiecewiseLinearTable,

    #[error("x values in piecewise linear table must be strictly increasing")]
    NonIncreasingPiecewiseLinearX,

    #[error(
        "numerical problem with piecewise linear lookup table; make the table entries smaller, \
         or space the points together more closely"
    )]
    PiecewiseLinearOverflow,

    #[error("move instruction: '{0}' is not a valid destination")]
    InvalidMoveDestination(String),

    #[error("math instruction: '{0}' is not a valid destination")]
    InvalidMathDestination(String),

    #[error("multiple escapes (\\0-9) present in format string, not allowed")]
    MultiplePlaceholders,

    #[error("bad escape sequence following \\; for a literal backslash, use \\\\")]
    BadDigitEscape,

    #[error("bad escape: correct form is \\xAB")]
    BadHexEscape,

    #[error("bad escape '\\{0}'")]
    UnknownEscape(char),

    #[error("variable is interpolated into formatted string, but none is specified")]
    MissingInterpolationVariable,

    #[error(
        "no variable is interpolated into formatted string, but a variable name is specified"
    )]
    UnusedInterpolationVariable,

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
