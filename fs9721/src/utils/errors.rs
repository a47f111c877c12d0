#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err);
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("Octet at position {position} carries index {actual}, expected {expected}")]
    IndexMismatch {
        position: usize,
        expected: u8,
        actual: u8,
    },

    #[error("Octet index {0} was already received for this packet")]
    DuplicateIndex(u8),

    #[error("Packet incomplete: {collected} of 14 octets received")]
    Incomplete { collected: usize },
}

impl AssembleError {
    /// True for failures caused by corrupt or misaligned octets.
    ///
    /// The packet must be discarded; waiting for more data will not help.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            AssembleError::IndexMismatch { .. } | AssembleError::DuplicateIndex(_)
        )
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, AssembleError::Incomplete { .. })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error("Bit reader failed on the data buffer: {0}")]
    Bitstream(#[from] std::io::Error),

    #[error("Decimal point bits {0:#06b} set on more than one digit")]
    AmbiguousDecimalPoint(u8),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadingError {
    #[error("\"{0}\" is not a numeric reading")]
    NonNumeric(String),
}
