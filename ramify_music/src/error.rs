// Error type shared by every stage of the composer.
//
// Construction-time validation (ramifications, scales, pitch indices, random
// ranges), motive generation preconditions, and file output all report
// through `MusicError`. Weight slices that match nothing are not errors; they
// surface later as an `InvalidArgument` from the motive generator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MusicError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("pitch {0} is outside the MIDI key range 0..=127")]
    PitchOutOfRange(i64),

    #[error("{0} distinct melodic instruments exceed the 15 available MIDI channels")]
    TooManyChannels(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl MusicError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        MusicError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MusicError>;
