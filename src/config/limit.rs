use crate::StreamError;

/// Caps how many bytes a stream will produce or materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Restricts messages from exceeding a certain byte length.
    Bounded(u64),
    /// No limit. Use this if you don't care about the size of encoded or decoded messages.
    Infinite,
}

impl Limit {
    /// Returns the hard limit (if one exists)
    pub fn limit(&self) -> Option<u64> {
        match self {
            Limit::Bounded(n) => Some(*n),
            Limit::Infinite => None,
        }
    }

    /// Checks that `n` bytes fit within the limit.
    pub fn check(&self, n: u64) -> Result<(), StreamError> {
        match self {
            Limit::Bounded(max) if n > *max => {
                Err(StreamError::InvalidArgument("size limit reached"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for Limit {
    fn default() -> Self {
        Limit::Infinite
    }
}
