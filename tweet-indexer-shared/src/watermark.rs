//! Fetch boundary shared by the checkpoint resolver and the fetcher.

use std::fmt;

/// The newest record identifier already durably stored.
///
/// `None` means nothing has been stored yet and the fetcher should go as far
/// back as the remote allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Watermark {
    /// Nothing stored yet.
    #[default]
    None,
    /// Identifier of the newest stored record.
    Id(u64),
}

impl Watermark {
    /// Identifier to send as the remote's "newer than" bound, if any.
    pub fn since_id(&self) -> Option<u64> {
        match self {
            Watermark::None => None,
            Watermark::Id(id) => Some(*id),
        }
    }

    /// Whether a record with `id` lies strictly after this watermark.
    pub fn admits(&self, id: u64) -> bool {
        match self {
            Watermark::None => true,
            Watermark::Id(watermark) => id > *watermark,
        }
    }

    /// Parse a stored identifier. Blank input yields `Watermark::None`.
    pub fn parse(value: &str) -> Result<Self, std::num::ParseIntError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Watermark::None);
        }
        trimmed.parse::<u64>().map(Watermark::Id)
    }
}

impl From<Option<u64>> for Watermark {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Watermark::None, Watermark::Id)
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Watermark::None => write!(f, "none"),
            Watermark::Id(id) => write!(f, "{}", id),
        }
    }
}
