//! Garment sizes.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Size`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid size: {0} (expected one of PP, P, M, G, GG, XG, U)")]
pub struct SizeError(pub String);

/// Garment size, using the Brazilian lettering.
///
/// `U` is the single size used for accessories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Size {
    PP,
    P,
    M,
    G,
    GG,
    XG,
    U,
}

impl Size {
    /// All sizes in display order.
    pub const ALL: [Self; 7] = [
        Self::PP,
        Self::P,
        Self::M,
        Self::G,
        Self::GG,
        Self::XG,
        Self::U,
    ];

    /// The size label as shown on the tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PP => "PP",
            Self::P => "P",
            Self::M => "M",
            Self::G => "G",
            Self::GG => "GG",
            Self::XG => "XG",
            Self::U => "U",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = SizeError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == wanted)
            .ok_or_else(|| SizeError(s.to_string()))
    }
}
