//! Delivery address and Brazilian postal code (CEP).

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Cep`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CepError {
    /// The input has no digits at all.
    #[error("CEP cannot be empty")]
    Empty,
    /// The input does not have exactly eight digits.
    #[error("CEP must have 8 digits (got {0})")]
    WrongLength(usize),
    /// The input contains something other than digits, `-`, `.` or spaces.
    #[error("CEP contains invalid character: {0:?}")]
    InvalidCharacter(char),
}

/// A validated eight-digit CEP.
///
/// ## Examples
///
/// ```
/// use vitrine_core::Cep;
///
/// let cep: Cep = "01310-100".parse().unwrap();
/// assert_eq!(cep.digits(), "01310100");
/// assert_eq!(cep.to_string(), "01310-100");
/// assert_eq!(cep.first_digit(), 0);
///
/// assert!("1234".parse::<Cep>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cep(String);

impl Cep {
    /// Number of digits in a CEP.
    pub const LENGTH: usize = 8;

    /// Parse a CEP, accepting the usual `00000-000` punctuation.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, has characters other than
    /// digits and separators, or does not have exactly eight digits.
    pub fn parse(s: &str) -> Result<Self, CepError> {
        let mut digits = String::with_capacity(Self::LENGTH);
        for ch in s.chars() {
            match ch {
                '0'..='9' => digits.push(ch),
                '-' | '.' | ' ' => {}
                other => return Err(CepError::InvalidCharacter(other)),
            }
        }

        match digits.len() {
            0 => Err(CepError::Empty),
            Self::LENGTH => Ok(Self(digits)),
            n => Err(CepError::WrongLength(n)),
        }
    }

    /// The eight digits, without punctuation.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0
    }

    /// The first digit, which identifies the postal region.
    #[must_use]
    pub fn first_digit(&self) -> u8 {
        self.0.bytes().next().map_or(0, |b| b - b'0')
    }
}

impl FromStr for Cep {
    type Err = CepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cep {
    type Error = CepError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cep> for String {
    fn from(cep: Cep) -> Self {
        cep.to_string()
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (region, suffix) = self.0.split_at(5);
        write!(f, "{region}-{suffix}")
    }
}

/// First digit found in a free-form postal code, if any.
///
/// Used for shipping quotes, which only need the region and must work on
/// whatever the customer typed.
#[must_use]
pub fn leading_digit(raw: &str) -> Option<u8> {
    raw.chars()
        .find(char::is_ascii_digit)
        .and_then(|c| c.to_digit(10))
        .and_then(|d| u8::try_from(d).ok())
}

/// Delivery address collected by the first checkout step.
///
/// Fields are free text as typed (or filled by a CEP lookup); only presence is
/// validated, see [`CheckoutAddress::missing_required`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutAddress {
    pub cep: String,
    pub street: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl CheckoutAddress {
    /// Names of the required fields (`cep`, `street`, `number`, `city`) that
    /// are empty or whitespace.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("cep", &self.cep),
            ("street", &self.street),
            ("number", &self.number),
            ("city", &self.city),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Whether every required field is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }
}
