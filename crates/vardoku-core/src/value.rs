//! Cell values and value domains.

use std::fmt::{self, Display};

use crate::CandidateSet;

/// A cell value.
///
/// Values are small unsigned integers in the range 0-31 so that a
/// [`CandidateSet`] can hold any subset of them in a single `u32`. Arithmetic
/// constraints (sums, differences, ratios) operate on the numeric value
/// directly; a [`ValueDomain`] decides how a value is displayed.
///
/// # Examples
///
/// ```
/// use vardoku_core::Value;
///
/// let v = Value::new(7);
/// assert_eq!(v.get(), 7);
/// assert_eq!(v.to_string(), "7");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Value(u8);

impl Value {
    /// The largest representable value.
    pub const MAX: Self = Self(31);

    /// Creates a value.
    ///
    /// # Panics
    ///
    /// Panics if `value` is greater than 31.
    #[must_use]
    #[inline]
    pub const fn new(value: u8) -> Self {
        assert!(value <= 31, "value must be between 0 and 31");
        Self(value)
    }

    /// Creates a value, returning `None` if it is greater than 31.
    #[must_use]
    pub const fn try_new(value: u8) -> Option<Self> {
        if value <= 31 { Some(Self(value)) } else { None }
    }

    /// Returns the numeric value.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<Value> for u8 {
    fn from(value: Value) -> u8 {
        value.get()
    }
}

/// Errors produced when building a [`ValueDomain`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DomainError {
    /// The domain has no value.
    #[display("value domain must not be empty")]
    Empty,
    /// A value does not fit in a [`CandidateSet`].
    #[display("value {value} is larger than {}", Value::MAX)]
    TooLarge {
        /// Offending value.
        value: u32,
    },
    /// Two values share a display symbol.
    #[display("duplicate symbol {symbol:?}")]
    DuplicateSymbol {
        /// Offending symbol.
        symbol: String,
    },
    /// A symbol collides with an empty-cell placeholder.
    #[display("symbol {symbol:?} is reserved for empty cells")]
    ReservedSymbol {
        /// Offending symbol.
        symbol: String,
    },
}

/// Errors produced when parsing a value token.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown value token {token:?}")]
pub struct ValueParseError {
    /// Offending token.
    pub token: String,
}

/// The ordered set of legal values of a puzzle, with their display symbols.
///
/// # Examples
///
/// ```
/// use vardoku_core::{Value, ValueDomain};
///
/// let digits = ValueDomain::digits(1..=9)?;
/// assert_eq!(digits.len(), 9);
/// assert_eq!(digits.parse_token("5"), Ok(Some(Value::new(5))));
/// assert_eq!(digits.parse_token("."), Ok(None));
///
/// let letters = ValueDomain::from_symbols("ABCD".chars())?;
/// assert_eq!(letters.parse_token("C"), Ok(Some(Value::new(3))));
/// assert_eq!(letters.symbol(Value::new(1)), Some("A"));
/// # Ok::<(), vardoku_core::DomainError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueDomain {
    values: CandidateSet,
    // Indexed by `Value::get()`; `None` for values outside the domain.
    symbols: Vec<Option<String>>,
}

impl ValueDomain {
    /// Tokens treated as an empty cell when they are not a domain symbol.
    pub const EMPTY_TOKENS: [&'static str; 4] = [".", "_", "-", "0"];

    /// Placeholders that can never be a domain symbol. `"0"` is left out so
    /// hexadecimal symbol sets stay usable.
    const RESERVED_TOKENS: [&'static str; 3] = [".", "_", "-"];

    /// Creates a numeric domain, displaying each value as its decimal number.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Empty`] for an empty range and
    /// [`DomainError::TooLarge`] if the range exceeds [`Value::MAX`].
    pub fn digits(range: std::ops::RangeInclusive<u32>) -> Result<Self, DomainError> {
        let (start, end) = range.into_inner();
        if start > end {
            return Err(DomainError::Empty);
        }
        if end > u32::from(Value::MAX.get()) {
            return Err(DomainError::TooLarge { value: end });
        }
        let mut symbols = vec![None; 32];
        let mut values = CandidateSet::new();
        for n in start..=end {
            #[expect(clippy::cast_possible_truncation)]
            let value = Value::new(n as u8);
            values.insert(value);
            symbols[usize::from(value.get())] = Some(n.to_string());
        }
        Ok(Self { values, symbols })
    }

    /// Creates a domain of values `1..=n` displayed by the given symbols.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no symbol, more than 31 symbols, duplicate
    /// symbols, or a symbol that is one of `.`, `_` and `-`.
    pub fn from_symbols<I, S>(symbols: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let mut table = vec![None; 32];
        let mut values = CandidateSet::new();
        for (i, symbol) in symbols.into_iter().enumerate() {
            let symbol = symbol.to_string();
            let n = i + 1;
            let value = u8::try_from(n)
                .ok()
                .and_then(Value::try_new)
                .ok_or(DomainError::TooLarge {
                    value: u32::try_from(n).unwrap_or(u32::MAX),
                })?;
            if Self::RESERVED_TOKENS.contains(&symbol.as_str()) {
                return Err(DomainError::ReservedSymbol { symbol });
            }
            if table.iter().flatten().any(|s| *s == symbol) {
                return Err(DomainError::DuplicateSymbol { symbol });
            }
            table[usize::from(value.get())] = Some(symbol);
            values.insert(value);
        }
        if values.is_empty() {
            return Err(DomainError::Empty);
        }
        Ok(Self {
            values,
            symbols: table,
        })
    }

    /// Returns every legal value.
    #[must_use]
    #[inline]
    pub fn all(&self) -> CandidateSet {
        self.values
    }

    /// Number of legal values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: domains are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if `value` is legal.
    #[must_use]
    pub fn contains(&self, value: Value) -> bool {
        self.values.contains(value)
    }

    /// Returns the display symbol of `value`.
    #[must_use]
    pub fn symbol(&self, value: Value) -> Option<&str> {
        self.symbols[usize::from(value.get())].as_deref()
    }

    /// Returns the widest symbol length, used to decide whether rendered rows
    /// need separators.
    #[must_use]
    pub fn symbol_width(&self) -> usize {
        self.symbols
            .iter()
            .flatten()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(1)
    }

    /// Parses a single token.
    ///
    /// Returns `Ok(None)` for an empty-cell placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`ValueParseError`] for an unknown token.
    pub fn parse_token(&self, token: &str) -> Result<Option<Value>, ValueParseError> {
        let found = self
            .values
            .iter()
            .find(|value| self.symbol(*value) == Some(token));
        if let Some(value) = found {
            return Ok(Some(value));
        }
        if Self::EMPTY_TOKENS.contains(&token) {
            return Ok(None);
        }
        Err(ValueParseError {
            token: token.to_owned(),
        })
    }

    /// Renders a set of candidates using the domain symbols.
    #[must_use]
    pub fn render(&self, candidates: CandidateSet) -> String {
        candidates
            .iter()
            .filter_map(|value| self.symbol(value))
            .collect::<Vec<_>>()
            .join(if self.symbol_width() > 1 { "," } else { "" })
    }
}
