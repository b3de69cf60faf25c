//! The `OrderNumber` value type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::OrderNumberError;

/// Prefix of every order number.
pub const ORDER_NUMBER_PREFIX: &str = "PDJ";

/// Highest sequence that fits the three-digit suffix.
pub const MAX_DAILY_SEQUENCE: u32 = 999;

/// A `PDJ-YYYYMMDD-NNN` order number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber {
    date: NaiveDate,
    sequence: u32,
}

impl OrderNumber {
    /// Builds an order number for the `sequence`-th order of `date`.
    ///
    /// # Errors
    ///
    /// Returns `OrderNumberError::SequenceOutOfRange` unless `1 <= sequence <= 999`.
    pub fn new(date: NaiveDate, sequence: u32) -> Result<Self, OrderNumberError> {
        if sequence == 0 || sequence > MAX_DAILY_SEQUENCE {
            return Err(OrderNumberError::SequenceOutOfRange(sequence));
        }
        Ok(Self { date, sequence })
    }

    /// Local calendar day the order was placed on.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// 1-based position within the day.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{ORDER_NUMBER_PREFIX}-{}-{:03}",
            self.date.format("%Y%m%d"),
            self.sequence
        )
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OrderNumberError::InvalidFormat(s.to_string());

        let rest = s
            .strip_prefix(ORDER_NUMBER_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(invalid)?;
        let (date, sequence) = rest.split_once('-').ok_or_else(invalid)?;

        let all_digits = |part: &str, len: usize| {
            part.len() == len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !all_digits(date, 8) || !all_digits(sequence, 3) {
            return Err(invalid());
        }

        let date = NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| invalid())?;
        let sequence: u32 = sequence.parse().map_err(|_| invalid())?;
        Self::new(date, sequence).map_err(|_| invalid())
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderNumber> for String {
    fn from(value: OrderNumber) -> Self {
        value.to_string()
    }
}
