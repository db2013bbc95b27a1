//! Value objects for the booking domain.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::BookingError;

/// International bank account number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iban(String);

impl Iban {
    /// Creates a new IBAN from a string.
    pub fn new(iban: impl Into<String>) -> Self {
        Self(iban.into())
    }

    /// Returns the IBAN as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Iban {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Iban {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Iban {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Tax identification number (NIF).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxNumber(String);

impl TaxNumber {
    /// Creates a new tax number from a string.
    pub fn new(nif: impl Into<String>) -> Self {
        Self(nif.into())
    }

    /// Returns the tax number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaxNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaxNumber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TaxNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = €10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a whole euro value.
    pub fn from_euros(euros: i64) -> Self {
        Self {
            cents: euros * 100,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-€{}.{:02}", (self.cents / 100).abs(), self.cents.abs() % 100)
        } else {
            write!(f, "€{}.{:02}", self.cents / 100, self.cents % 100)
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

/// A hotel stay: arrival and departure dates.
///
/// Invariant: arrival is strictly before departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stay {
    arrival: NaiveDate,
    departure: NaiveDate,
}

impl Stay {
    /// Creates a new stay, validating that arrival precedes departure.
    pub fn new(arrival: NaiveDate, departure: NaiveDate) -> Result<Self, BookingError> {
        if arrival >= departure {
            return Err(BookingError::InvalidStay { arrival, departure });
        }
        Ok(Self { arrival, departure })
    }

    /// Returns the arrival date.
    pub fn arrival(&self) -> NaiveDate {
        self.arrival
    }

    /// Returns the departure date.
    pub fn departure(&self) -> NaiveDate {
        self.departure
    }

    /// Returns the number of nights in the stay.
    pub fn nights(&self) -> u32 {
        (self.departure - self.arrival).num_days() as u32
    }
}

impl std::fmt::Display for Stay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.arrival, self.departure)
    }
}

/// The type of a hotel room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    /// Single room.
    Single,

    /// Double room.
    Double,
}

impl RoomType {
    /// Returns the room type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "Single",
            RoomType::Double => "Double",
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
