//! Hotel entity.

use crate::booking::{Iban, Money, RoomType, TaxNumber};

/// A hotel with its billing identity and nightly rates per room type.
///
/// A hotel and its booking processor are created as a pair; the processor
/// copies the hotel's billing identity (IBAN and tax number) at
/// construction and issues charges and invoices on its behalf.
#[derive(Debug, Clone)]
pub struct Hotel {
    code: String,
    name: String,
    nif: TaxNumber,
    iban: Iban,
    single_rate: Money,
    double_rate: Money,
}

impl Hotel {
    /// Creates a new hotel.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        nif: TaxNumber,
        iban: Iban,
        single_rate: Money,
        double_rate: Money,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            nif,
            iban,
            single_rate,
            double_rate,
        }
    }

    /// Returns the hotel code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the hotel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the hotel's tax number.
    pub fn nif(&self) -> &TaxNumber {
        &self.nif
    }

    /// Returns the hotel's bank account.
    pub fn iban(&self) -> &Iban {
        &self.iban
    }

    /// Returns the nightly rate for the given room type.
    pub fn rate_for(&self, room_type: RoomType) -> Money {
        match room_type {
            RoomType::Single => self.single_rate,
            RoomType::Double => self.double_rate,
        }
    }
}
