//! Room entity.

use std::sync::Arc;

use crate::booking::{Booking, Iban, RoomType, Stay, TaxNumber};
use crate::hotel::Hotel;

/// A room in a hotel, owning the bookings made against it.
///
/// Overlap between bookings is enforced outside this crate.
#[derive(Debug)]
pub struct Room {
    number: String,
    room_type: RoomType,
    bookings: Vec<Arc<Booking>>,
}

impl Room {
    /// Creates a new room.
    pub fn new(number: impl Into<String>, room_type: RoomType) -> Self {
        Self {
            number: number.into(),
            room_type,
            bookings: Vec::new(),
        }
    }

    /// Returns the room number.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Returns the room type.
    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    /// Creates a booking for this room, priced from the hotel's nightly
    /// rate for the room type times the number of nights.
    pub fn book(
        &mut self,
        hotel: &Hotel,
        stay: Stay,
        buyer_nif: TaxNumber,
        buyer_iban: Iban,
    ) -> Arc<Booking> {
        let price = hotel.rate_for(self.room_type).multiply(stay.nights());
        let booking = Arc::new(Booking::new(
            self.number.clone(),
            stay,
            buyer_nif,
            buyer_iban,
            price,
        ));
        self.bookings.push(Arc::clone(&booking));
        booking
    }

    /// Returns the bookings made against this room.
    pub fn bookings(&self) -> &[Arc<Booking>] {
        &self.bookings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::Money;
    use chrono::NaiveDate;

    fn hotel() -> Hotel {
        Hotel::new(
            "XPTO123",
            "Lisboa",
            TaxNumber::new("123456700"),
            Iban::new("IBAN_HOTEL"),
            Money::from_euros(20),
            Money::from_euros(30),
        )
    }

    fn stay() -> Stay {
        Stay::new(
            NaiveDate::from_ymd_opt(2026, 12, 19).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_book_prices_by_rate_and_nights() {
        let hotel = hotel();
        let mut room = Room::new("01", RoomType::Single);

        let booking = room.book(
            &hotel,
            stay(),
            TaxNumber::new("123456789"),
            Iban::new("IBAN_BUYER"),
        );

        // 5 nights at €20
        assert_eq!(booking.price(), Money::from_euros(100));
        assert_eq!(booking.room_number(), "01");
        assert_eq!(room.bookings().len(), 1);
    }

    #[test]
    fn test_double_room_uses_double_rate() {
        let hotel = hotel();
        let mut room = Room::new("02", RoomType::Double);

        let booking = room.book(
            &hotel,
            stay(),
            TaxNumber::new("123456789"),
            Iban::new("IBAN_BUYER"),
        );

        assert_eq!(booking.price(), Money::from_euros(150));
    }
}
