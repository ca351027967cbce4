//! # Coins Module
//!
//! The fixed coin denominations the machine accepts, and change-making
//! over them.
//!
//! ## Why Integer Cents?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  All monetary values in Vendo are integer cents.                       │
//! │                                                                         │
//! │  Deposits are built exclusively from the accepted coins                │
//! │  {5, 10, 20, 50, 100}, so every balance in the system is a             │
//! │  non-negative multiple of 5. The Balance type makes that invariant     │
//! │  a constructor precondition instead of a runtime surprise.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vendo_core::coins::{change_for, Balance, Coin};
//!
//! let balance = Balance::new(275).unwrap();
//! assert_eq!(
//!     change_for(balance),
//!     vec![Coin::Hundred, Coin::Hundred, Coin::Fifty, Coin::Twenty, Coin::Five],
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Coin
// =============================================================================

/// One accepted coin denomination.
///
/// Serializes as its face value in cents, so a change sequence renders as
/// `[100, 100, 50, 20, 5]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Coin {
    Five,
    Ten,
    Twenty,
    Fifty,
    Hundred,
}

impl Coin {
    /// All denominations, largest first. The order matters: greedy
    /// change-making walks this array.
    pub const DESCENDING: [Coin; 5] = [
        Coin::Hundred,
        Coin::Fifty,
        Coin::Twenty,
        Coin::Ten,
        Coin::Five,
    ];

    /// Face value in cents.
    #[inline]
    pub const fn cents(self) -> i64 {
        match self {
            Coin::Five => 5,
            Coin::Ten => 10,
            Coin::Twenty => 20,
            Coin::Fifty => 50,
            Coin::Hundred => 100,
        }
    }

    /// Looks up the denomination with the given face value.
    ///
    /// Returns `None` for anything the machine does not accept - this is
    /// the single place deposit amounts are checked against the coin set.
    pub fn from_cents(cents: i64) -> Option<Coin> {
        match cents {
            5 => Some(Coin::Five),
            10 => Some(Coin::Ten),
            20 => Some(Coin::Twenty),
            50 => Some(Coin::Fifty),
            100 => Some(Coin::Hundred),
            _ => None,
        }
    }
}

impl From<Coin> for i64 {
    fn from(coin: Coin) -> i64 {
        coin.cents()
    }
}

impl TryFrom<i64> for Coin {
    type Error = InvalidBalance;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Coin::from_cents(cents).ok_or(InvalidBalance(cents))
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}c", self.cents())
    }
}

// =============================================================================
// Balance
// =============================================================================

/// Error returned when an amount is not representable as a sum of the
/// accepted coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("balance {0} is not representable with the accepted coins")]
pub struct InvalidBalance(pub i64);

/// A deposit balance known to be expressible as a sum of accepted coins.
///
/// A balance is valid exactly when it is a non-negative multiple of 5,
/// which is the closure of sums over {5, 10, 20, 50, 100}. Constructing a
/// `Balance` is the proof the change calculator relies on: change-making
/// over a valid balance always terminates with an exact sequence, so the
/// calculator has no error path at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Balance(i64);

impl Balance {
    /// Wraps a cent amount, refusing anything that could not have been
    /// built from accepted coins.
    ///
    /// A rejected amount at this boundary means the deposit invariant was
    /// already broken somewhere upstream, not that the caller made a
    /// recoverable input mistake.
    pub fn new(cents: i64) -> Result<Balance, InvalidBalance> {
        if cents < 0 || cents % Coin::Five.cents() != 0 {
            return Err(InvalidBalance(cents));
        }

        Ok(Balance(cents))
    }

    /// Zero balance.
    #[inline]
    pub const fn zero() -> Balance {
        Balance(0)
    }

    /// The balance in cents.
    #[inline]
    pub const fn cents(self) -> i64 {
        self.0
    }
}

// =============================================================================
// Change Calculation
// =============================================================================

/// Computes the change sequence for a balance, largest coins first.
///
/// Greedy is optimal for this denomination set (each coin value is
/// "compatible" with the next smaller one), so the result is always the
/// fewest coins that sum exactly to the balance. Deterministic: the same
/// balance always yields the same sequence.
///
/// ## Example
/// ```rust
/// use vendo_core::coins::{change_for, Balance, Coin};
///
/// let change = change_for(Balance::new(65).unwrap());
/// assert_eq!(change, vec![Coin::Fifty, Coin::Ten, Coin::Five]);
/// ```
pub fn change_for(balance: Balance) -> Vec<Coin> {
    let mut remaining = balance.cents();
    let mut change = Vec::new();

    for coin in Coin::DESCENDING {
        while remaining >= coin.cents() {
            change.push(coin);
            remaining -= coin.cents();
        }
    }

    // remaining is 0 here: Balance is a multiple of 5 and the smallest
    // coin is 5, so the loop above always drains it exactly.
    change
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_values() {
        assert_eq!(Coin::Five.cents(), 5);
        assert_eq!(Coin::Hundred.cents(), 100);
        assert_eq!(Coin::from_cents(20), Some(Coin::Twenty));
        assert_eq!(Coin::from_cents(25), None);
        assert_eq!(Coin::from_cents(0), None);
        assert_eq!(Coin::from_cents(-5), None);
    }

    #[test]
    fn coin_serializes_as_face_value() {
        let json = serde_json::to_string(&vec![Coin::Hundred, Coin::Five]).unwrap();
        assert_eq!(json, "[100,5]");

        let coins: Vec<Coin> = serde_json::from_str("[50,10]").unwrap();
        assert_eq!(coins, vec![Coin::Fifty, Coin::Ten]);
        assert!(serde_json::from_str::<Coin>("30").is_err());
    }

    #[test]
    fn balance_rejects_unrepresentable_amounts() {
        assert!(Balance::new(0).is_ok());
        assert!(Balance::new(475).is_ok());
        assert_eq!(Balance::new(-5), Err(InvalidBalance(-5)));
        assert_eq!(Balance::new(3), Err(InvalidBalance(3)));
        assert_eq!(Balance::new(101), Err(InvalidBalance(101)));
    }

    #[test]
    fn change_for_zero_is_empty() {
        assert!(change_for(Balance::zero()).is_empty());
    }

    #[test]
    fn change_uses_largest_coins_first() {
        let change = change_for(Balance::new(275).unwrap());
        assert_eq!(
            change,
            vec![
                Coin::Hundred,
                Coin::Hundred,
                Coin::Fifty,
                Coin::Twenty,
                Coin::Five
            ]
        );
    }

    #[test]
    fn change_sums_to_balance_and_is_minimal() {
        // Exhaustive over every valid balance up to 1000: the sequence must
        // sum exactly, and greedy over this coin set is minimal.
        for cents in (0..=1000).step_by(5) {
            let balance = Balance::new(cents).unwrap();
            let change = change_for(balance);

            let total: i64 = change.iter().map(|c| c.cents()).sum();
            assert_eq!(total, cents, "change for {cents} does not sum");

            // Re-running yields the identical sequence.
            assert_eq!(change, change_for(balance));
        }
    }

    #[test]
    fn change_minimality_spot_checks() {
        // 5 coins is the known minimum for 275; 40 needs two coins (20+20),
        // never four tens.
        assert_eq!(change_for(Balance::new(275).unwrap()).len(), 5);
        assert_eq!(
            change_for(Balance::new(40).unwrap()),
            vec![Coin::Twenty, Coin::Twenty]
        );
        assert_eq!(
            change_for(Balance::new(80).unwrap()),
            vec![Coin::Fifty, Coin::Twenty, Coin::Ten]
        );
    }
}
