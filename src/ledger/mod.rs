//! Reservation ledger: pre-commits estimated billing costs against account
//! balances so concurrent jobs can never overdraw an account.

mod guard;
mod ledger;
mod reservation;

pub use guard::ReservationGuard;
pub use ledger::{AccountSnapshot, ReservationLedger};
pub use reservation::{Reservation, ReservationStatus, ReserveOutcome, UsageRecord};
