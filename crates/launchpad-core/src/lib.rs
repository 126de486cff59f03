//! # launchpad-core
//!
//! Domain value types shared by the Launchpad backend crates: launcher users
//! resolved from the identity directory and the seats of the launcher kiosk.

pub mod error;
pub mod seat;
pub mod user;

pub use error::{CoreError, Result};
pub use seat::{Seat, SeatId, SeatStatus};
pub use user::{MemberId, MemberName, MemberStatus, UserInfo};
