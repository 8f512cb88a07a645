mod applicant;
mod mentor;
mod policy;
mod reservation;
mod service;
mod slot;
mod store;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde_with::DeserializeFromStr;
use serde_with::SerializeDisplay;

pub use self::applicant::*;
pub use self::mentor::*;
pub use self::policy::*;
pub use self::reservation::*;
pub use self::service::*;
pub use self::slot::*;
pub use self::store::*;

/// A bookable time of day, serialized as `HH:MM` on the wire. Serde goes
/// through `Display` and `FromStr` below, so the tolerant `NaiveTime` formats
/// never leak onto the wire.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct SlotTime(NaiveTime);

impl SlotTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(SlotTime)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for SlotTime {
    fn from(value: NaiveTime) -> Self {
        Self(value)
    }
}

impl FromStr for SlotTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s, "%H:%M").map(SlotTime)
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}
