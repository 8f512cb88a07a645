use chrono::{DateTime, NaiveDate, Utc};
use derive_more::{Display, Error};

use super::BookingWindow;

/// The invariants shared by the client fast-path and the remote write guard.
/// Both sides run exactly these checks; only the data they read differs.
#[derive(Copy, Clone, Debug)]
pub struct BookingPolicy {
    max_per_mentor: usize,
    deadline: DateTime<Utc>,
    window: BookingWindow,
}

impl BookingPolicy {
    pub fn new(max_per_mentor: usize, deadline: DateTime<Utc>, window: BookingWindow) -> Self {
        Self {
            max_per_mentor,
            deadline,
            window,
        }
    }

    pub fn max_per_mentor(&self) -> usize {
        self.max_per_mentor
    }

    pub fn window(&self) -> BookingWindow {
        self.window
    }

    /// No new reservation may be created once the cutoff instant has passed,
    /// and no reservation may target a date beyond it or outside the booking
    /// window.
    pub fn check_date(&self, now: DateTime<Utc>, date: NaiveDate) -> Result<(), PolicyViolation> {
        if now >= self.deadline || date > self.deadline.date_naive() {
            return Err(PolicyViolation::DeadlinePassed);
        }
        if !self.window.contains(date) {
            return Err(PolicyViolation::DeadlinePassed);
        }
        Ok(())
    }

    pub fn check_capacity(&self, reserved: usize) -> Result<(), PolicyViolation> {
        if reserved >= self.max_per_mentor {
            return Err(PolicyViolation::MentorFull);
        }
        Ok(())
    }
}

#[derive(Error, Display, Debug, PartialEq, Eq)]
pub enum PolicyViolation {
    #[display(fmt = "The reservation deadline has passed")]
    DeadlinePassed,
    #[display(fmt = "The mentor has no remaining capacity")]
    MentorFull,
}
