use serde::{Deserialize, Serialize};

/// Nudge shown as the next donation date approaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reminder {
    DayBefore,
    TwoDays,
    ThreeDays,
}

impl Reminder {
    /// Classify the whole days left. Tiers are checked tightest first, each
    /// bound inclusive; anything outside 0..=3 gets no reminder.
    pub fn for_days_until(days_until_next: Option<i64>) -> Option<Self> {
        let days = days_until_next?;
        if !(0..=3).contains(&days) {
            return None;
        }
        if days <= 1 {
            Some(Self::DayBefore)
        } else if days <= 2 {
            Some(Self::TwoDays)
        } else {
            Some(Self::ThreeDays)
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::DayBefore => "Donation day is tomorrow! Prepare to be a hero.",
            Self::TwoDays => "Only 2 days to go! Hydrate well.",
            Self::ThreeDays => "Just 3 days left until you can donate again.",
        }
    }
}
