//! Live countdown rendering.

use chrono::Local;
use donation_tracker_core::error::Result;
use donation_tracker_core::{Config, CycleSnapshot, Event, SharedTracker};
use tokio::sync::broadcast::error::RecvError;

use super::cycle::open_tracker;

pub fn run(config: &Config, once: bool) -> Result<()> {
    let tracker = SharedTracker::new(open_tracker(config)?);
    let show_reminders = config.display.show_reminders;

    if once {
        println!("{}", render(&tracker.tick(), show_reminders));
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let mut events = tracker.subscribe();
        let ticker = tracker.activate();
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(Event::StateSnapshot(snapshot)) => {
                        println!("{}", render(&snapshot, show_reminders));
                    }
                    Ok(Event::BecameEligible { .. }) => {
                        println!("You can donate again today. Thank you for saving lives!");
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "renderer fell behind");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut shutdown => break,
            }
        }

        ticker.stop().await;
    });
    Ok(())
}

/// One frame of the countdown.
pub fn render(snapshot: &CycleSnapshot, show_reminders: bool) -> String {
    let name = snapshot.user_name.as_deref().unwrap_or("Donor");
    let donations = snapshot.donation_count;

    let mut line = match (snapshot.next_donation_date, snapshot.time_remaining) {
        (Some(next), Some(remaining)) if !snapshot.is_eligible => format!(
            "{name}: next donation in {remaining} (on {}) | donations: {donations}",
            next.with_timezone(&Local).format("%Y-%m-%d")
        ),
        (Some(next), _) => format!(
            "{name}: eligible to donate since {} | donations: {donations}",
            next.with_timezone(&Local).format("%Y-%m-%d")
        ),
        (None, _) => format!("{name}: no donation recorded yet, you can donate today | donations: {donations}"),
    };

    if show_reminders {
        if let Some(reminder) = snapshot.reminder {
            line.push_str("\n  ");
            line.push_str(reminder.message());
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use donation_tracker_core::{Countdown, Reminder};

    fn snapshot() -> CycleSnapshot {
        CycleSnapshot {
            user_name: Some("Alex".into()),
            donation_count: 3,
            last_donation_date: None,
            next_donation_date: None,
            time_remaining: None,
            days_until_next: None,
            is_eligible: true,
            reminder: None,
            at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn renders_empty_profile() {
        let line = render(&snapshot(), true);
        assert!(line.starts_with("Alex: no donation recorded yet"));
        assert!(line.ends_with("donations: 3"));
    }

    #[test]
    fn renders_padded_countdown_and_reminder() {
        let mut snap = snapshot();
        snap.next_donation_date = Some(Utc.with_ymd_and_hms(2024, 2, 26, 12, 0, 0).unwrap());
        snap.time_remaining = Some(Countdown {
            days: 2,
            hours: 5,
            minutes: 7,
            seconds: 0,
        });
        snap.days_until_next = Some(2);
        snap.is_eligible = false;
        snap.reminder = Some(Reminder::TwoDays);

        let line = render(&snap, true);
        assert!(line.contains("next donation in 02d 05h 07m 00s"));
        assert!(line.contains("Hydrate well"));

        let quiet = render(&snap, false);
        assert!(!quiet.contains("Hydrate well"));
    }

    #[test]
    fn renders_eligible_state() {
        let mut snap = snapshot();
        snap.next_donation_date = Some(Utc.with_ymd_and_hms(2024, 2, 26, 12, 0, 0).unwrap());
        assert!(render(&snap, true).contains("eligible to donate since"));
    }

    #[test]
    fn zero_countdown_at_the_boundary_renders_as_eligible() {
        let mut snap = snapshot();
        snap.next_donation_date = Some(Utc.with_ymd_and_hms(2024, 2, 26, 0, 0, 0).unwrap());
        snap.time_remaining = Some(Countdown {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        });
        snap.days_until_next = Some(0);
        snap.is_eligible = true;

        let line = render(&snap, true);
        assert!(line.contains("eligible to donate since"));
        assert!(!line.contains("next donation in"));
    }
}
