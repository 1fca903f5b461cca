//! Live feed printer
//!
//! Drains a [`SessionFeed`] to the terminal as the negotiation unfolds: a
//! spinner while agents think (kept alive by heartbeat frames), one line
//! per turn, and the recommendation at the end.

use crate::formatter::ConsoleFormatter;
use council_application::{FeedEvent, SessionFeed};
use council_domain::{LogEntry, Recommendation};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Prints a session feed as it arrives.
pub struct LiveFeedPrinter {
    quiet: bool,
}

impl LiveFeedPrinter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Consume the feed to completion; returns the recommendation if one
    /// was delivered.
    pub async fn run(&self, feed: &mut SessionFeed) -> Option<Recommendation> {
        let spinner = if self.quiet {
            ProgressBar::hidden()
        } else {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner.set_message("agents are talking...");
            spinner
        };

        let mut recommendation = None;
        while let Some(event) = feed.next_event().await {
            match event {
                FeedEvent::Heartbeat => {
                    spinner.set_message("still thinking...");
                }
                FeedEvent::Entry(entry) => match entry.entry {
                    LogEntry::Turn(turn) => {
                        spinner.suspend(|| println!("{}", ConsoleFormatter::format_turn(&turn)));
                        spinner.set_message("agents are talking...");
                    }
                    LogEntry::Notice { message } => {
                        spinner.suspend(|| println!("{}", ConsoleFormatter::format_notice(&message)));
                    }
                    LogEntry::Recommendation(rec) => {
                        recommendation = Some(rec);
                    }
                    LogEntry::Completed => break,
                },
            }
        }

        spinner.finish_and_clear();
        recommendation
    }
}
