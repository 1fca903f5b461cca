//! Console formatting for turns and recommendations.

use colored::Colorize;
use council_domain::{Recommendation, RecommendationSource, RoomStatusSummary, Turn};

/// Formats negotiation output for the terminal.
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format_turn(turn: &Turn) -> String {
        let speaker = turn.agent_label.cyan().bold();
        let kind = format!("[{}]", turn.kind).dimmed();
        if turn.degraded {
            format!("{} {} {}", speaker, kind, turn.text.dimmed())
        } else {
            format!("{} {} {}", speaker, kind, turn.text)
        }
    }

    pub fn format_notice(message: &str) -> String {
        format!("{} {}", "--".dimmed(), message.yellow())
    }

    pub fn format_status(summary: &RoomStatusSummary) -> String {
        format!(
            "session {} [{}] {}/{} ready",
            summary.invite_code,
            summary.status.to_string().magenta(),
            summary.ready_count,
            summary.participant_count,
        )
    }

    pub fn format_recommendation(rec: &Recommendation) -> String {
        let mut out = String::new();
        out.push_str(&format!("\n{}\n", "=== Tonight's pick ===".green().bold()));
        out.push_str(&format!(
            "{} ({}, {})\n",
            rec.venue_name.bold(),
            rec.cuisine,
            rec.price_tier.description(),
        ));
        out.push_str(&format!("{}\n", rec.rationale));

        if let Some(address) = &rec.address {
            out.push_str(&format!("Address: {}\n", address));
        }
        if let Some(rating) = rec.rating {
            out.push_str(&format!("Rating: {:.1}\n", rating));
        }
        if !rec.dish_suggestions.is_empty() {
            out.push_str(&format!("Try: {}\n", rec.dish_suggestions.join(", ")));
        }
        if !rec.suitable_for.is_empty() {
            out.push_str(&format!("For: {}\n", rec.suitable_for.join(", ")));
        }
        if rec.source != RecommendationSource::Grounded {
            out.push_str(&format!(
                "{}\n",
                "(fallback recommendation; live venue data was unavailable)".dimmed()
            ));
        }
        out
    }

    pub fn format_json(rec: &Recommendation) -> String {
        serde_json::to_string_pretty(rec).unwrap_or_else(|_| "{}".to_string())
    }
}
