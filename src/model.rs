//! Core domain types for the crash game.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Amount;

/// Round number, counted from the start of the process.
pub type RoundId = u64;

/// Phase of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Counting down; bets are accepted.
    #[default]
    Waiting,
    /// Multiplier is rising; cash-outs are accepted.
    Flying,
    /// Round is over; waiting for the next countdown.
    Crashed,
}

/// The inputs a player can send to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerAction {
    /// Stake the current bet amount on the next round.
    PlaceBet,
    /// Lock in the current multiplier.
    CashOut,
    /// Change the stake used by the next `PlaceBet`; clamped to the minimum bet.
    SetBetAmount(Amount),
    ToggleMute,
}

impl PlayerAction {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerAction::PlaceBet => "place_bet",
            PlayerAction::CashOut => "cash_out",
            PlayerAction::SetBetAmount(_) => "set_bet_amount",
            PlayerAction::ToggleMute => "toggle_mute",
        }
    }
}

/// A completed round as shown in the history panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Settled multiplier, stored with two decimals.
    #[serde(with = "two_decimals")]
    pub value: f64,
    pub time: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(value: f64, time: DateTime<Utc>) -> Self {
        Self {
            value: crate::clock::round2(value),
            time,
        }
    }

    pub fn tier(&self) -> Tier {
        Tier::of(self.value)
    }

    /// The multiplier in its two-decimal display form, e.g. `"1.00"`.
    pub fn display_value(&self) -> String {
        format!("{:.2}", self.value)
    }
}

/// Display bucket for a settled multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Low,
    Mid,
    High,
    Top,
}

impl Tier {
    pub fn of(value: f64) -> Self {
        if value < 2.0 {
            Tier::Low
        } else if value < 5.0 {
            Tier::Mid
        } else if value < 10.0 {
            Tier::High
        } else {
            Tier::Top
        }
    }
}

/// Outcome of one round from the player's point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub round: RoundId,
    pub crash_point: f64,
    /// Stake placed on this round, if any.
    pub bet: Option<Amount>,
    /// Multiplier locked in by a cash-out, if any.
    pub cashed_out_at: Option<f64>,
    /// Zero when the stake was forfeited or no bet was placed.
    pub payout: Amount,
    /// Balance once the round settled.
    pub balance: Amount,
}

/// Everything a rendering layer needs to redraw, published on every change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub round: RoundId,
    pub phase: Phase,
    pub countdown: u32,
    pub multiplier: f64,
    pub balance: Amount,
    pub bet_amount: Amount,
    pub has_bet: bool,
    pub has_cashed_out: bool,
    pub win_amount: Amount,
    /// Newest first.
    pub history: Vec<HistoryEntry>,
    pub luck_rate: f64,
    pub muted: bool,
    pub last_round: Option<RoundReport>,
}

mod two_decimals {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:.2}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(de::Error::custom(format!("invalid multiplier '{raw}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn phase_default_is_waiting() {
        assert_eq!(Phase::default(), Phase::Waiting);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(Tier::of(1.0), Tier::Low);
        assert_eq!(Tier::of(1.99), Tier::Low);
        assert_eq!(Tier::of(2.0), Tier::Mid);
        assert_eq!(Tier::of(4.99), Tier::Mid);
        assert_eq!(Tier::of(5.0), Tier::High);
        assert_eq!(Tier::of(9.99), Tier::High);
        assert_eq!(Tier::of(10.0), Tier::Top);
        assert_eq!(Tier::of(250.0), Tier::Top);
    }

    #[test]
    fn history_entry_serializes_value_as_two_decimal_string() {
        let time = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let entry = HistoryEntry::new(1.0, time);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"value":"1.00","time":"2026-03-01T12:30:00Z"}"#);

        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn history_entry_rejects_non_numeric_value() {
        let json = r#"{"value":"lots","time":"2026-03-01T12:30:00Z"}"#;
        assert!(serde_json::from_str::<HistoryEntry>(json).is_err());
    }

    #[test]
    fn history_entry_rounds_value() {
        let entry = HistoryEntry::new(2.3456, Utc::now());
        assert_eq!(entry.display_value(), "2.35");
        assert_eq!(entry.tier(), Tier::Mid);
    }

    #[test]
    fn action_names() {
        assert_eq!(PlayerAction::PlaceBet.name(), "place_bet");
        assert_eq!(PlayerAction::SetBetAmount(Amount::ZERO).name(), "set_bet_amount");
    }
}
