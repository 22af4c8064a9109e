//! Automated play: an auto-cash-out strategy and the drivers that run it.

use tokio::sync::{mpsc, watch};

use crate::Amount;
use crate::draw::CrashPointSource;
use crate::engine::{GameSession, RoundTick};
use crate::model::{Phase, PlayerAction, RoundReport, Snapshot};
use crate::store::KeyValueStore;

/// Bet the same stake every round and cash out at a fixed multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoCashOut {
    pub bet: Amount,
    pub target: f64,
}

impl AutoCashOut {
    /// The action this strategy takes in the given state, if any.
    pub fn decide(&self, snapshot: &Snapshot) -> Option<PlayerAction> {
        match snapshot.phase {
            Phase::Waiting if !snapshot.has_bet && snapshot.balance >= snapshot.bet_amount => {
                Some(PlayerAction::PlaceBet)
            }
            Phase::Flying
                if snapshot.has_bet
                    && !snapshot.has_cashed_out
                    && snapshot.multiplier >= self.target =>
            {
                Some(PlayerAction::CashOut)
            }
            _ => None,
        }
    }
}

/// Play `rounds` rounds without waiting on real timers.
pub fn simulate<S: KeyValueStore, D: CrashPointSource>(
    session: &mut GameSession<S, D>,
    strategy: AutoCashOut,
    rounds: usize,
) -> Vec<RoundReport> {
    session.set_bet_amount(strategy.bet);

    let mut reports = Vec::with_capacity(rounds);
    while reports.len() < rounds {
        if let Some(action) = strategy.decide(&session.snapshot()) {
            // rejected actions are no-ops
            let _ = session.apply(action);
        }
        if let RoundTick::Crashed { .. } = session.tick() {
            reports.extend(session.last_round().cloned());
        }
    }
    reports
}

/// Play `rounds` rounds against a session running in real time, reacting to
/// its published snapshots. Dropping `actions` on return stops the session.
pub async fn autoplay(
    mut snapshots: watch::Receiver<Snapshot>,
    actions: mpsc::Sender<PlayerAction>,
    strategy: AutoCashOut,
    rounds: usize,
) -> Vec<RoundReport> {
    let mut reports = Vec::with_capacity(rounds);
    if rounds == 0
        || actions
            .send(PlayerAction::SetBetAmount(strategy.bet))
            .await
            .is_err()
    {
        return reports;
    }

    // Rounds settled before we started are not ours.
    let mut last_reported = snapshots.borrow().last_round.as_ref().map(|r| r.round);
    loop {
        let snapshot = snapshots.borrow_and_update().clone();

        if let Some(report) = &snapshot.last_round {
            if last_reported != Some(report.round) {
                last_reported = Some(report.round);
                reports.push(report.clone());
                if reports.len() == rounds {
                    return reports;
                }
            }
        }

        if let Some(action) = strategy.decide(&snapshot) {
            if actions.send(action).await.is_err() {
                return reports;
            }
        }

        if snapshots.changed().await.is_err() {
            return reports;
        }
    }
}
