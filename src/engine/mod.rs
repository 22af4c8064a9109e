//! Game session.
//!
//! The session wires the round state machine, the wager ledger and the history
//! log together, persists balance and history after every change and publishes
//! a [`Snapshot`] for the rendering layer. It can be stepped synchronously with
//! [`GameSession::tick`] or driven in real time with [`GameSession::run`].

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::Amount;
use crate::config::GameConfig;
use crate::draw::{CrashPointSource, RandomDraw};
use crate::model::{Phase, PlayerAction, RoundId, RoundReport, Snapshot};
use crate::store::{KeyValueStore, MemoryStore, PersistedState, load_state, save_state};

mod error;
pub use error::{BetError, CashOutError, GameError};

mod history;
pub use history::HistoryLog;

mod ledger;
pub use ledger::{Settlement, Wager, WagerLedger};

mod round;
pub use round::{PhaseTimer, RoundStateMachine, RoundTick};

/// A single player's game.
pub struct GameSession<S = MemoryStore, D = RandomDraw> {
    config: GameConfig,
    round: RoundStateMachine,
    ledger: WagerLedger,
    history: HistoryLog,
    bet_amount: Amount,
    muted: bool,
    last_round: Option<RoundReport>,
    store: S,
    draw: D,
    snapshots: watch::Sender<Snapshot>,
}

/// Public API
impl<S: KeyValueStore, D: CrashPointSource> GameSession<S, D> {
    /// Start a session in the `Waiting` phase, restoring balance and history
    /// from `store`.
    pub fn new(config: GameConfig, store: S, draw: D) -> Self {
        let PersistedState { balance, history } =
            load_state(&store, config.starting_balance, config.history_capacity);
        info!(%balance, history = history.len(), "session loaded");

        let (snapshots, _) = watch::channel(Snapshot::default());
        let session = Self {
            round: RoundStateMachine::new(&config),
            ledger: WagerLedger::new(balance),
            history: HistoryLog::from_entries(history, config.history_capacity),
            bet_amount: config.default_bet,
            muted: false,
            last_round: None,
            store,
            draw,
            snapshots,
            config,
        };
        session.publish();
        session
    }

    /// Run the game in real time, applying actions from `actions` as they arrive.
    ///
    /// Exactly one timer is armed at a time; it is dropped and replaced whenever
    /// the phase changes. A timer firing always completes before an action that
    /// became ready at the same instant. Returns once `actions` is exhausted.
    pub async fn run(&mut self, mut actions: impl Stream<Item = PlayerAction> + Unpin) {
        loop {
            let phase = self.round.phase();
            let mut timer = Self::arm(self.round.timer());
            loop {
                tokio::select! {
                    biased;
                    _ = timer.tick() => {
                        self.tick();
                        if self.round.phase() != phase {
                            break;
                        }
                    }
                    action = actions.next() => match action {
                        // rejected actions are no-ops, the result is only logged
                        Some(action) => {
                            let _ = self.apply(action);
                        }
                        None => return,
                    }
                }
            }
        }
    }

    /// Fire the current phase's timer once and apply its side effects.
    pub fn tick(&mut self) -> RoundTick {
        let tick = self.round.tick(&mut self.draw);
        match tick {
            RoundTick::Crashed {
                multiplier,
                crash_point,
            } => self.finish_round(multiplier, crash_point),
            RoundTick::Ready => self.ledger.start_round(),
            RoundTick::Countdown(_) | RoundTick::Launched | RoundTick::Climbing(_) => {}
        }
        self.publish();
        tick
    }

    /// Apply a single player action on top of the current state.
    pub fn apply(&mut self, action: PlayerAction) -> Result<(), GameError> {
        let name = action.name();
        let result = match action {
            PlayerAction::PlaceBet => self.place_bet(),
            PlayerAction::CashOut => self.cash_out().map(|_| ()),
            PlayerAction::SetBetAmount(amount) => {
                self.set_bet_amount(amount);
                Ok(())
            }
            PlayerAction::ToggleMute => {
                self.toggle_mute();
                Ok(())
            }
        };
        Self::log_result(name, self.round.round(), &result);
        result
    }

    /// Stake the current bet amount on the upcoming round.
    pub fn place_bet(&mut self) -> Result<(), GameError> {
        self.ledger.place_bet(self.round.phase(), self.bet_amount)?;
        self.persist();
        self.publish();
        Ok(())
    }

    /// Cash out at the current multiplier. Returns the payout.
    pub fn cash_out(&mut self) -> Result<Amount, GameError> {
        let payout = self
            .ledger
            .cash_out(self.round.phase(), self.round.multiplier())?;
        self.persist();
        self.publish();
        Ok(payout)
    }

    /// Set the stake for the next bet, clamped to the configured minimum.
    pub fn set_bet_amount(&mut self, amount: Amount) {
        self.bet_amount = amount.max(self.config.min_bet);
        self.publish();
    }

    /// Set the stake from raw text input; see [`Amount::sanitize_bet`].
    pub fn set_bet_input(&mut self, input: &str) {
        self.set_bet_amount(Amount::sanitize_bet(input, self.config.min_bet));
    }

    /// Flip the mute flag and return the new value.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.publish();
        self.muted
    }

    /// Receive a fresh [`Snapshot`] after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            round: self.round.round(),
            phase: self.round.phase(),
            countdown: self.round.countdown(),
            multiplier: self.round.multiplier(),
            balance: self.ledger.balance(),
            bet_amount: self.bet_amount,
            has_bet: self.ledger.has_bet(),
            has_cashed_out: self.ledger.has_cashed_out(),
            win_amount: self.ledger.win_amount(),
            history: self.history.to_vec(),
            luck_rate: self.history.luck_rate(),
            muted: self.muted,
            last_round: self.last_round.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.round.phase()
    }

    pub fn round(&self) -> &RoundStateMachine {
        &self.round
    }

    pub fn ledger(&self) -> &WagerLedger {
        &self.ledger
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn bet_amount(&self) -> Amount {
        self.bet_amount
    }

    pub fn last_round(&self) -> Option<&RoundReport> {
        self.last_round.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Private API
impl<S: KeyValueStore, D: CrashPointSource> GameSession<S, D> {
    /// Small helper to log `apply` results
    fn log_result(action: &str, round: RoundId, result: &Result<(), GameError>) {
        match result {
            Ok(()) => info!(round, "{action} applied"),
            Err(e) => info!(round, reason = %e, "{action} skipped"),
        }
    }

    fn arm(timer: PhaseTimer) -> Interval {
        let mut interval = time::interval_at(Instant::now() + timer.period, timer.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    /// Settle the wager, record the crash and persist.
    fn finish_round(&mut self, multiplier: f64, crash_point: f64) {
        let (bet, cashed_out_at, payout) = match self.ledger.settle() {
            Settlement::NoBet => (None, None, Amount::ZERO),
            Settlement::Forfeited { amount } => (Some(amount), None, Amount::ZERO),
            Settlement::CashedOut {
                amount,
                multiplier,
                payout,
            } => (Some(amount), Some(multiplier), payout),
        };
        self.history.record(multiplier, Utc::now());

        let report = RoundReport {
            round: self.round.round(),
            crash_point,
            bet,
            cashed_out_at,
            payout,
            balance: self.ledger.balance(),
        };
        info!(
            round = report.round,
            crash_point,
            bet = ?report.bet.map(|b| b.to_string()),
            payout = %report.payout,
            balance = %report.balance,
            "round settled"
        );
        self.last_round = Some(report);
        self.persist();
    }

    fn persist(&mut self) {
        let state = PersistedState {
            balance: self.ledger.balance(),
            history: self.history.to_vec(),
        };
        if let Err(e) = save_state(&mut self.store, &state) {
            warn!(error = %e, "failed to persist session state");
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}
