//! Reasons a player action is rejected.

use thiserror::Error;

use crate::Amount;
use crate::model::Phase;

/// Top-level error returned by [`GameSession::apply`](super::GameSession::apply).
///
/// A rejected action never changes any state.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    #[error("bet rejected: {0}")]
    Bet(#[from] BetError),

    #[error("cash-out rejected: {0}")]
    CashOut(#[from] CashOutError),
}

/// Error during bet placement.
#[derive(Debug, Error, PartialEq)]
pub enum BetError {
    #[error("bets are only accepted while waiting, round is {0:?}")]
    WrongPhase(Phase),
    #[error("a bet is already placed on this round")]
    AlreadyPlaced,
    #[error("bet amount {0} is not positive")]
    NotPositive(Amount),
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientFunds { available: Amount, requested: Amount },
}

/// Error during cash-out.
#[derive(Debug, Error, PartialEq)]
pub enum CashOutError {
    #[error("cash-out is only possible while flying, round is {0:?}")]
    WrongPhase(Phase),
    #[error("no bet placed on this round")]
    NoActiveBet,
    #[error("already cashed out")]
    AlreadyCashedOut,
}
