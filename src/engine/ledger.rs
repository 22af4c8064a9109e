use crate::Amount;
use crate::model::Phase;

use super::error::{BetError, CashOutError};

/// A stake on the current round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wager {
    pub amount: Amount,
    /// Multiplier and payout of a successful cash-out.
    pub cashed_out: Option<(f64, Amount)>,
}

impl Wager {
    pub fn is_cashed_out(&self) -> bool {
        self.cashed_out.is_some()
    }
}

/// How a round ended for the wager riding on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Settlement {
    NoBet,
    /// Stake stays debited.
    Forfeited { amount: Amount },
    /// Payout was already credited at cash-out.
    CashedOut {
        amount: Amount,
        multiplier: f64,
        payout: Amount,
    },
}

/// The player's balance and the wager on the current round.
///
/// Balance only moves on a bet (debit) or a cash-out (credit), and a bet can
/// never take it below zero.
#[derive(Debug)]
pub struct WagerLedger {
    balance: Amount,
    wager: Option<Wager>,
    /// Display flags; they outlive the wager until the next countdown starts.
    cashed_out: bool,
    win_amount: Amount,
}

impl WagerLedger {
    pub fn new(balance: Amount) -> Self {
        Self {
            balance,
            wager: None,
            cashed_out: false,
            win_amount: Amount::ZERO,
        }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn wager(&self) -> Option<&Wager> {
        self.wager.as_ref()
    }

    pub fn has_bet(&self) -> bool {
        self.wager.is_some()
    }

    pub fn has_cashed_out(&self) -> bool {
        self.cashed_out
    }

    pub fn win_amount(&self) -> Amount {
        self.win_amount
    }

    /// Stake `amount` on the upcoming round:
    /// - Round must still be counting down
    /// - Only one bet per round
    /// - Amount must be positive and covered by the balance
    pub fn place_bet(&mut self, phase: Phase, amount: Amount) -> Result<(), BetError> {
        if phase != Phase::Waiting {
            return Err(BetError::WrongPhase(phase));
        }
        if self.wager.is_some() {
            return Err(BetError::AlreadyPlaced);
        }
        if !amount.is_positive() {
            return Err(BetError::NotPositive(amount));
        }
        if amount > self.balance {
            return Err(BetError::InsufficientFunds {
                available: self.balance,
                requested: amount,
            });
        }

        self.balance -= amount;
        self.wager = Some(Wager {
            amount,
            cashed_out: None,
        });
        Ok(())
    }

    /// Lock in `multiplier` and credit the payout. Returns the payout.
    pub fn cash_out(&mut self, phase: Phase, multiplier: f64) -> Result<Amount, CashOutError> {
        if phase != Phase::Flying {
            return Err(CashOutError::WrongPhase(phase));
        }
        let wager = self.wager.as_mut().ok_or(CashOutError::NoActiveBet)?;
        if wager.is_cashed_out() {
            return Err(CashOutError::AlreadyCashedOut);
        }

        let payout = wager.amount.times(multiplier);
        wager.cashed_out = Some((multiplier, payout));
        self.balance += payout;
        self.cashed_out = true;
        self.win_amount = payout;
        Ok(payout)
    }

    /// Close the round's wager. An open stake is forfeited; nothing is credited.
    pub fn settle(&mut self) -> Settlement {
        match self.wager.take() {
            None => Settlement::NoBet,
            Some(Wager {
                amount,
                cashed_out: None,
            }) => Settlement::Forfeited { amount },
            Some(Wager {
                amount,
                cashed_out: Some((multiplier, payout)),
            }) => Settlement::CashedOut {
                amount,
                multiplier,
                payout,
            },
        }
    }

    /// Clear the display flags of the previous round.
    pub fn start_round(&mut self) {
        self.cashed_out = false;
        self.win_amount = Amount::ZERO;
    }
}
