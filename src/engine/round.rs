use std::time::Duration;

use tracing::debug;

use crate::clock::MultiplierClock;
use crate::config::GameConfig;
use crate::draw::CrashPointSource;
use crate::model::{Phase, RoundId};

/// The timer a phase runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTimer {
    pub period: Duration,
    /// A one-shot timer fires once and its phase then transitions.
    pub repeating: bool,
}

/// What one timer firing did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundTick {
    /// Countdown decremented, still waiting.
    Countdown(u32),
    /// Countdown hit zero; the round is flying.
    Launched,
    /// Multiplier advanced below the crash point.
    Climbing(f64),
    /// Multiplier reached the crash point.
    Crashed { multiplier: f64, crash_point: f64 },
    /// Crash delay elapsed; a new countdown started.
    Ready,
}

/// Phase, countdown and multiplier of the current round.
///
/// Waiting -> Flying -> Crashed -> Waiting, forever. Each call to [`tick`]
/// is one firing of the timer reported by [`timer`].
///
/// [`tick`]: RoundStateMachine::tick
/// [`timer`]: RoundStateMachine::timer
#[derive(Debug)]
pub struct RoundStateMachine {
    phase: Phase,
    round: RoundId,
    countdown: u32,
    /// Last multiplier published while flying.
    multiplier: f64,
    crash_point: f64,
    clock: MultiplierClock,
    countdown_secs: u32,
    countdown_tick: Duration,
    flight_tick: Duration,
    crash_delay: Duration,
}

impl RoundStateMachine {
    pub fn new(config: &GameConfig) -> Self {
        let mut machine = Self {
            phase: Phase::Waiting,
            round: 1,
            countdown: config.countdown_secs,
            multiplier: MultiplierClock::BASELINE,
            crash_point: MultiplierClock::BASELINE,
            clock: MultiplierClock::new(config.growth_rate),
            countdown_secs: config.countdown_secs,
            countdown_tick: config.countdown_tick(),
            flight_tick: config.flight_tick(),
            crash_delay: config.crash_delay(),
        };
        machine.enter_waiting();
        machine
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> RoundId {
        self.round
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// The crash point is only revealed once the round has crashed.
    pub fn revealed_crash_point(&self) -> Option<f64> {
        (self.phase == Phase::Crashed).then_some(self.crash_point)
    }

    pub fn timer(&self) -> PhaseTimer {
        match self.phase {
            Phase::Waiting => PhaseTimer {
                period: self.countdown_tick,
                repeating: true,
            },
            Phase::Flying => PhaseTimer {
                period: self.flight_tick,
                repeating: true,
            },
            Phase::Crashed => PhaseTimer {
                period: self.crash_delay,
                repeating: false,
            },
        }
    }

    /// Fire the current phase's timer once.
    pub fn tick<D: CrashPointSource + ?Sized>(&mut self, draw: &mut D) -> RoundTick {
        match self.phase {
            Phase::Waiting => {
                self.countdown = self.countdown.saturating_sub(1);
                if self.countdown > 0 {
                    return RoundTick::Countdown(self.countdown);
                }
                self.enter_flying(draw);
                RoundTick::Launched
            }
            Phase::Flying => {
                let next = self.clock.advance();
                if next >= self.crash_point {
                    self.enter_crashed();
                    return RoundTick::Crashed {
                        multiplier: next,
                        crash_point: self.crash_point,
                    };
                }
                self.multiplier = next;
                RoundTick::Climbing(next)
            }
            Phase::Crashed => {
                self.round += 1;
                self.enter_waiting();
                RoundTick::Ready
            }
        }
    }

    fn enter_waiting(&mut self) {
        self.phase = Phase::Waiting;
        self.countdown = self.countdown_secs;
        self.clock.reset();
        self.multiplier = self.clock.value();
        debug!(round = self.round, countdown = self.countdown, "round waiting");
    }

    fn enter_flying<D: CrashPointSource + ?Sized>(&mut self, draw: &mut D) {
        self.crash_point = draw.draw();
        self.phase = Phase::Flying;
        debug!(round = self.round, "round flying");
    }

    fn enter_crashed(&mut self) {
        self.phase = Phase::Crashed;
        debug!(
            round = self.round,
            crash_point = self.crash_point,
            "round crashed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::ScriptedDraw;

    fn machine() -> RoundStateMachine {
        RoundStateMachine::new(&GameConfig::default())
    }

    /// Tick through the countdown; returns the launch tick.
    fn launch(machine: &mut RoundStateMachine, draw: &mut ScriptedDraw) -> RoundTick {
        let mut last = machine.tick(draw);
        while machine.phase() == Phase::Waiting {
            last = machine.tick(draw);
        }
        last
    }

    #[test]
    fn starts_waiting_with_full_countdown() {
        let machine = machine();
        assert_eq!(machine.phase(), Phase::Waiting);
        assert_eq!(machine.countdown(), 5);
        assert_eq!(machine.multiplier(), 1.0);
        assert_eq!(machine.round(), 1);
        assert_eq!(
            machine.timer(),
            PhaseTimer {
                period: Duration::from_secs(1),
                repeating: true
            }
        );
    }

    #[test]
    fn countdown_launches_after_five_ticks() {
        let mut machine = machine();
        let mut draw = ScriptedDraw::new([3.0]);

        for expected in [4, 3, 2, 1] {
            assert_eq!(machine.tick(&mut draw), RoundTick::Countdown(expected));
        }
        assert_eq!(machine.tick(&mut draw), RoundTick::Launched);
        assert_eq!(machine.phase(), Phase::Flying);
        assert_eq!(machine.countdown(), 0);
        assert_eq!(machine.timer().period, Duration::from_millis(60));
        assert_eq!(machine.revealed_crash_point(), None);
    }

    #[test]
    fn crashes_on_first_tick_at_or_above_crash_point() {
        let mut machine = machine();
        let mut draw = ScriptedDraw::new([1.5]);
        launch(&mut machine, &mut draw);

        let mut previous = machine.multiplier();
        loop {
            match machine.tick(&mut draw) {
                RoundTick::Climbing(value) => {
                    assert!(value >= previous);
                    assert!(value < 1.5);
                    previous = value;
                }
                RoundTick::Crashed {
                    multiplier,
                    crash_point,
                } => {
                    assert!(multiplier >= 1.5);
                    assert!(previous < 1.5);
                    assert_eq!(crash_point, 1.5);
                    break;
                }
                other => panic!("unexpected tick {other:?}"),
            }
        }
        assert_eq!(machine.phase(), Phase::Crashed);
        assert_eq!(machine.revealed_crash_point(), Some(1.5));
        assert_eq!(
            machine.timer(),
            PhaseTimer {
                period: Duration::from_secs(3),
                repeating: false
            }
        );
    }

    #[test]
    fn instant_crash_still_flies_for_one_tick() {
        let mut machine = machine();
        let mut draw = ScriptedDraw::new([1.0]);

        assert_eq!(launch(&mut machine, &mut draw), RoundTick::Launched);
        assert_eq!(machine.phase(), Phase::Flying);
        assert_eq!(machine.multiplier(), 1.0);

        assert_eq!(
            machine.tick(&mut draw),
            RoundTick::Crashed {
                multiplier: 1.0,
                crash_point: 1.0
            }
        );
    }

    #[test]
    fn crash_delay_resets_round() {
        let mut machine = machine();
        let mut draw = ScriptedDraw::new([1.0]);
        launch(&mut machine, &mut draw);
        machine.tick(&mut draw);
        assert_eq!(machine.phase(), Phase::Crashed);

        assert_eq!(machine.tick(&mut draw), RoundTick::Ready);
        assert_eq!(machine.phase(), Phase::Waiting);
        assert_eq!(machine.countdown(), 5);
        assert_eq!(machine.multiplier(), 1.0);
        assert_eq!(machine.round(), 2);
    }

    #[test]
    fn draws_once_per_round() {
        struct Counting(u32);
        impl CrashPointSource for Counting {
            fn draw(&mut self) -> f64 {
                self.0 += 1;
                1.2
            }
        }

        let mut machine = machine();
        let mut draw = Counting(0);
        for _ in 0..3 {
            while machine.phase() != Phase::Crashed {
                machine.tick(&mut draw);
            }
            machine.tick(&mut draw);
        }
        assert_eq!(draw.0, 3);
        assert_eq!(machine.round(), 4);
    }
}
