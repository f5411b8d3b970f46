//! Cancelable scheduled effects: transient color resets, the timed walk stop
//! and the dance loop. Each kind owns at most one handle; scheduling a kind
//! again replaces (cancels) the pending one.

use bevy::prelude::*;
use std::time::Duration;

pub const DANCE_INTERVAL: Duration = Duration::from_millis(60);
pub const TIMED_DANCE_TICKS: u32 = 80;

/// One-shot effects.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Delayed {
    TintReset,
    WalkStop,
    HappinessReset,
}

impl Delayed {
    const ALL: [Delayed; 3] = [Delayed::TintReset, Delayed::WalkStop, Delayed::HappinessReset];

    fn slot(self) -> usize {
        match self {
            Delayed::TintReset => 0,
            Delayed::WalkStop => 1,
            Delayed::HappinessReset => 2,
        }
    }
}

/// Something that came due during [`Tasks::tick`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Fired {
    Delayed(Delayed),
    /// Dance step with its 0-based tick index.
    DanceStep(u32),
    /// A bounded dance ran all of its ticks.
    DanceDone,
}

#[derive(Debug)]
struct Dance {
    timer: Timer,
    ticks: u32,
    limit: Option<u32>,
}

#[derive(Debug, Default)]
pub struct Tasks {
    delayed: [Option<Timer>; 3],
    dance: Option<Dance>,
}

impl Tasks {
    pub fn schedule(&mut self, kind: Delayed, after: Duration) {
        self.delayed[kind.slot()] = Some(Timer::new(after, TimerMode::Once));
    }

    /// Start dancing, replacing any running dance. `limit = None` runs until stopped.
    pub fn start_dance(&mut self, limit: Option<u32>) {
        self.dance = Some(Dance {
            timer: Timer::new(DANCE_INTERVAL, TimerMode::Repeating),
            ticks: 0,
            limit,
        });
    }

    /// Returns whether a dance was running.
    pub fn stop_dance(&mut self) -> bool {
        self.dance.take().is_some()
    }

    pub fn dancing(&self) -> bool {
        self.dance.is_some()
    }

    pub fn tick(&mut self, dt: Duration) -> Vec<Fired> {
        let mut fired = Vec::new();

        for kind in Delayed::ALL {
            let slot = &mut self.delayed[kind.slot()];
            let due = slot.as_mut().is_some_and(|t| t.tick(dt).finished());
            if due {
                *slot = None;
                fired.push(Fired::Delayed(kind));
            }
        }

        let mut finished = false;
        if let Some(dance) = self.dance.as_mut() {
            let steps = dance.timer.tick(dt).times_finished_this_tick();
            for _ in 0..steps {
                fired.push(Fired::DanceStep(dance.ticks));
                dance.ticks += 1;
                if dance.limit.is_some_and(|limit| dance.ticks >= limit) {
                    fired.push(Fired::DanceDone);
                    finished = true;
                    break;
                }
            }
        }
        if finished {
            self.dance = None;
        }

        fired
    }
}
