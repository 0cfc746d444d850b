//! The per-turn decision window.
//!
//! [`TurnTimer`] is the plain countdown value the battle owns. [`Countdown`]
//! is the subscription that drives it: a thread that sends one tagged
//! [`Msg::Tick`] per period and stops as soon as either its own token or the
//! application's is cancelled.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use duelist_core::{Context, Effect, Msg};

/// Seconds the player gets per turn unless configured otherwise.
pub const DEFAULT_TURN_SECONDS: u32 = 10;

/// Longest sleep between cancellation checks.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Seconds left in the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTimer {
    length: u32,
    left: u32,
}

impl TurnTimer {
    pub fn new(length: u32) -> Self {
        Self { length, left: length }
    }

    /// Start a fresh window.
    pub fn reset(&mut self) {
        self.left = self.length;
    }

    /// One second passed. Returns `true` on the tick that empties it.
    pub fn tick(&mut self) -> bool {
        if self.left == 0 {
            return false;
        }
        self.left -= 1;
        self.left == 0
    }

    pub fn left(&self) -> u32 {
        self.left
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn expired(&self) -> bool {
        self.left == 0
    }
}

impl Default for TurnTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TURN_SECONDS)
    }
}

/// Handle to a running countdown subscription.
///
/// Dropping the handle cancels the subscription.
#[derive(Debug)]
pub struct Countdown {
    ctx: Context,
    tag: u64,
}

impl Countdown {
    /// A countdown sending `ticks` ticks one second apart.
    pub fn start(tag: u64, ticks: u32) -> (Self, Effect) {
        Self::start_with_period(tag, ticks, Duration::from_secs(1))
    }

    /// A countdown sending `ticks` ticks `period` apart.
    pub fn start_with_period(tag: u64, ticks: u32, period: Duration) -> (Self, Effect) {
        let ctx = Context::new();
        let own = ctx.clone();
        let effect = Effect::Sub(Box::new(move |app: Context, tx: Sender<Msg>| {
            run(&own, &app, &tx, tag, ticks, period);
        }));
        (Self { ctx, tag }, effect)
    }

    pub fn tag(&self) -> u64 {
        self.tag
    }

    /// Whether `msg` is a tick from this countdown.
    pub fn owns(&self, msg: &Msg) -> bool {
        matches!(msg, Msg::Tick { tag, .. } if *tag == self.tag) && !self.is_cancelled()
    }

    pub fn cancel(&self) {
        self.ctx.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.ctx.is_done()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.ctx.cancel();
    }
}

fn run(own: &Context, app: &Context, tx: &Sender<Msg>, tag: u64, ticks: u32, period: Duration) {
    let slice = period.min(POLL_INTERVAL);
    for _ in 0..ticks {
        let due = Instant::now() + period;
        loop {
            if own.is_done() || app.is_done() {
                return;
            }
            let now = Instant::now();
            if now >= due {
                break;
            }
            thread::sleep(slice.min(due - now));
        }
        if own.is_done() || tx.send(Msg::tick(tag)).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duelist_core::app::run_effect;
    use std::sync::mpsc;

    #[test]
    fn timer_counts_down_once() {
        let mut t = TurnTimer::new(2);
        assert!(!t.tick());
        assert!(t.tick());
        assert!(t.expired());
        assert!(!t.tick());
        t.reset();
        assert_eq!(t.left(), 2);
    }

    #[test]
    fn countdown_sends_tagged_ticks() {
        let app = Context::new();
        let (tx, rx) = mpsc::channel();
        let (cd, effect) = Countdown::start_with_period(42, 3, Duration::from_millis(5));
        run_effect(effect, &app, &tx);
        for _ in 0..3 {
            let msg = rx.recv_timeout(Duration::from_secs(2)).unwrap();
            assert!(cd.owns(&msg));
        }
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn cancelled_countdown_stops() {
        let app = Context::new();
        let (tx, rx) = mpsc::channel();
        let (cd, effect) = Countdown::start_with_period(1, 50, Duration::from_millis(20));
        run_effect(effect, &app, &tx);
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        drop(cd);
        // At most one tick may already be in flight.
        let late = rx.try_iter().count()
            + rx.recv_timeout(Duration::from_millis(300)).into_iter().count();
        assert!(late <= 1);
    }

    #[test]
    fn app_shutdown_stops_countdown() {
        let app = Context::new();
        let (tx, rx) = mpsc::channel();
        let (_cd, effect) = Countdown::start_with_period(1, 50, Duration::from_millis(20));
        app.cancel();
        run_effect(effect, &app, &tx);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn stale_ticks_are_not_owned() {
        let (old, _) = Countdown::start(1, 10);
        let (new, _) = Countdown::start(2, 10);
        let tick = Msg::tick(1);
        assert!(old.owns(&tick));
        assert!(!new.owns(&tick));
        old.cancel();
        assert!(!old.owns(&tick));
    }
}
