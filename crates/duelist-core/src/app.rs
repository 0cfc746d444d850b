//! The Elm-architecture application loop: [`Model`], [`Driver`], [`Effect`],
//! [`App`].
//!
//! Input arrives from the driver's listener thread over an mpsc channel.
//! Commands and subscriptions returned by the model run on their own
//! threads and report back through the same channel, so the model itself is
//! only ever touched from the loop thread.

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::frame::Frame;
use crate::messages::Msg;

/// How long the loop waits for a message before re-checking for shutdown.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Context (cancellation token)
// ---------------------------------------------------------------------------

/// A simple cooperative-cancellation token backed by an [`AtomicBool`].
#[derive(Clone, Debug)]
pub struct Context {
    done: Arc<AtomicBool>,
}

impl Context {
    /// Create a new, non-cancelled context.
    pub fn new() -> Self {
        Self {
            done: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Request cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.done.store(true, Ordering::Release);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Effect / Cmd
// ---------------------------------------------------------------------------

/// A side-effect returned by [`Model::update`].
pub enum Effect {
    /// A one-shot command that produces an optional follow-up message.
    Cmd(Box<dyn FnOnce() -> Option<Msg> + Send>),
    /// A long-running subscription that may send many messages. It receives
    /// the application context and must return once that is cancelled.
    Sub(Box<dyn FnOnce(Context, Sender<Msg>) + Send>),
    /// Multiple effects batched together.
    Batch(Vec<Effect>),
    /// Signal the application loop to stop.
    End,
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cmd(_) => f.write_str("Effect::Cmd(..)"),
            Self::Sub(_) => f.write_str("Effect::Sub(..)"),
            Self::Batch(v) => f.debug_tuple("Effect::Batch").field(&v.len()).finish(),
            Self::End => f.write_str("Effect::End"),
        }
    }
}

/// Convenience constructor for a [`Effect::Cmd`].
pub fn cmd<F>(f: F) -> Effect
where
    F: FnOnce() -> Option<Msg> + Send + 'static,
{
    Effect::Cmd(Box::new(f))
}

/// A command that sleeps for `after` and then delivers `Msg::Tick { tag }`.
pub fn delay(tag: u64, after: Duration) -> Effect {
    cmd(move || {
        thread::sleep(after);
        Some(Msg::tick(tag))
    })
}

/// Convenience type alias.
pub type Cmd = Effect;

// ---------------------------------------------------------------------------
// Model trait
// ---------------------------------------------------------------------------

/// The application model (Elm architecture).
pub trait Model {
    /// Process a message, optionally returning a side-effect.
    fn update(&mut self, msg: Msg) -> Option<Effect>;

    /// Render the current state into `frame`.
    fn draw(&self, frame: &mut Frame);
}

// ---------------------------------------------------------------------------
// Driver trait
// ---------------------------------------------------------------------------

/// Back-end driver (e.g. a terminal).
pub trait Driver {
    /// Initialise the back-end.
    fn init(&mut self) -> Result<(), Box<dyn Error>>;

    /// Start the single input listener. The listener translates raw events
    /// into [`Msg`]s, sends them through `tx`, and returns once `ctx` is
    /// cancelled.
    fn spawn_input(
        &mut self,
        ctx: Context,
        tx: Sender<Msg>,
    ) -> Result<JoinHandle<()>, Box<dyn Error>>;

    /// Flush a frame to the screen.
    fn flush(&mut self, frame: &Frame) -> Result<(), Box<dyn Error>>;

    /// Clean up / restore the terminal.
    fn close(&mut self);
}

// ---------------------------------------------------------------------------
// AppConfig / App
// ---------------------------------------------------------------------------

/// Configuration for creating an [`App`].
pub struct AppConfig<M: Model, D: Driver> {
    pub model: M,
    pub driver: D,
    pub width: i32,
    pub height: i32,
}

/// The main application runner.
pub struct App<M: Model, D: Driver> {
    model: M,
    driver: D,
    width: i32,
    height: i32,
}

impl<M: Model, D: Driver> App<M, D> {
    /// Create a new application from a configuration.
    pub fn new(config: AppConfig<M, D>) -> Self {
        Self {
            model: config.model,
            driver: config.driver,
            width: config.width,
            height: config.height,
        }
    }

    /// Borrow the model (useful after [`run`](Self::run) returns).
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run the main Model-View-Update loop.
    ///
    /// 1. Initialises the driver and starts its input listener.
    /// 2. Sends `Msg::Init` through the model.
    /// 3. Waits for messages (at most [`POLL_INTERVAL`] at a time), updates
    ///    the model, draws, and flushes when the frame changed.
    /// 4. Stops when the model returns `Effect::End`.
    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        self.driver.init()?;

        let ctx = Context::new();
        let (tx, rx): (Sender<Msg>, Receiver<Msg>) = mpsc::channel();

        let input = match self.driver.spawn_input(ctx.clone(), tx.clone()) {
            Ok(handle) => handle,
            Err(e) => {
                self.driver.close();
                return Err(e);
            }
        };

        tx.send(Msg::Init).ok();

        let mut prev = Frame::new(self.width, self.height);
        let mut curr = Frame::new(self.width, self.height);
        let mut result = Ok(());

        while !ctx.is_done() {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(msg) => {
                    self.dispatch(msg, &ctx, &tx);
                    // Drain whatever else is already queued before drawing.
                    while !ctx.is_done() {
                        match rx.try_recv() {
                            Ok(msg) => self.dispatch(msg, &ctx, &tx),
                            Err(_) => break,
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if ctx.is_done() {
                break;
            }

            curr.clear();
            self.model.draw(&mut curr);
            if curr != prev {
                if let Err(e) = self.driver.flush(&curr) {
                    result = Err(e);
                    break;
                }
                std::mem::swap(&mut prev, &mut curr);
            }
        }

        ctx.cancel();
        if input.join().is_err() {
            log::warn!("input listener thread panicked");
        }
        self.driver.close();
        result
    }

    fn dispatch(&mut self, msg: Msg, ctx: &Context, tx: &Sender<Msg>) {
        if let Some(effect) = self.model.update(msg) {
            run_effect(effect, ctx, tx);
        }
    }
}

/// Execute an effect. Commands and subscriptions are detached onto their
/// own threads; `End` cancels `ctx`.
pub fn run_effect(effect: Effect, ctx: &Context, tx: &Sender<Msg>) {
    match effect {
        Effect::End => ctx.cancel(),
        Effect::Cmd(f) => {
            let tx = tx.clone();
            thread::spawn(move || {
                if let Some(msg) = f() {
                    tx.send(msg).ok();
                }
            });
        }
        Effect::Sub(f) => {
            let tx = tx.clone();
            let ctx = ctx.clone();
            thread::spawn(move || f(ctx, tx));
        }
        Effect::Batch(effects) => {
            for e in effects {
                run_effect(e, ctx, tx);
            }
        }
    }
}
