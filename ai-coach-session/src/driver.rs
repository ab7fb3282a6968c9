//! Async host loop for a session.
//!
//! The driver owns the [`Session`] and a tick interval inside a single task.
//! User commands arrive through cloneable [`SessionHandle`]s; each command or
//! tick is reduced to completion before the next one is polled, so no two
//! transitions are ever in flight. Returning from [`SessionDriver::run`]
//! drops both the interval and the session.

use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::clock::Clock;
use crate::exit::FeedbackSink;
use crate::machine::{Action, Effect, Notice, SessionEnd};
use crate::session::{Session, Snapshot};

/// Default spacing of timer ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum Command {
    Dispatch(Action),
    Unmount,
}

/// Sends user input to a running driver.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    /// Queue an action. Returns false once the driver has stopped.
    pub fn dispatch(&self, action: Action) -> bool {
        self.tx.send(Command::Dispatch(action)).is_ok()
    }

    /// Tear the session down without ending it
    pub fn unmount(&self) -> bool {
        self.tx.send(Command::Unmount).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receives state for rendering.
pub trait SessionObserver: Send {
    /// Called after every transition. `Break` stops the driver.
    fn on_snapshot(&mut self, snapshot: &Snapshot) -> ControlFlow<()>;

    fn on_notice(&mut self, _notice: &Notice) {}
}

/// Observer that ignores everything
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_snapshot(&mut self, _snapshot: &Snapshot) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Why the driver loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    Ended(SessionEnd),
    /// Unmounted, or every handle was dropped
    Unmounted,
    /// The observer could not go on
    Stopped,
}

pub struct SessionDriver<C: Clock> {
    session: Session<C>,
    rx: mpsc::UnboundedReceiver<Command>,
    tick_period: Duration,
}

impl<C: Clock> SessionDriver<C> {
    pub fn new(session: Session<C>) -> (Self, SessionHandle) {
        Self::with_tick_period(session, TICK_PERIOD)
    }

    pub fn with_tick_period(
        session: Session<C>,
        tick_period: Duration,
    ) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                session,
                rx,
                tick_period,
            },
            SessionHandle { tx },
        )
    }

    /// Run until the session ends or is unmounted.
    pub async fn run(
        mut self,
        sink: &dyn FeedbackSink,
        observer: &mut dyn SessionObserver,
    ) -> DriverExit {
        let mut ticker = interval_at(Instant::now() + self.tick_period, self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(session = %self.session.id(), "Session driver started");
        if observer.on_snapshot(&self.session.snapshot()).is_break() {
            tracing::warn!(session = %self.session.id(), "Observer stopped the session");
            return DriverExit::Stopped;
        }

        loop {
            let effects = tokio::select! {
                biased;
                command = self.rx.recv() => match command {
                    Some(Command::Dispatch(action)) => self.session.dispatch(action),
                    Some(Command::Unmount) | None => {
                        tracing::info!(session = %self.session.id(), "Session unmounted");
                        return DriverExit::Unmounted;
                    }
                },
                _ = ticker.tick() => self.session.tick(),
            };

            let mut ended = None;
            for effect in effects {
                match effect {
                    Effect::Notify(notice) => observer.on_notice(&notice),
                    Effect::LogFeedback(record) => sink.record(&record),
                    Effect::SessionEnded(end) => ended = Some(end),
                }
            }

            let flow = observer.on_snapshot(&self.session.snapshot());

            if let Some(end) = ended {
                return DriverExit::Ended(end);
            }
            if flow.is_break() {
                tracing::warn!(session = %self.session.id(), "Observer stopped the session");
                return DriverExit::Stopped;
            }
        }
    }
}
