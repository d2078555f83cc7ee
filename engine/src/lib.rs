pub mod clock;
pub mod history;
pub mod input;
pub mod timer;

use std::time::Duration;

pub use clock::{DeltaSource, FixedStep, InstantClock};
pub use history::History;
pub use input::{InputQueue, InputSender};
pub use timer::Delay;

/// Everything a game sees for one frame: the time since the previous frame
/// and the inputs that arrived in between, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<I> {
    pub dt: Duration,
    pub inputs: Vec<I>,
}

impl<I> Frame<I> {
    pub fn new(dt: Duration, inputs: Vec<I>) -> Self {
        Self { dt, inputs }
    }

    pub fn idle(dt: Duration) -> Self {
        Self::new(dt, Vec::new())
    }
}

pub trait GameLogic {
    type State;
    type Input;
    type Event;

    fn initial_state(&self) -> Self::State;

    /// Apply `frame.inputs` in order, then advance time by `frame.dt`.
    /// This is the only place game state is mutated while a runner owns it.
    fn update(&self, state: &mut Self::State, frame: Frame<Self::Input>) -> Vec<Self::Event>;
}

/// Frame-driven driver for a [`GameLogic`].
///
/// Inputs are queued (directly or through an [`InputSender`]) and applied at
/// the start of the next frame, which keeps every transition inside a frame
/// deterministic. Stopping closes the queue and turns further frames into
/// no-ops.
#[derive(Debug)]
pub struct HeadlessRunner<G: GameLogic> {
    game: G,
    state: G::State,
    queue: InputQueue<G::Input>,
    frame: u64,
    stopped: bool,
}

impl<G: GameLogic> HeadlessRunner<G> {
    pub fn new(game: G) -> Self {
        let state = game.initial_state();
        Self {
            game,
            state,
            queue: InputQueue::new(),
            frame: 0,
            stopped: false,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn state(&self) -> &G::State {
        &self.state
    }

    /// Direct access for commands that bypass the queue. Callers must not
    /// hold on to it across frames from another thread.
    pub fn state_mut(&mut self) -> &mut G::State {
        &mut self.state
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn sender(&self) -> InputSender<G::Input> {
        self.queue.sender()
    }

    pub fn push(&self, input: G::Input) -> bool {
        !self.stopped && self.queue.push(input)
    }

    pub fn step(&mut self, dt: Duration) -> Vec<G::Event> {
        if self.stopped {
            return Vec::new();
        }
        let inputs = self.queue.drain();
        self.frame += 1;
        self.game.update(&mut self.state, Frame::new(dt, inputs))
    }

    pub fn run_frame<C: DeltaSource>(&mut self, clock: &mut C) -> Vec<G::Event> {
        let dt = clock.delta();
        self.step(dt)
    }

    /// Run `frames` frames of `dt` each and collect every event.
    pub fn run_for(&mut self, frames: usize, dt: Duration) -> Vec<G::Event> {
        let mut events = Vec::new();
        for _ in 0..frames {
            if self.stopped {
                break;
            }
            events.extend(self.step(dt));
        }
        events
    }

    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.queue.close();
        log::info!("runner stopped at frame {}", self.frame);
    }

    /// Fresh initial state and a fresh queue. Senders handed out before the
    /// reset are detached.
    pub fn reset(&mut self) {
        self.queue.close();
        self.queue = InputQueue::new();
        self.state = self.game.initial_state();
        self.frame = 0;
        self.stopped = false;
    }
}
