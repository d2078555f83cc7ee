use std::time::Duration;

use engine::{Delay, FixedStep, Frame, GameLogic, HeadlessRunner};

/// Burns for `length` of frame time and emits "boom" once it runs out.
#[derive(Clone)]
struct Fuse {
    length: Duration,
}

#[derive(Debug)]
struct FuseState {
    delay: Delay,
    relit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FuseInput {
    Relight,
}

impl GameLogic for Fuse {
    type State = FuseState;
    type Input = FuseInput;
    type Event = &'static str;

    fn initial_state(&self) -> Self::State {
        FuseState {
            delay: Delay::new(self.length),
            relit: 0,
        }
    }

    fn update(&self, state: &mut Self::State, frame: Frame<Self::Input>) -> Vec<Self::Event> {
        for input in frame.inputs {
            match input {
                FuseInput::Relight => {
                    state.delay.reset();
                    state.relit += 1;
                }
            }
        }
        if state.delay.tick(frame.dt) {
            vec!["boom"]
        } else {
            Vec::new()
        }
    }
}

#[test]
fn delay_fires_once_through_the_runner() {
    let mut runner = HeadlessRunner::new(Fuse {
        length: Duration::from_millis(100),
    });
    let mut clock = FixedStep::new(Duration::from_millis(30));

    let mut events = Vec::new();
    for _ in 0..10 {
        events.extend(runner.run_frame(&mut clock));
    }
    assert_eq!(events, vec!["boom"]);
    assert_eq!(runner.frame(), 10);
}

#[test]
fn inputs_from_another_thread_land_on_the_next_frame() {
    let mut runner = HeadlessRunner::new(Fuse {
        length: Duration::from_millis(100),
    });
    runner.step(Duration::from_millis(90));

    let sender = runner.sender();
    std::thread::spawn(move || {
        sender.send(FuseInput::Relight);
    })
    .join()
    .expect("input thread");

    // Relight is applied before the 20ms advance, so no boom yet.
    assert!(runner.step(Duration::from_millis(20)).is_empty());
    assert_eq!(runner.state().relit, 1);
    assert_eq!(runner.state().delay.elapsed(), Duration::from_millis(20));
}

#[test]
fn stop_detaches_senders() {
    let mut runner = HeadlessRunner::new(Fuse {
        length: Duration::from_millis(10),
    });
    let sender = runner.sender();
    runner.stop();

    assert!(runner.is_stopped());
    assert!(!sender.send(FuseInput::Relight));
    assert!(runner.run_for(5, Duration::from_millis(10)).is_empty());
    assert_eq!(runner.frame(), 0);
}
