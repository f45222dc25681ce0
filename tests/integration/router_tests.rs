//! Buttons end to end: press counters → poller → router → rotation state.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use statusboard::app::rotation::{ManualAction, RotationHandle};
use statusboard::app::router::{Button, ButtonEventRouter};
use statusboard::drivers::button::{ButtonLine, PressCounter, spawn_poller};

const POLL: Duration = Duration::from_millis(2);

struct Rig {
    rotation: RotationHandle,
    counters: [Arc<PressCounter>; 3],
    stop: Arc<AtomicBool>,
    rearms: Arc<AtomicUsize>,
    poller: thread::JoinHandle<()>,
    dispatcher: thread::JoinHandle<u64>,
}

fn rig(len: usize) -> Rig {
    let rotation = RotationHandle::new(NonZeroUsize::new(len).unwrap());
    let counters = [
        Arc::new(PressCounter::new()),
        Arc::new(PressCounter::new()),
        Arc::new(PressCounter::new()),
    ];
    let router = ButtonEventRouter::new(rotation.clone());
    let lines: Vec<ButtonLine> = Button::ALL
        .iter()
        .zip(&counters)
        .zip(["A", "B", "C"])
        .map(|((&button, counter), name)| {
            let mut line = ButtonLine::new(name, counter.clone());
            router.bind(button, &mut line);
            line
        })
        .collect();

    let stop = Arc::new(AtomicBool::new(false));
    let rearms = Arc::new(AtomicUsize::new(0));
    let poller = {
        let stop = stop.clone();
        let rearms = rearms.clone();
        spawn_poller(
            lines,
            POLL,
            move || stop.load(Ordering::Acquire),
            Some(Box::new(move || {
                rearms.fetch_add(1, Ordering::AcqRel);
            })),
        )
        .unwrap()
    };
    let dispatcher = router.spawn().unwrap();
    Rig {
        rotation,
        counters,
        stop,
        rearms,
        poller,
        dispatcher,
    }
}

impl Rig {
    fn wait_for_epoch(&self, epoch: u64) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.rotation.snapshot().epoch < epoch {
            assert!(Instant::now() < deadline, "presses never reached the rotation");
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Stop the poller; its handlers hold the last senders, so the
    /// dispatcher follows. Returns presses the dispatcher applied.
    fn finish(self) -> u64 {
        self.stop.store(true, Ordering::Release);
        self.poller.join().unwrap();
        self.dispatcher.join().unwrap()
    }
}

#[test]
fn each_button_drives_its_transition() {
    let rig = rig(4);

    rig.counters[0].press();
    rig.wait_for_epoch(1);
    assert_eq!(rig.rotation.snapshot().index, 1);

    rig.counters[2].press();
    rig.wait_for_epoch(2);
    assert_eq!(rig.rotation.snapshot().index, 0);

    rig.counters[1].press();
    rig.wait_for_epoch(3);
    let s = rig.rotation.snapshot();
    assert!(s.paused);
    assert_eq!(s.last_action, Some(ManualAction::TogglePause));

    assert_eq!(rig.finish(), 3);
}

#[test]
fn burst_of_presses_is_not_merged() {
    let rig = rig(4);
    // Five presses land between two poll rounds at most; each still counts.
    for _ in 0..5 {
        rig.counters[0].press();
    }
    rig.wait_for_epoch(5);
    assert_eq!(rig.rotation.snapshot().index, 1);
    let rearms = rig.rearms.clone();
    assert_eq!(rig.finish(), 5);
    assert!(rearms.load(Ordering::Acquire) >= 1);
}

#[test]
fn presses_from_several_threads_all_apply() {
    let rig = rig(3);
    let pressers: Vec<_> = rig
        .counters
        .iter()
        .map(|c| {
            let c = c.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    c.press();
                }
            })
        })
        .collect();
    for p in pressers {
        p.join().unwrap();
    }
    rig.wait_for_epoch(60);
    let s = rig.rotation.snapshot();
    // 20 forward and 20 back cancel; 20 toggles leave it running.
    assert_eq!((s.index, s.paused, s.epoch), (0, false, 60));
    assert_eq!(rig.finish(), 60);
}

#[test]
fn bounced_edges_never_reach_the_rotation() {
    let rig = rig(4);
    assert!(rig.counters[0].record(1_000));
    assert!(!rig.counters[0].record(1_020));
    assert!(!rig.counters[0].record(1_045));
    rig.wait_for_epoch(1);
    // Give the poller a few more rounds to prove nothing else arrives.
    thread::sleep(POLL * 10);
    assert_eq!(rig.rotation.snapshot().epoch, 1);
    assert_eq!(rig.finish(), 1);
}

#[test]
fn shutdown_stops_dispatcher_with_senders_alive() {
    let rig = rig(2);
    rig.rotation.request_shutdown();
    // The poller still owns the bound handlers, so only the shutdown flag
    // can end the dispatcher here.
    let Rig {
        stop,
        poller,
        dispatcher,
        ..
    } = rig;
    assert_eq!(dispatcher.join().unwrap(), 0);
    stop.store(true, Ordering::Release);
    poller.join().unwrap();
}
