#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without a terminal and without a real
//! clock. Time starts at a fixed base instant and only moves through
//! [`advance`](ProgramSimulator::advance), which stops at every model
//! deadline on the way and delivers [`Event::Tick`] exactly at it, the same
//! way the real runtime wakes up for timers.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use altezza_runtime::simulator::ProgramSimulator;
//!
//! let mut sim = ProgramSimulator::new(|now| SplashModel::new(now, SplashConfig::default()));
//! sim.init();
//! sim.advance(Duration::from_millis(5000));
//! assert!(sim.capture_frame(80, 24).contains_text("¡No te vayas!"));
//! ```

use std::time::{Duration, Instant};

use altezza_core::event::Event;

use crate::frame::Frame;
use crate::program::{Cmd, Model};

/// Record of a command executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    /// Quit command.
    Quit,
    /// Message fed back into the model.
    Msg,
    /// Batch of commands.
    Batch(usize),
    /// Log line.
    Log(String),
    /// Notification cue.
    PlayCue,
    /// Link opened.
    OpenLink(String),
}

/// Virtual-time runner for [`Model`] tests.
pub struct ProgramSimulator<M: Model> {
    model: M,
    base: Instant,
    now: Instant,
    frames: Vec<Frame>,
    command_log: Vec<CmdRecord>,
    logs: Vec<String>,
    cues: Vec<Duration>,
    links: Vec<String>,
    ticks: usize,
    running: bool,
}

impl<M: Model> ProgramSimulator<M> {
    /// Build the model at the simulator's base instant.
    ///
    /// The model is not initialized until [`init`](Self::init) is called.
    pub fn new(build: impl FnOnce(Instant) -> M) -> Self {
        let base = Instant::now();
        Self {
            model: build(base),
            base,
            now: base,
            frames: Vec::new(),
            command_log: Vec::new(),
            logs: Vec::new(),
            cues: Vec::new(),
            links: Vec::new(),
            ticks: 0,
            running: true,
        }
    }

    /// Run `Model::init` at the current virtual instant.
    pub fn init(&mut self) {
        let cmd = self.model.init(self.now);
        self.execute_cmd(cmd);
    }

    /// Move virtual time forward by `by`, ticking at every deadline crossed.
    pub fn advance(&mut self, by: Duration) {
        let target = self.now + by;
        while self.running {
            match self.model.next_deadline() {
                Some(due) if due <= target => {
                    self.now = self.now.max(due);
                    self.ticks += 1;
                    self.dispatch(Event::Tick);
                }
                _ => break,
            }
        }
        self.now = self.now.max(target);
    }

    /// Move virtual time to `offset` after the base instant.
    ///
    /// Offsets in the past leave the clock where it is.
    pub fn advance_to(&mut self, offset: Duration) {
        let target = self.base + offset;
        let by = target.saturating_duration_since(self.now);
        self.advance(by);
    }

    /// Deliver terminal events at the current virtual instant.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            self.dispatch(event.clone());
        }
    }

    /// Deliver one terminal event at the current virtual instant.
    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Send a message straight to `update`.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg, self.now);
        self.execute_cmd(cmd);
    }

    /// Render the model into a fresh frame and keep it.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Frame {
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame, self.now);
        self.frames.push(frame);
        &self.frames[self.frames.len() - 1]
    }

    /// Most recently captured frame.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Number of frames captured.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Call `Model::teardown`, as the real runtime does on exit.
    pub fn teardown(&mut self) {
        self.model.teardown();
    }

    /// The model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The model, mutably.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Current virtual instant.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Virtual time since the base instant.
    pub fn elapsed(&self) -> Duration {
        self.now - self.base
    }

    /// Whether the model has not quit.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks delivered by [`advance`](Self::advance).
    pub fn tick_count(&self) -> usize {
        self.ticks
    }

    /// Virtual times (since base) at which the cue played.
    pub fn cues(&self) -> &[Duration] {
        &self.cues
    }

    /// Links the model asked to open.
    pub fn opened_links(&self) -> &[String] {
        &self.links
    }

    /// Lines emitted with `Cmd::Log`.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Every command executed, in order.
    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    fn dispatch(&mut self, event: Event) {
        let msg = M::Message::from(event);
        let cmd = self.model.update(msg, self.now);
        self.execute_cmd(cmd);
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for cmd in cmds {
                    self.execute_cmd(cmd);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m, self.now);
                self.execute_cmd(cmd);
            }
            Cmd::Log(text) => {
                self.command_log.push(CmdRecord::Log(text.clone()));
                self.logs.push(text);
            }
            Cmd::PlayCue => {
                self.command_log.push(CmdRecord::PlayCue);
                self.cues.push(self.elapsed());
            }
            Cmd::OpenLink(url) => {
                self.command_log.push(CmdRecord::OpenLink(url.clone()));
                self.links.push(url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Rgb, Style};
    use altezza_core::event::{KeyCode, KeyEvent};
    use altezza_core::timer::TimerRegistry;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Rings at fixed offsets and counts key presses.
    struct Alarm {
        timers: TimerRegistry<&'static str>,
        rang: Vec<(&'static str, Instant)>,
        keys: usize,
    }

    #[derive(Debug)]
    enum AlarmMsg {
        Tick,
        Key,
        Quit,
        Other,
    }

    impl From<Event> for AlarmMsg {
        fn from(event: Event) -> Self {
            match event {
                Event::Tick => Self::Tick,
                Event::Key(k) if k.is_char('q') => Self::Quit,
                Event::Key(_) => Self::Key,
                _ => Self::Other,
            }
        }
    }

    impl Alarm {
        fn new(now: Instant) -> Self {
            let mut timers = TimerRegistry::new();
            timers.schedule(now, ms(300), "b");
            timers.schedule(now, ms(100), "a");
            timers.schedule(now, ms(300), "c");
            Self {
                timers,
                rang: Vec::new(),
                keys: 0,
            }
        }
    }

    impl Model for Alarm {
        type Message = AlarmMsg;

        fn update(&mut self, msg: AlarmMsg, now: Instant) -> Cmd<AlarmMsg> {
            match msg {
                AlarmMsg::Tick => {
                    let mut cmds = Vec::new();
                    for (_, name) in self.timers.drain_due(now) {
                        self.rang.push((name, now));
                        cmds.push(Cmd::PlayCue);
                    }
                    Cmd::batch(cmds)
                }
                AlarmMsg::Key => {
                    self.keys += 1;
                    Cmd::log(format!("keys={}", self.keys))
                }
                AlarmMsg::Quit => Cmd::quit(),
                AlarmMsg::Other => Cmd::none(),
            }
        }

        fn view(&self, frame: &mut Frame, _now: Instant) {
            frame.clear(Rgb::BLACK);
            frame.put_str(0, 0, &format!("rang {}", self.rang.len()), Style::fg(Rgb::WHITE));
        }

        fn next_deadline(&self) -> Option<Instant> {
            self.timers.next_deadline()
        }

        fn teardown(&mut self) {
            self.timers.cancel_all();
        }
    }

    #[test]
    fn advance_stops_at_each_deadline() {
        let mut sim = ProgramSimulator::new(Alarm::new);
        sim.init();
        let base = sim.now();
        sim.advance(ms(1000));

        let rang: Vec<_> = sim.model().rang.iter().map(|&(n, at)| (n, at - base)).collect();
        assert_eq!(rang, vec![("a", ms(100)), ("b", ms(300)), ("c", ms(300))]);
        assert_eq!(sim.tick_count(), 2);
        assert_eq!(sim.cues(), &[ms(100), ms(300), ms(300)]);
        assert_eq!(sim.elapsed(), ms(1000));
    }

    #[test]
    fn advance_short_of_deadline_fires_nothing() {
        let mut sim = ProgramSimulator::new(Alarm::new);
        sim.advance(ms(99));
        assert!(sim.model().rang.is_empty());
        sim.advance_to(ms(100));
        assert_eq!(sim.model().rang.len(), 1);
    }

    #[test]
    fn events_and_logs() {
        let mut sim = ProgramSimulator::new(Alarm::new);
        sim.inject_event(Event::Key(KeyEvent::new(KeyCode::Char('x'))));
        assert_eq!(sim.logs(), &["keys=1".to_owned()]);
        sim.inject_event(Event::Key(KeyEvent::new(KeyCode::Char('q'))));
        assert!(!sim.is_running());
        sim.inject_event(Event::Key(KeyEvent::new(KeyCode::Char('x'))));
        assert_eq!(sim.model().keys, 1, "events after quit are dropped");
    }

    #[test]
    fn capture_frame_renders_at_virtual_now() {
        let mut sim = ProgramSimulator::new(Alarm::new);
        sim.advance(ms(150));
        assert!(sim.capture_frame(10, 1).contains_text("rang 1"));
        assert_eq!(sim.frame_count(), 1);
    }

    #[test]
    fn teardown_clears_deadlines() {
        let mut sim = ProgramSimulator::new(Alarm::new);
        sim.teardown();
        assert!(sim.model().next_deadline().is_none());
        sim.advance(ms(1000));
        assert_eq!(sim.tick_count(), 0);
        assert!(sim.model_mut().timers.is_empty());
    }
}
