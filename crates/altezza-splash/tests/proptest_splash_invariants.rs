//! Property tests for the splash timing invariants, run through the full
//! model and the virtual-time simulator.

use std::time::Duration;

use altezza_core::event::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};
use altezza_core::sequencer::SCRIPT;
use altezza_core::vibrant::VisualMode;
use altezza_runtime::ProgramSimulator;
use altezza_splash::app::{SplashConfig, SplashModel};
use proptest::prelude::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn splash() -> ProgramSimulator<SplashModel> {
    let config = SplashConfig {
        background: altezza_core::background::BackgroundConfig {
            seed: Some(1),
            ..Default::default()
        },
        ..SplashConfig::default()
    };
    let mut sim = ProgramSimulator::new(|now| SplashModel::new(now, config));
    sim.init();
    sim
}

fn click(sim: &mut ProgramSimulator<SplashModel>, kind: MouseEventKind) {
    let hit = sim.model().layout(sim.now()).logo_hit;
    sim.inject_event(Event::Mouse(MouseEvent::new(kind, hit.x + 1, hit.y + 1)));
}

fn key(sim: &mut ProgramSimulator<SplashModel>, key: KeyEvent) {
    sim.inject_event(Event::Key(key));
}

proptest! {
    #[test]
    fn vibrant_triggers_iff_hold_reaches_threshold(
        holds in prop::collection::vec((0u64..4000, 1u64..3000), 1..8),
    ) {
        let mut sim = splash();
        let mut expected = 0;
        for (held, gap) in holds {
            click(&mut sim, MouseEventKind::Down(MouseButton::Left));
            sim.advance(ms(held));
            click(&mut sim, MouseEventKind::Up(MouseButton::Left));
            if held >= 2000 {
                expected += 1;
            }
            sim.advance(ms(gap));
        }
        prop_assert_eq!(sim.model().press().completions(), expected);
        prop_assert_eq!(sim.model().vibrant().activations(), expected);
        prop_assert!(sim.model().press().pending_timers() <= 1);
    }

    #[test]
    fn repeated_chords_revert_once_after_last(
        gaps in prop::collection::vec(0u64..10_000, 1..6),
    ) {
        let mut sim = splash();
        let chord = KeyEvent::new(KeyCode::Char('r')).with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        for gap in gaps {
            sim.advance(ms(gap));
            key(&mut sim, chord);
            prop_assert_eq!(sim.model().vibrant().pending_timers(), 1);
        }
        sim.advance(ms(9999));
        prop_assert_eq!(sim.model().mode(), VisualMode::Vibrant);
        prop_assert_eq!(sim.model().vibrant().reverts(), 0);
        sim.advance(ms(1));
        prop_assert_eq!(sim.model().mode(), VisualMode::Default);
        prop_assert_eq!(sim.model().vibrant().reverts(), 1);
    }

    #[test]
    fn close_then_reopen_always_replays(
        open_for in 0u64..9000,
        closed_for in 0u64..5000,
    ) {
        let mut sim = splash();
        key(&mut sim, KeyEvent::new(KeyCode::Enter));
        sim.advance(ms(open_for));

        let shown: Vec<u32> = sim.model().assistant().visible_messages().iter().map(|m| m.id).collect();
        let due: Vec<u32> = SCRIPT.iter().filter(|m| m.offset <= ms(open_for)).map(|m| m.id).collect();
        prop_assert_eq!(shown, due);

        key(&mut sim, KeyEvent::new(KeyCode::Escape));
        sim.advance(ms(closed_for));
        prop_assert!(sim.model().assistant().visible_messages().is_empty());

        key(&mut sim, KeyEvent::new(KeyCode::Enter));
        sim.advance(ms(7500));
        let replayed: Vec<u32> = sim.model().assistant().visible_messages().iter().map(|m| m.id).collect();
        prop_assert_eq!(replayed, vec![1, 2, 3]);
    }
}
