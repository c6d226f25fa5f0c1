//! Property tests for the per-tick key state machine.

use cellwin::keys::code;
use cellwin::{KeyState, KeyStateTable};
use proptest::prelude::*;

fn tick(table: &mut KeyStateTable, keys: &[i32]) {
    table.begin_tick();
    for &key in keys {
        table.sample(key);
    }
    table.end_tick();
}

fn tracked_key() -> impl Strategy<Value = i32> {
    prop_oneof![0i32..=127, code::DOWN..=code::RIGHT, code::F1..=code::F12]
}

proptest! {
    /// N held ticks read Down then Pressed, one Up on release, then Released.
    #[test]
    fn held_key_sequence(key in tracked_key(), held in 1usize..20, idle in 2usize..6) {
        let mut table = KeyStateTable::new();
        let mut seen = Vec::new();
        for _ in 0..held {
            tick(&mut table, &[key]);
            seen.push(table.get_key_state(key));
        }
        for _ in 0..idle {
            tick(&mut table, &[]);
            seen.push(table.get_key_state(key));
        }

        let mut expected = vec![KeyState::Down];
        expected.extend(std::iter::repeat(KeyState::Pressed).take(held - 1));
        expected.push(KeyState::Up);
        expected.extend(std::iter::repeat(KeyState::Released).take(idle - 1));
        prop_assert_eq!(seen, expected);
    }

    /// Each state is determined by this tick's and the previous tick's samples.
    #[test]
    fn state_depends_on_two_ticks(pattern in prop::collection::vec(any::<bool>(), 1..40)) {
        let key = 'x' as i32;
        let mut table = KeyStateTable::new();
        let mut previous = false;
        for sampled in pattern {
            let keys: &[i32] = if sampled { &[key, key] } else { &[] };
            tick(&mut table, keys);
            let expected = match (previous, sampled) {
                (false, true) => KeyState::Down,
                (true, true) => KeyState::Pressed,
                (true, false) => KeyState::Up,
                (false, false) => KeyState::Released,
            };
            prop_assert_eq!(table.get_key_state(key), expected);
            previous = sampled;
        }
    }

    /// Sampling one key never disturbs another.
    #[test]
    fn keys_are_independent(a in tracked_key(), b in tracked_key(), ticks in 1usize..10) {
        prop_assume!(a != b);
        let mut table = KeyStateTable::new();
        for _ in 0..ticks {
            tick(&mut table, &[a]);
        }
        prop_assert_eq!(table.get_key_state(b), KeyState::Released);
    }

    #[test]
    fn untracked_keys_stay_released(key in any::<i32>()) {
        prop_assume!(!KeyStateTable::is_tracked(key));
        let mut table = KeyStateTable::new();
        tick(&mut table, &[key]);
        prop_assert_eq!(table.get_key_state(key), KeyState::Released);
    }
}
