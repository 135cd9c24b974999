//! Timing properties of the interpreter — exact rational time, layer firing
//! order and the error taxonomy, checked through the public API.

use assert_approx_eq::assert_approx_eq;
use num_rational::Ratio;
use swara::dsl::{Compiler, ErrorKind};
use swara::event::{Layer, Time, PERCUSSION_TRACK};
use swara::layer::{BeatPattern, ChordCycle, BASS_DRUM};

/// Deterministic note mix covering karve, groups and speed changes.
fn long_document(notes: usize) -> (String, Ratio<u64>) {
    let mut src = String::new();
    let mut expected = Ratio::from_integer(0u64);
    let mut speed = 0i32;
    for i in 0..notes {
        let karve = (i % 3) as u64;
        let marks = ",".repeat(karve as usize);
        let scale = |r: Ratio<u64>| {
            if speed >= 0 {
                r / 2u64.pow(speed as u32)
            } else {
                r * 2u64.pow(speed.unsigned_abs())
            }
        };
        match i % 5 {
            0 => {
                src.push_str(&format!("S{marks} "));
                expected += scale(Ratio::from_integer(1 + karve));
            }
            1 => {
                src.push_str(&format!("(R{marks}) "));
                expected += scale(Ratio::new(1 + karve, 2));
            }
            2 => {
                src.push_str(&format!("<G{marks}> "));
                expected += scale(Ratio::new(2 * (1 + karve), 3));
            }
            3 => {
                src.push_str(&format!("((P{marks})) "));
                expected += scale(Ratio::new(1 + karve, 4));
            }
            _ => {
                src.push_str(&format!("D{marks} "));
                expected += scale(Ratio::from_integer(1 + karve));
                // Walk the speed level through -1..=2.
                if i % 20 < 10 && speed < 2 {
                    src.push('+');
                    speed += 1;
                } else if speed > -1 {
                    src.push('-');
                    speed -= 1;
                }
            }
        }
        if i % 16 == 15 {
            src.push_str("|\n");
        }
    }
    (src, expected)
}

// =============================================================================
// Exact cumulative time
// =============================================================================

#[test]
fn thousand_notes_sum_exactly() {
    let (src, expected) = long_document(1200);
    let piece = Compiler::compile(&src, 0).unwrap();

    let melody: Vec<_> = piece.events.layer(Layer::Melody).collect();
    assert_eq!(melody.len(), 1200);
    assert_eq!(piece.duration.ratio(), expected);

    let summed: Time = melody.iter().map(|e| e.duration).sum();
    assert_eq!(summed.ratio(), expected);

    // Each note starts exactly where the previous one ended.
    for pair in melody.windows(2) {
        assert_eq!(pair[0].time + pair[0].duration, pair[1].time);
    }
}

#[test]
fn float_view_agrees_with_exact_time() {
    let piece = Compiler::compile("S,, (S,,) <S> + S", 0).unwrap();
    // 3 + 1.5 + 2/3 + 0.5 units, four units to the quarter
    assert_approx_eq!(piece.duration.as_quarters_f64(), (3.0 + 1.5 + 2.0 / 3.0 + 0.5) / 4.0);
}

// =============================================================================
// Durations
// =============================================================================

#[test]
fn karve_and_bracket() {
    let piece = Compiler::compile("S,, (S,,)", 0).unwrap();
    let durations: Vec<Time> = piece.events.events().iter().map(|e| e.duration).collect();
    assert_eq!(durations, vec![Time::from_units(3), Time::from_fraction(3, 2)]);
}

#[test]
fn speed_markers() {
    let piece = Compiler::compile("+S +S -S", 0).unwrap();
    let durations: Vec<Time> = piece.events.events().iter().map(|e| e.duration).collect();
    assert_eq!(
        durations,
        vec![
            Time::from_fraction(1, 2),
            Time::from_fraction(1, 4),
            Time::from_fraction(1, 2)
        ]
    );
}

// =============================================================================
// Beat patterns
// =============================================================================

#[test]
fn pattern_fires_on_active_slots() {
    let mut beat = BeatPattern::new(4, [0, 2], BASS_DRUM).unwrap();
    let fired: Vec<u32> = (0..8)
        .filter(|_| {
            let hit = beat.should_play();
            beat.tick();
            hit
        })
        .collect();
    assert_eq!(fired, vec![0, 2, 4, 6]);
}

#[test]
fn interpreted_pattern_matches_engine() {
    let piece = Compiler::compile("[beat:b:X.X.] S S S S S S S S", 0).unwrap();
    let hits: Vec<u64> = piece
        .events
        .track(PERCUSSION_TRACK)
        .map(|e| e.time.floor_units())
        .collect();
    assert_eq!(hits, vec![0, 2, 4, 6]);
}

#[test]
fn percussion_is_time_ordered_with_many_patterns() {
    let (body, _) = long_document(300);
    let src = format!("[beat:a:X..][beat:b:.X:38][beat:c:X.X.X:42] {body}");
    let piece = Compiler::compile(&src, 0).unwrap();
    let hits: Vec<Time> = piece.events.track(PERCUSSION_TRACK).map(|e| e.time).collect();
    assert!(!hits.is_empty());
    assert!(hits.windows(2).all(|w| w[0] <= w[1]));
}

// =============================================================================
// Chord cycles
// =============================================================================

#[test]
fn chord_cycle_order() {
    let piece = Compiler::compile("[chord:c:S G P] R R R R R R", 0).unwrap();
    let pitches: Vec<i32> = piece.events.layer(Layer::Chord).map(|e| e.pitch).collect();
    assert_eq!(pitches, vec![60, 64, 67, 60, 64, 67]);
}

#[test]
fn chord_engine_steps_by_elapsed_units() {
    let mut chord = ChordCycle::new();
    for pitch in [0, 4, 7] {
        chord.push(swara::event::Note {
            pitch_shift: pitch,
            octave_shift: 0,
            duration: Time::UNIT,
        });
    }
    let mut seen = Vec::new();
    for _ in 0..6 {
        seen.push(chord.index().unwrap());
        chord.advance(Time::from_fraction(1, 2));
    }
    assert_eq!(seen, vec![0, 0, 1, 1, 2, 2]);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn duplicate_and_unknown_names() {
    let dup = Compiler::compile("[beat:a:X] [beat:a:X]", 0).unwrap_err();
    assert_eq!(dup.kind, ErrorKind::DuplicateName);
    let unknown = Compiler::compile("[stop:a]", 0).unwrap_err();
    assert_eq!(unknown.kind, ErrorKind::UnknownName);
}

#[test]
fn syntax_errors() {
    for src in [
        "S (R",
        "S R)",
        "[beat:a:]",
        "[tala:a]",
        "S # R",
        "(S [stop:a])",
        "[chord:c:(+S)] S",
    ] {
        let err = Compiler::compile(src, 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax, "source: {src}");
    }
}

#[test]
fn unrepresentable_time_is_range_error() {
    let too_fine = "+".repeat(63) + "S <S>";
    let too_deep = "(".repeat(64) + "S" + &")".repeat(64);
    let too_many_ticks = "[beat:b:X] ".to_string() + &"-".repeat(30) + "S";
    for src in [too_fine, too_deep, too_many_ticks] {
        let err = Compiler::compile(&src, 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Range, "source: {src}");
    }
}
