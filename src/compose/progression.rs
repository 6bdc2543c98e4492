// Chord Progression - Scale degrees to voiced chords
// Builds chords from genre chord tables, shapes them per genre, then randomly inverts

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::theory::{ChordRules, Genre, Pitch, Scale};

/// Simultaneously sounding pitches, lowest voice first
pub type Chord = Vec<Pitch>;

/// Ordered chords spanning a section
pub type Progression = Vec<Chord>;

/// Number of chords drawn when no explicit progression is given
pub const DEFAULT_PROGRESSION_LENGTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    #[error("Chord '{label}' is not defined for genre {genre}")]
    UnknownChord { genre: Genre, label: String },
}

/// Generate a chord progression for a scale and genre.
///
/// With no labels (or an empty list), draws four chord labels with
/// replacement from the genre's chord table. Each chord is shaped by the
/// genre rules and then passed through the random inversion step.
pub fn generate_progression(
    scale: &Scale,
    genre: Genre,
    labels: Option<&[String]>,
    rng: &mut impl Rng,
) -> Result<Progression, ProgressionError> {
    let degree_sets: Vec<&'static [usize]> = match labels {
        Some(labels) if !labels.is_empty() => labels
            .iter()
            .map(|label| {
                genre.chord_degrees(label).ok_or_else(|| ProgressionError::UnknownChord {
                    genre,
                    label: label.clone(),
                })
            })
            .collect::<Result<_, _>>()?,
        _ => {
            let table = genre.chord_table();
            (0..DEFAULT_PROGRESSION_LENGTH)
                .filter_map(|_| table.choose(rng).map(|(_, degrees)| *degrees))
                .collect()
        }
    };

    let rules = genre.chord_rules();
    let progression = degree_sets
        .into_iter()
        .map(|degrees| {
            let mut chord = build_chord(scale, degrees);
            shape_chord(&mut chord, &rules, rng);
            invert_randomly(chord, rng)
        })
        .collect();

    Ok(progression)
}

/// Stack scale degrees into a chord. Degrees wrap modulo the scale length.
pub fn build_chord(scale: &Scale, degrees: &[usize]) -> Chord {
    degrees.iter().map(|&degree| scale.degree(degree)).collect()
}

/// Apply a genre's chord rules in place.
///
/// Order: triad truncation, power-chord collapse, forced intervals,
/// Bernoulli extensions, then at most one suspension replacing the third.
pub fn shape_chord(chord: &mut Chord, rules: &ChordRules, rng: &mut impl Rng) {
    let Some(&root) = chord.first() else {
        return;
    };

    if rules.triad_only {
        chord.truncate(3);
    }

    if rules.power_chord {
        chord.clear();
        chord.extend([root, root + 7]);
    }

    chord.extend(rules.added.iter().map(|&interval| root + interval));

    for extension in rules.extensions {
        if rng.gen::<f64>() > extension.threshold {
            chord.push(root + extension.interval);
        }
    }

    for suspension in rules.suspensions {
        if rng.gen::<f64>() > suspension.threshold {
            if chord.len() > 1 {
                chord[1] = root + suspension.interval;
            }
            break;
        }
    }
}

/// Randomly rotate the lowest notes up an octave.
///
/// Two sequential coin flips: the first selects first inversion; only if
/// it fails is the second flipped for second inversion.
pub fn invert_randomly(chord: Chord, rng: &mut impl Rng) -> Chord {
    if rng.gen::<f64>() > 0.5 {
        first_inversion(&chord)
    } else if rng.gen::<f64>() > 0.5 {
        second_inversion(&chord)
    } else {
        chord
    }
}

/// Drop the lowest note and re-add it an octave higher
pub fn first_inversion(chord: &[Pitch]) -> Chord {
    match chord.split_first() {
        Some((&lowest, rest)) => {
            let mut inverted = rest.to_vec();
            inverted.push(lowest + 12);
            inverted
        }
        None => Vec::new(),
    }
}

/// Drop the two lowest notes and re-add both an octave higher
pub fn second_inversion(chord: &[Pitch]) -> Chord {
    if chord.len() < 2 {
        return first_inversion(chord);
    }
    let mut inverted = chord[2..].to_vec();
    inverted.push(chord[0] + 12);
    inverted.push(chord[1] + 12);
    inverted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::resolve;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_chord() {
        let scale = resolve("C", "Major").unwrap();
        assert_eq!(build_chord(&scale, &[0, 2, 4]), vec![60, 64, 67]);
        // vi wraps past the scale end: A C E
        assert_eq!(build_chord(&scale, &[5, 0, 2]), vec![69, 60, 64]);
    }

    #[test]
    fn test_degrees_alias_on_short_scales() {
        let scale = resolve("C", "Pentatonic Major").unwrap();
        // Rock bVII uses degrees 6, 8, 10 which wrap on a five-note scale
        assert_eq!(build_chord(&scale, &[6, 8, 10]), vec![62, 67, 60]);
    }

    #[test]
    fn test_rock_power_chord() {
        let scale = resolve("C", "Major").unwrap();
        let rules = Genre::Rock.chord_rules();

        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut chord = build_chord(&scale, &[0, 2, 4]);
            assert_eq!(chord, vec![60, 64, 67]);

            shape_chord(&mut chord, &rules, &mut rng);
            assert_eq!(&chord[..2], &[60, 67]);
            assert!(chord.len() == 2 || chord == vec![60, 67, 72]);
        }
    }

    #[test]
    fn test_blues_always_has_seventh() {
        let scale = resolve("C", "Major").unwrap();
        let rules = Genre::Blues.chord_rules();

        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut chord = build_chord(&scale, &[0, 2, 4]);
            shape_chord(&mut chord, &rules, &mut rng);
            assert_eq!(&chord[..4], &[60, 64, 67, 70]);
        }
    }

    #[test]
    fn test_classical_stays_triad() {
        let scale = resolve("C", "Major").unwrap();
        let rules = Genre::Classical.chord_rules();
        let mut saw_suspension = false;

        for seed in 0..100 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut chord = build_chord(&scale, &[0, 2, 4]);
            shape_chord(&mut chord, &rules, &mut rng);
            assert_eq!(chord.len(), 3);
            assert!(chord[1] == 64 || chord[1] == 65);
            saw_suspension |= chord[1] == 65;
        }
        assert!(saw_suspension);
    }

    #[test]
    fn test_jazz_extensions_are_cumulative() {
        let scale = resolve("C", "Major").unwrap();
        let rules = Genre::Jazz.chord_rules();

        for seed in 0..100 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut chord = build_chord(&scale, &[0, 2, 4]);
            shape_chord(&mut chord, &rules, &mut rng);
            assert!(chord.len() >= 3 && chord.len() <= 6);
            assert!(chord[3..].iter().all(|p| [70, 74, 81].contains(p)));
        }
    }

    #[test]
    fn test_pop_seventh_and_suspensions() {
        let scale = resolve("C", "Major").unwrap();
        let rules = Genre::Pop.chord_rules();
        let mut saw_seventh = false;
        let mut saw_suspension = false;

        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut chord = build_chord(&scale, &[0, 2, 4]);
            shape_chord(&mut chord, &rules, &mut rng);

            assert!(chord.len() == 3 || chord.len() == 4);
            assert_eq!((chord[0], chord[2]), (60, 67));
            assert!([64, 62, 65].contains(&chord[1]));
            assert!(chord[3..].iter().all(|&p| p == 70));
            saw_seventh |= chord.len() == 4;
            saw_suspension |= chord[1] != 64;
        }
        assert!(saw_seventh);
        assert!(saw_suspension);
    }

    #[test]
    fn test_electronic_sevenths_and_ninths() {
        let scale = resolve("C", "Major").unwrap();
        let rules = Genre::Electronic.chord_rules();
        let mut saw_ninth = false;

        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut chord = build_chord(&scale, &[0, 2, 4]);
            shape_chord(&mut chord, &rules, &mut rng);

            assert!(chord.len() >= 3 && chord.len() <= 5);
            assert_eq!(&chord[..3], &[60, 64, 67]);
            assert!(chord[3..].iter().all(|p| [71, 73].contains(p)));
            saw_ninth |= chord.contains(&73);
        }
        assert!(saw_ninth);
    }

    #[test]
    fn test_folk_adds_sixth() {
        let scale = resolve("C", "Major").unwrap();
        let rules = Genre::Folk.chord_rules();
        let mut saw_sixth = false;

        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut chord = build_chord(&scale, &[0, 2, 4]);
            shape_chord(&mut chord, &rules, &mut rng);

            assert!(chord == vec![60, 64, 67] || chord == vec![60, 64, 67, 69]);
            saw_sixth |= chord.len() == 4;
        }
        assert!(saw_sixth);
    }

    #[test]
    fn test_hiphop_truncates_before_extending() {
        let rules = Genre::HipHop.chord_rules();

        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut chord = vec![60, 64, 67, 71];
            shape_chord(&mut chord, &rules, &mut rng);

            assert!(chord.len() >= 3 && chord.len() <= 5);
            assert_eq!(&chord[..3], &[60, 64, 67]);
            assert!(!chord.contains(&71));
            assert!(chord[3..].iter().all(|p| [70, 74].contains(p)));
        }
    }

    #[test]
    fn test_inversions() {
        assert_eq!(first_inversion(&[60, 64, 67]), vec![64, 67, 72]);
        assert_eq!(second_inversion(&[60, 64, 67]), vec![67, 72, 76]);
        assert_eq!(second_inversion(&[60, 67]), vec![72, 79]);
    }

    #[test]
    fn test_inversion_preserves_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let inverted = invert_randomly(vec![60, 64, 67, 70], &mut rng);
            assert_eq!(inverted.len(), 4);
        }
    }

    #[test]
    fn test_explicit_progression_length() {
        let scale = resolve("C", "Major").unwrap();

        for genre in Genre::ALL {
            let table = genre.chord_table();
            let chosen: Vec<String> = (0..4).map(|i| table[i % table.len()].0.to_string()).collect();

            let mut rng = ChaCha8Rng::seed_from_u64(3);
            let progression = generate_progression(&scale, genre, Some(&chosen), &mut rng).unwrap();
            assert_eq!(progression.len(), 4, "{}", genre);
            let min_len = if genre == Genre::Rock { 2 } else { 3 };
            assert!(progression.iter().all(|chord| chord.len() >= min_len), "{}", genre);
        }
    }

    #[test]
    fn test_random_progression_has_four_chords() {
        let scale = resolve("A", "Mixolydian").unwrap();
        for genre in Genre::ALL {
            let mut rng = ChaCha8Rng::seed_from_u64(11);
            let progression = generate_progression(&scale, genre, None, &mut rng).unwrap();
            assert_eq!(progression.len(), DEFAULT_PROGRESSION_LENGTH);

            let empty: Vec<String> = Vec::new();
            let progression = generate_progression(&scale, genre, Some(&empty), &mut rng).unwrap();
            assert_eq!(progression.len(), DEFAULT_PROGRESSION_LENGTH);
        }
    }

    #[test]
    fn test_unknown_chord_label() {
        let scale = resolve("C", "Major").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = generate_progression(&scale, Genre::Pop, Some(&labels(&["I", "bVII"])), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            ProgressionError::UnknownChord {
                genre: Genre::Pop,
                label: "bVII".to_string()
            }
        );
    }
}
