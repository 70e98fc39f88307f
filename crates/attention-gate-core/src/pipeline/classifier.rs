//! Direction classification and the attention rule.

use crate::domain::{Bounds, DirectionSet, Horizontal, RatioSet, ThresholdSet, Vertical};

/// Classifies each axis against its threshold pair.
///
/// Eye axes are disjunctive across both eyes: either eye crossing a bound
/// sets the label. The positive bound (Right/Down) is tested first.
#[must_use]
pub fn classify(ratios: &RatioSet, thresholds: &ThresholdSet) -> DirectionSet {
    DirectionSet {
        face_horizontal: horizontal(&[ratios.face_horizontal], thresholds.face_horizontal()),
        face_vertical: vertical(&[ratios.face_vertical], thresholds.face_vertical()),
        eye_horizontal: horizontal(&ratios.eye_horizontal(), thresholds.eye_horizontal()),
        eye_vertical: vertical(&ratios.eye_vertical(), thresholds.eye_vertical()),
    }
}

/// Decides whether a direction set counts as paying attention.
///
/// True when every axis is centred, or when the eyes compensate for the
/// head on any of the four opposing pairs.
#[must_use]
pub fn attention(directions: &DirectionSet) -> bool {
    use Horizontal::{Left, Right};
    use Vertical::{Down, Up};

    directions.is_centered()
        || matches!(
            (directions.face_vertical, directions.eye_vertical),
            (Up, Down) | (Down, Up)
        )
        || matches!(
            (directions.face_horizontal, directions.eye_horizontal),
            (Left, Right) | (Right, Left)
        )
}

/// Classifies and applies the attention rule in one step.
#[must_use]
pub fn is_attentive(ratios: &RatioSet, thresholds: &ThresholdSet) -> bool {
    attention(&classify(ratios, thresholds))
}

fn horizontal(values: &[f64], bounds: Bounds) -> Horizontal {
    if values.iter().any(|&v| v > bounds.high) {
        Horizontal::Right
    } else if values.iter().any(|&v| v < bounds.low) {
        Horizontal::Left
    } else {
        Horizontal::Center
    }
}

fn vertical(values: &[f64], bounds: Bounds) -> Vertical {
    if values.iter().any(|&v| v > bounds.high) {
        Vertical::Down
    } else if values.iter().any(|&v| v < bounds.low) {
        Vertical::Up
    } else {
        Vertical::Center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: ThresholdSet = ThresholdSet {
        face_horizontal_left: 0.4,
        face_horizontal_right: 0.6,
        face_vertical_up: 0.4,
        face_vertical_down: 0.6,
        eye_horizontal_left: 0.35,
        eye_horizontal_right: 0.65,
        eye_vertical_up: 0.35,
        eye_vertical_down: 0.65,
    };

    fn centered_ratios() -> RatioSet {
        RatioSet::from_fn(|_| 0.5)
    }

    fn directions(
        face_horizontal: Horizontal,
        face_vertical: Vertical,
        eye_horizontal: Horizontal,
        eye_vertical: Vertical,
    ) -> DirectionSet {
        DirectionSet {
            face_horizontal,
            face_vertical,
            eye_horizontal,
            eye_vertical,
        }
    }

    // === classify ===

    #[test]
    fn test_centered_ratios_classify_centered() {
        assert!(classify(&centered_ratios(), &THRESHOLDS).is_centered());
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let mut ratios = centered_ratios();
        ratios.face_horizontal = 0.6;
        ratios.face_vertical = 0.4;
        assert!(classify(&ratios, &THRESHOLDS).is_centered());
    }

    #[test]
    fn test_face_axes() {
        let mut ratios = centered_ratios();
        ratios.face_horizontal = 0.7;
        ratios.face_vertical = 0.2;
        let d = classify(&ratios, &THRESHOLDS);
        assert_eq!(d.face_horizontal, Horizontal::Right);
        assert_eq!(d.face_vertical, Vertical::Up);

        ratios.face_horizontal = 0.1;
        ratios.face_vertical = 0.9;
        let d = classify(&ratios, &THRESHOLDS);
        assert_eq!(d.face_horizontal, Horizontal::Left);
        assert_eq!(d.face_vertical, Vertical::Down);
    }

    #[test]
    fn test_either_eye_triggers_eye_label() {
        let mut ratios = centered_ratios();
        ratios.right_eye_horizontal = 0.2;
        assert_eq!(
            classify(&ratios, &THRESHOLDS).eye_horizontal,
            Horizontal::Left
        );

        let mut ratios = centered_ratios();
        ratios.left_eye_vertical = 0.8;
        assert_eq!(classify(&ratios, &THRESHOLDS).eye_vertical, Vertical::Down);
    }

    #[test]
    fn test_positive_bound_wins_when_eyes_disagree() {
        let mut ratios = centered_ratios();
        ratios.left_eye_horizontal = 0.1;
        ratios.right_eye_horizontal = 0.9;
        assert_eq!(
            classify(&ratios, &THRESHOLDS).eye_horizontal,
            Horizontal::Right
        );
    }

    #[test]
    fn test_classify_is_pure() {
        let mut ratios = centered_ratios();
        ratios.face_vertical = 0.9;
        let first = classify(&ratios, &THRESHOLDS);
        let _ = classify(&centered_ratios(), &THRESHOLDS);
        assert_eq!(classify(&ratios, &THRESHOLDS), first);
    }

    // === attention ===

    #[test]
    fn test_all_center_is_attentive() {
        assert!(attention(&DirectionSet::CENTERED));
    }

    #[test]
    fn test_compensation_pairs_are_attentive() {
        use Horizontal as H;
        use Vertical as V;

        assert!(attention(&directions(H::Center, V::Up, H::Center, V::Down)));
        assert!(attention(&directions(H::Center, V::Down, H::Center, V::Up)));
        assert!(attention(&directions(H::Left, V::Center, H::Right, V::Center)));
        assert!(attention(&directions(H::Right, V::Center, H::Left, V::Center)));
    }

    #[test]
    fn test_uncompensated_deviation_is_not_attentive() {
        use Horizontal as H;
        use Vertical as V;

        assert!(!attention(&directions(H::Left, V::Center, H::Center, V::Center)));
        assert!(!attention(&directions(H::Center, V::Center, H::Center, V::Down)));
        assert!(!attention(&directions(H::Left, V::Center, H::Left, V::Center)));
        assert!(!attention(&directions(H::Center, V::Up, H::Center, V::Up)));
    }

    #[test]
    fn test_only_enumerated_combinations_are_attentive() {
        use Horizontal as H;
        use Vertical as V;

        let hs = [H::Left, H::Center, H::Right];
        let vs = [V::Up, V::Center, V::Down];
        let mut attentive = 0;
        for fh in hs {
            for fv in vs {
                for eh in hs {
                    for ev in vs {
                        if attention(&directions(fh, fv, eh, ev)) {
                            attentive += 1;
                        }
                    }
                }
            }
        }
        // 1 all-center + 2 vertical pairs x 9 horizontal combos
        // + 2 horizontal pairs x 9 vertical combos - 4 double-compensated overlaps
        assert_eq!(attentive, 1 + 18 + 18 - 4);
    }

    #[test]
    fn test_is_attentive_combines_steps() {
        let mut ratios = centered_ratios();
        assert!(is_attentive(&ratios, &THRESHOLDS));

        ratios.face_horizontal = 0.2;
        assert!(!is_attentive(&ratios, &THRESHOLDS));

        ratios.left_eye_horizontal = 0.8;
        assert!(is_attentive(&ratios, &THRESHOLDS));
    }
}
