use crate::value::DocValue;

/// Fractional digits kept when no precision is configured.
pub const DEFAULT_PRECISION: u32 = 3;

/// Rounds `x` to `digits` fractional digits, ties to even.
///
/// The tie rule is applied to the exact binary value of `x`, not to its
/// shortest decimal spelling: `2.675` is stored slightly below the midpoint
/// and rounds to `2.67`, while `0.125` is an exact tie and rounds to `0.12`.
/// The decimal result is then read back as the nearest `f64`.
///
/// Non-finite inputs are returned unchanged. The sign of zero is kept, so
/// `-0.0001` rounds to `-0.0`.
pub fn round_half_even(x: f64, digits: u32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    // Fixed-precision formatting is correctly rounded with ties to even.
    let text = format!("{:.*}", digits as usize, x);
    text.parse().unwrap_or(x)
}

/// Returns a copy of `value` with every float leaf rounded to `digits`.
///
/// Integers, strings, booleans and nulls are copied as they are, and the
/// shape of the tree (keys, key order, sequence lengths) does not change.
pub fn normalize(value: &DocValue, digits: u32) -> DocValue {
    let mut out = value.clone();
    normalize_in_place(&mut out, digits);
    out
}

/// Rounds every float leaf of `value` to `digits` fractional digits.
///
/// Walks the tree with an explicit stack, so nesting depth is bounded only by
/// memory.
pub fn normalize_in_place(value: &mut DocValue, digits: u32) {
    let mut stack: Vec<&mut DocValue> = vec![value];
    while let Some(node) = stack.pop() {
        match node {
            DocValue::Float(x) => *x = round_half_even(*x, digits),
            DocValue::Sequence(items) => stack.extend(items.iter_mut()),
            DocValue::Mapping(map) => stack.extend(map.values_mut()),
            DocValue::Null
            | DocValue::Bool(_)
            | DocValue::Int(_)
            | DocValue::UInt(_)
            | DocValue::BigInt(_)
            | DocValue::Text(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> DocValue {
        DocValue::from_json_str(text).unwrap()
    }

    #[test]
    fn rounds_to_three_digits() {
        assert_eq!(round_half_even(1.23456, 3), 1.235);
        assert_eq!(round_half_even(-1.23456, 3), -1.235);
        assert_eq!(round_half_even(100.0, 3), 100.0);
    }

    #[test]
    fn exact_ties_go_to_even() {
        assert_eq!(round_half_even(0.125, 2), 0.12);
        assert_eq!(round_half_even(0.375, 2), 0.38);
        assert_eq!(round_half_even(2.5, 0), 2.0);
        assert_eq!(round_half_even(3.5, 0), 4.0);
        assert_eq!(round_half_even(-0.5, 0), -0.0);
    }

    #[test]
    fn decides_on_the_binary_value() {
        // 1.0005 and 2.675 are both stored just below the decimal midpoint.
        assert_eq!(round_half_even(1.0005, 3), 1.0);
        assert_eq!(round_half_even(2.675, 2), 2.67);
        // 2.0005 is stored just above it.
        assert_eq!(round_half_even(2.0005, 3), 2.001);
    }

    #[test]
    fn keeps_negative_zero() {
        let rounded = round_half_even(-0.0001, 3);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_negative());
        assert!(round_half_even(-0.0, 3).is_sign_negative());
    }

    #[test]
    fn non_finite_passes_through() {
        assert_eq!(round_half_even(f64::INFINITY, 3), f64::INFINITY);
        assert_eq!(round_half_even(f64::NEG_INFINITY, 3), f64::NEG_INFINITY);
        assert!(round_half_even(f64::NAN, 3).is_nan());
    }

    #[test]
    fn normalize_rounds_nested_floats_only() {
        let input = doc(r#"{"x": 1.23456, "n": 5, "s": "1.23456", "b": true, "z": null,
            "list": [0.1234, [9.87654, {"deep": -0.00049}]]}"#);
        let expected = doc(r#"{"x": 1.235, "n": 5, "s": "1.23456", "b": true, "z": null,
            "list": [0.123, [9.877, {"deep": -0.0}]]}"#);
        assert_eq!(normalize(&input, 3), expected);
    }

    #[test]
    fn integer_leaf_is_not_turned_into_float() {
        let out = normalize(&doc(r#"{"n": 5, "z": -0, "big": 123456789012345678901234567890}"#), 3);
        assert_eq!(out.get("n"), Some(&DocValue::Int(5)));
        assert_eq!(out.get("z"), Some(&DocValue::Int(0)));
        assert_eq!(
            out.get("big"),
            Some(&DocValue::BigInt("123456789012345678901234567890".to_string()))
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let input = doc(r#"[1.23456, {"a": 2.0005, "b": [0.0004999, 7.77777]}, 3]"#);
        let once = normalize(&input, 3);
        assert_eq!(normalize(&once, 3), once);
    }

    #[test]
    fn normalize_leaves_input_untouched() {
        let input = doc(r#"{"x": 1.23456}"#);
        let _ = normalize(&input, 3);
        assert_eq!(input.get("x"), Some(&DocValue::Float(1.23456)));
    }

    #[test]
    fn handles_very_deep_nesting() {
        let mut value = DocValue::Float(0.98765);
        for _ in 0..100_000 {
            value = DocValue::Sequence(vec![value]);
        }
        normalize_in_place(&mut value, 3);
        let mut cursor = &value;
        while let DocValue::Sequence(items) = cursor {
            cursor = &items[0];
        }
        assert_eq!(cursor, &DocValue::Float(0.988));
        // Unwind iteratively so the test does not overflow on drop.
        let mut next = Some(value);
        while let Some(DocValue::Sequence(mut items)) = next {
            next = items.pop();
        }
    }
}
