//! Kitchen weight conversion between grams, ounces, and pounds.
//!
//! [`convert`] never fails. Input is read the way a lenient text field
//! reads it: leading whitespace is skipped and the longest numeric prefix is
//! used, so `"12abc"` converts as 12. Input with no numeric prefix gives an
//! empty [`Conversion`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const GRAMS_PER_OUNCE: f64 = 28.3495;
const GRAMS_PER_POUND: f64 = 453.592;
const OUNCES_PER_GRAM: f64 = 0.035274;
const POUNDS_PER_GRAM: f64 = 0.00220462;
const OUNCES_PER_POUND: f64 = 16.0;
const POUNDS_PER_OUNCE: f64 = 0.0625;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Grams,
    Ounces,
    Pounds,
}

impl WeightUnit {
    pub const ALL: [WeightUnit; 3] = [WeightUnit::Grams, WeightUnit::Ounces, WeightUnit::Pounds];

    pub fn symbol(&self) -> &'static str {
        match self {
            WeightUnit::Grams => "g",
            WeightUnit::Ounces => "oz",
            WeightUnit::Pounds => "lb",
        }
    }

    /// Multiplier taking a value in `self` to a value in `to`.
    fn factor(self, to: WeightUnit) -> f64 {
        use WeightUnit::*;
        match (self, to) {
            (Grams, Ounces) => OUNCES_PER_GRAM,
            (Grams, Pounds) => POUNDS_PER_GRAM,
            (Ounces, Grams) => GRAMS_PER_OUNCE,
            (Ounces, Pounds) => POUNDS_PER_OUNCE,
            (Pounds, Grams) => GRAMS_PER_POUND,
            (Pounds, Ounces) => OUNCES_PER_POUND,
            _ => 1.0,
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Grams => write!(f, "grams"),
            WeightUnit::Ounces => write!(f, "ounces"),
            WeightUnit::Pounds => write!(f, "pounds"),
        }
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grams" | "gram" | "g" => Ok(WeightUnit::Grams),
            "ounces" | "ounce" | "oz" => Ok(WeightUnit::Ounces),
            "pounds" | "pound" | "lb" | "lbs" => Ok(WeightUnit::Pounds),
            _ => Err(format!(
                "Invalid unit '{}'. Valid options: grams, ounces, pounds",
                s
            )),
        }
    }
}

/// The three displayed fields. The source unit's field repeats the input
/// text; the others hold two-decimal results. All empty when the input
/// was not a number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub grams: String,
    pub ounces: String,
    pub pounds: String,
}

impl Conversion {
    pub fn is_empty(&self) -> bool {
        self.grams.is_empty() && self.ounces.is_empty() && self.pounds.is_empty()
    }

    pub fn get(&self, unit: WeightUnit) -> &str {
        match unit {
            WeightUnit::Grams => &self.grams,
            WeightUnit::Ounces => &self.ounces,
            WeightUnit::Pounds => &self.pounds,
        }
    }

    fn slot(&mut self, unit: WeightUnit) -> &mut String {
        match unit {
            WeightUnit::Grams => &mut self.grams,
            WeightUnit::Ounces => &mut self.ounces,
            WeightUnit::Pounds => &mut self.pounds,
        }
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for unit in WeightUnit::ALL {
            writeln!(f, "{:<8} {} {}", format!("{}:", unit), self.get(unit), unit.symbol())?;
        }
        Ok(())
    }
}

/// Converts `input`, measured in `from`, into all three units.
pub fn convert(input: &str, from: WeightUnit) -> Conversion {
    let Some(value) = parse_leading_number(input) else {
        return Conversion::default();
    };

    let mut result = Conversion::default();
    for unit in WeightUnit::ALL {
        *result.slot(unit) = if unit == from {
            input.to_string()
        } else {
            fixed2(value * from.factor(unit))
        };
    }
    result
}

/// Value of `value` `unit`s in grams.
pub fn to_grams(value: f64, unit: WeightUnit) -> f64 {
    value * unit.factor(WeightUnit::Grams)
}

/// Two-decimal rendering with exact halves rounded away from zero.
/// Negative zero prints as `0.00`.
fn fixed2(value: f64) -> String {
    let magnitude = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    // A binary value lies exactly halfway between two hundredths only when it
    // is an odd multiple of 1/8. `{:.2}` would send those to the even digit.
    let eighths = magnitude * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 && eighths < (1u64 << 50) as f64 {
        let hundredths = (magnitude * 100.0 + 0.5) as u64;
        return format!("{}{}.{:02}", sign, hundredths / 100, hundredths % 100);
    }

    format!("{}{:.2}", sign, magnitude)
}

/// Longest decimal prefix after leading whitespace: optional sign, digits
/// with at most one point, optional exponent.
fn parse_leading_number(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hundred_grams() {
        let result = convert("100", WeightUnit::Grams);
        assert_eq!(result.grams, "100");
        assert_eq!(result.ounces, "3.53");
        assert_eq!(result.pounds, "0.22");
    }

    #[test]
    fn test_ounces_and_pounds() {
        let result = convert("16", WeightUnit::Ounces);
        assert_eq!(result.grams, "453.59");
        assert_eq!(result.ounces, "16");
        assert_eq!(result.pounds, "1.00");

        let result = convert("2", WeightUnit::Pounds);
        assert_eq!(result.grams, "907.18");
        assert_eq!(result.ounces, "32.00");
        assert_eq!(result.pounds, "2");
    }

    #[test]
    fn test_empty_and_non_numeric_input() {
        assert!(convert("", WeightUnit::Grams).is_empty());
        assert!(convert("abc", WeightUnit::Ounces).is_empty());
        assert!(convert(".", WeightUnit::Pounds).is_empty());
        assert!(convert("-", WeightUnit::Grams).is_empty());
    }

    #[test]
    fn test_leading_number_rule() {
        let result = convert("12abc", WeightUnit::Grams);
        assert_eq!(result.grams, "12abc");
        assert_eq!(result.ounces, "0.42");

        assert_eq!(parse_leading_number("  3.5kg"), Some(3.5));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("1e3x"), Some(1000.0));
        assert_eq!(parse_leading_number("2e"), Some(2.0));
        assert_eq!(parse_leading_number("-4"), Some(-4.0));
        assert_eq!(parse_leading_number("1.2.3"), Some(1.2));
    }

    #[test]
    fn test_exact_halves_round_up() {
        assert_eq!(convert("2", WeightUnit::Ounces).pounds, "0.13");
        assert_eq!(convert("10", WeightUnit::Ounces).pounds, "0.63");
        assert_eq!(convert("6", WeightUnit::Ounces).pounds, "0.38");
        assert_eq!(convert("-2", WeightUnit::Ounces).pounds, "-0.13");

        assert_eq!(fixed2(0.125), "0.13");
        assert_eq!(fixed2(2.5), "2.50");
        // Stored just below the half, so it stays down.
        assert_eq!(fixed2(1.005), "1.00");
        assert_eq!(fixed2(0.004), "0.00");
    }

    #[test]
    fn test_negative_zero_prints_plain() {
        assert_eq!(convert("-0", WeightUnit::Grams).ounces, "0.00");
    }

    #[test]
    fn test_round_trip_through_grams() {
        let values = [0.0, 0.5, 1.0, 3.25, 12.0, 100.0, 250.75, 1000.0, 4096.5];
        for unit in WeightUnit::ALL {
            for v in values {
                let grams = to_grams(v, unit);
                let result = convert(&grams.to_string(), WeightUnit::Grams);
                let back: f64 = result.get(unit).parse().unwrap();
                let tolerance = 0.011 + v.abs() * 1e-5;
                assert!(
                    (back - v).abs() <= tolerance,
                    "{} {} came back as {}",
                    v,
                    unit,
                    back
                );
            }
        }
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!(WeightUnit::from_str("Grams").unwrap(), WeightUnit::Grams);
        assert_eq!(WeightUnit::from_str("oz").unwrap(), WeightUnit::Ounces);
        assert_eq!(WeightUnit::from_str("lbs").unwrap(), WeightUnit::Pounds);
        assert!(WeightUnit::from_str("stone").is_err());
    }

    #[test]
    fn test_conversion_display() {
        let output = format!("{}", convert("100", WeightUnit::Grams));
        assert!(output.contains("grams:   100 g"));
        assert!(output.contains("ounces:  3.53 oz"));
    }
}
