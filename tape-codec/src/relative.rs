//! Tolerance-based relative encoding of decimal price streams.
//!
//! Closely-clustered sequences compress well as deltas from the previous
//! value, scaled by a power of ten so every delta is a plain signed integer.
//! Whenever a step exceeds the tolerance the codec emits an absolute anchor
//! instead, bounding drift and resynchronizing the chain.
//!
//! Encoding computes each delta from the raw previous value while decoding
//! accumulates onto the reconstructed previous value. The reconstructed chain
//! is authoritative: exact round-trips hold when every in-tolerance step is an
//! exact multiple of `10^-transform_factor`, which callers arrange by choosing
//! the factor via [`max_exponent`]. All arithmetic is fixed-point
//! [`Decimal`], so no binary floating-point drift is introduced.

use crate::error::CodecError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default flag character suffixed to anchor tokens in the text format.
pub const DEFAULT_ANCHOR_FLAG: char = 'A';

/// Default maximum absolute difference between consecutive values before a
/// new anchor is emitted instead of a delta.
pub const DEFAULT_TOLERANCE: Decimal = Decimal::ONE;

/// One element of the relative-encoded stream.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
pub enum Encoded {
    /// Absolute value checkpoint resetting the delta chain.
    Anchor(Decimal),
    /// Signed difference from the previous value, scaled by
    /// `10^transform_factor`.
    Delta(i64),
}

impl Encoded {
    pub fn is_anchor(&self) -> bool {
        matches!(self, Encoded::Anchor(_))
    }
}

/// Encodes a decimal sequence as anchors and scaled integer deltas.
///
/// The first value is always an anchor. Each subsequent value is emitted as a
/// delta from its raw predecessor unless the absolute difference exceeds
/// `tolerance`, in which case a fresh anchor is emitted. A difference whose
/// scaled magnitude does not fit `i64` also falls back to an anchor rather
/// than corrupting the chain. Empty input yields empty output.
pub fn encode<I>(
    values: I,
    transform_factor: u32,
    tolerance: Decimal,
) -> impl Iterator<Item = Encoded>
where
    I: IntoIterator<Item = Decimal>,
{
    let mut previous: Option<Decimal> = None;
    values.into_iter().map(move |value| {
        let encoded = match previous {
            Some(previous) => encode_step(previous, value, transform_factor, tolerance),
            None => Encoded::Anchor(value),
        };
        previous = Some(value);
        encoded
    })
}

fn encode_step(
    previous: Decimal,
    value: Decimal,
    transform_factor: u32,
    tolerance: Decimal,
) -> Encoded {
    let difference = value - previous;
    if difference.abs() > tolerance {
        return Encoded::Anchor(value);
    }
    match scale_to_integer(difference, transform_factor) {
        Some(delta) => Encoded::Delta(delta),
        None => Encoded::Anchor(value),
    }
}

/// Computes `trunc(difference * 10^transform_factor)` exactly on the decimal
/// mantissa, truncating toward zero when the difference carries more
/// fractional digits than the factor restores.
fn scale_to_integer(difference: Decimal, transform_factor: u32) -> Option<i64> {
    let mantissa = difference.mantissa();
    let shift = i64::from(transform_factor) - i64::from(difference.scale());
    let scaled = if shift >= 0 {
        mantissa.checked_mul(10i128.checked_pow(u32::try_from(shift).ok()?)?)?
    } else {
        mantissa / 10i128.pow(shift.unsigned_abs() as u32)
    };
    i64::try_from(scaled).ok()
}

/// Decodes a relative stream back to decimal values.
///
/// Anchors replace the running value; deltas add `payload * 10^-transform_factor`
/// onto it, constructed exactly without division. `transform_factor` must not
/// exceed [`Decimal`]'s maximum scale of 28.
pub fn decode<I>(pairs: I, transform_factor: u32) -> impl Iterator<Item = Decimal>
where
    I: IntoIterator<Item = Encoded>,
{
    let mut previous = Decimal::ZERO;
    pairs.into_iter().map(move |encoded| {
        previous = match encoded {
            Encoded::Anchor(value) => value,
            Encoded::Delta(delta) => previous + Decimal::new(delta, transform_factor),
        };
        previous
    })
}

/// Maximum number of digits after the decimal point across `values`.
///
/// Choosing `transform_factor = max_exponent(values)` guarantees every
/// in-tolerance difference scales to an exact integer, the condition for an
/// exact round-trip.
pub fn max_exponent<I>(values: I) -> u32
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .map(|value| value.scale())
        .max()
        .unwrap_or(0)
}

/// Encodes into the comma-delimited text format: anchor tokens are the value
/// suffixed with `flag_char`, delta tokens are bare signed integers.
pub fn encode_to_string<I>(
    values: I,
    flag_char: char,
    transform_factor: u32,
    tolerance: Decimal,
) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = Decimal>,
{
    encode(values, transform_factor, tolerance).map(move |encoded| match encoded {
        Encoded::Anchor(value) => format!("{value}{flag_char}"),
        Encoded::Delta(delta) => delta.to_string(),
    })
}

/// Decodes text-format tokens back to decimal values.
///
/// The flag suffix classifies each token; a payload that fails to parse as a
/// decimal (anchor) or signed integer (delta) is an error item, and the
/// running value is left untouched for the tokens that follow.
pub fn decode_from_string<I>(
    tokens: I,
    flag_char: char,
    transform_factor: u32,
) -> impl Iterator<Item = Result<Decimal, CodecError>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut previous = Decimal::ZERO;
    tokens.into_iter().map(move |token| {
        let token = token.as_ref();
        previous = match token.strip_suffix(flag_char) {
            Some(anchor) => anchor
                .parse::<Decimal>()
                .map_err(|_| CodecError::InvalidAnchor(token.to_string()))?,
            None => {
                let delta = token
                    .parse::<i64>()
                    .map_err(|_| CodecError::InvalidDelta(token.to_string()))?;
                previous + Decimal::new(delta, transform_factor)
            }
        };
        Ok(previous)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rust_decimal_macros::dec;

    fn round_trip(values: &[Decimal], transform_factor: u32, tolerance: Decimal) -> Vec<Decimal> {
        decode(
            encode(values.iter().copied(), transform_factor, tolerance),
            transform_factor,
        )
        .collect()
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert_eq!(encode(std::iter::empty::<Decimal>(), 2, dec!(1)).count(), 0);
        assert_eq!(decode(std::iter::empty::<Encoded>(), 2).count(), 0);
    }

    #[test]
    fn test_single_value_is_one_anchor() {
        let encoded = encode([dec!(146.61)], 2, dec!(1)).collect::<Vec<_>>();
        assert_eq!(encoded, vec![Encoded::Anchor(dec!(146.61))]);

        let decoded = decode(encoded, 2).collect::<Vec<_>>();
        assert_eq!(decoded, vec![dec!(146.61)]);
    }

    #[test]
    fn test_encode_in_tolerance_steps_become_scaled_deltas() {
        let values = [dec!(146.61), dec!(146.62), dec!(146.60), dec!(146.60)];
        let encoded = encode(values, 2, dec!(1)).collect::<Vec<_>>();
        assert_eq!(
            encoded,
            vec![
                Encoded::Anchor(dec!(146.61)),
                Encoded::Delta(1),
                Encoded::Delta(-2),
                Encoded::Delta(0),
            ]
        );
    }

    #[test]
    fn test_encode_tolerance_exceeded_resets_to_anchor() {
        let values = [dec!(100.00), dec!(100.40), dec!(102.00), dec!(102.10)];
        let encoded = encode(values, 2, dec!(0.5)).collect::<Vec<_>>();
        assert_eq!(
            encoded,
            vec![
                Encoded::Anchor(dec!(100.00)),
                Encoded::Delta(40),
                Encoded::Anchor(dec!(102.00)),
                Encoded::Delta(10),
            ]
        );
    }

    #[test]
    fn test_exact_round_trip_when_deltas_scale_exactly() {
        let values = [
            dec!(146.61),
            dec!(146.58),
            dec!(146.60),
            dec!(147.05),
            dec!(147.00),
        ];
        assert_eq!(round_trip(&values, 2, dec!(1)), values);
    }

    #[test]
    fn test_randomized_close_cluster_round_trip() {
        let mut rng = rand::rng();
        for _ in 0..20 {
            let base = Decimal::new(rng.random_range(0..1_000_00), 2);
            let mut value = base;
            let values = (0..rng.random_range(50..100))
                .map(|_| {
                    value += Decimal::new(rng.random_range(-110..110), 2);
                    value
                })
                .collect::<Vec<_>>();

            let transform_factor = max_exponent(values.iter().copied());
            assert_eq!(
                round_trip(&values, transform_factor, dec!(0.5)),
                values,
                "round trip drifted for base {base}"
            );
        }
    }

    #[test]
    fn test_max_exponent() {
        assert_eq!(max_exponent(std::iter::empty::<Decimal>()), 0);
        assert_eq!(max_exponent([dec!(5)]), 0);
        assert_eq!(max_exponent([dec!(1.5), dec!(3.141), dec!(2)]), 3);
    }

    #[test]
    fn test_string_round_trip() {
        let values = [dec!(146.61), dec!(146.62), dec!(150.00), dec!(149.95)];
        let tokens =
            encode_to_string(values, DEFAULT_ANCHOR_FLAG, 2, dec!(1)).collect::<Vec<_>>();
        assert_eq!(tokens, vec!["146.61A", "1", "150.00A", "-5"]);

        let decoded = decode_from_string(tokens, DEFAULT_ANCHOR_FLAG, 2)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_decode_from_string_invalid_tokens() {
        let mut decoded = decode_from_string(["146.61A", "banana", "1.5"], DEFAULT_ANCHOR_FLAG, 2);
        assert_eq!(decoded.next(), Some(Ok(dec!(146.61))));
        assert_eq!(
            decoded.next(),
            Some(Err(CodecError::InvalidDelta("banana".to_string())))
        );
        assert_eq!(
            decoded.next(),
            Some(Err(CodecError::InvalidDelta("1.5".to_string())))
        );
    }

    #[test]
    fn test_decode_from_string_invalid_anchor() {
        let decoded = decode_from_string(["xA"], DEFAULT_ANCHOR_FLAG, 0).collect::<Vec<_>>();
        assert_eq!(decoded, vec![Err(CodecError::InvalidAnchor("xA".to_string()))]);
    }
}
