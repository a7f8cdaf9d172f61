//! Run-length encoding of discrete token streams.
//!
//! A run is a maximal consecutive subsequence of equal values. [`encode`] and
//! [`encode_lazy`] produce one [`Run`] per maximal run; [`decode`] expands
//! runs back to the original sequence. The text format ([`encode_to_string`] /
//! [`decode_from_string`]) only compresses runs at or above a repeat trigger,
//! writing shorter runs as plain repeated tokens.
//!
//! The text format is not escape-safe: round-trips are only guaranteed for
//! tokens free of literal commas and parentheses.

use derive_more::Constructor;
use itertools::{Either, Itertools};
use serde::{Deserialize, Serialize};
use std::iter::{once, repeat_n};

/// Default repeat count at which [`encode_to_string`] switches a run to the
/// compressed `(value,count)` form. The trigger is inclusive.
pub const DEFAULT_REPEATS_TRIGGER: usize = 3;

/// A maximal run of equal values: `count` consecutive occurrences of `value`.
///
/// Encoders uphold `count >= 1` and never emit consecutive runs sharing the
/// same value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize, Constructor)]
pub struct Run<T> {
    pub value: T,
    pub count: usize,
}

/// Hand-rolled run-length encoder.
///
/// Behaves identically to [`encode_lazy`]: holds at most one value of
/// lookahead, so it is usable on unbounded sources, and an empty input yields
/// an empty output rather than an error.
pub fn encode<I>(values: I) -> Encode<I::IntoIter>
where
    I: IntoIterator,
    I::Item: PartialEq,
{
    Encode {
        values: values.into_iter(),
        pending: None,
    }
}

/// Iterator returned by [`encode`].
#[derive(Debug)]
pub struct Encode<I: Iterator> {
    values: I,
    pending: Option<(I::Item, usize)>,
}

impl<I> Iterator for Encode<I>
where
    I: Iterator,
    I::Item: PartialEq,
{
    type Item = Run<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(value) = self.values.next() else {
                // Source exhausted: flush the in-progress run, if any
                return self
                    .pending
                    .take()
                    .map(|(value, count)| Run::new(value, count));
            };

            match self.pending.take() {
                Some((current, count)) if current == value => {
                    self.pending = Some((current, count + 1));
                }
                Some((current, count)) => {
                    self.pending = Some((value, 1));
                    return Some(Run::new(current, count));
                }
                None => self.pending = Some((value, 1)),
            }
        }
    }
}

/// Grouping-based encoder built on [`Itertools::dedup_with_count`].
///
/// Equivalent to [`encode`] for every input.
pub fn encode_lazy<I>(values: I) -> impl Iterator<Item = Run<I::Item>>
where
    I: IntoIterator,
    I::Item: PartialEq,
{
    values
        .into_iter()
        .dedup_with_count()
        .map(|(count, value)| Run::new(value, count))
}

/// Expands runs back to the original sequence: `count` clones of each `value`,
/// in order. `decode(encode(xs))` reconstructs `xs` exactly for any finite
/// `xs`.
pub fn decode<I, T>(runs: I) -> impl Iterator<Item = T>
where
    I: IntoIterator<Item = Run<T>>,
    T: Clone,
{
    runs.into_iter()
        .flat_map(|run| repeat_n(run.value, run.count))
}

/// Encodes values into the comma-delimited text format, one token per item.
///
/// A run is written as the single token `(value,count)` iff `count > 1` and
/// `count >= repeats_trigger`; otherwise it is written as `count` plain
/// stringified tokens.
pub fn encode_to_string<I>(values: I, repeats_trigger: usize) -> impl Iterator<Item = String>
where
    I: IntoIterator,
    I::Item: ToString + PartialEq,
{
    encode(values).flat_map(move |run| {
        let value = run.value.to_string();
        if run.count > 1 && run.count >= repeats_trigger {
            Either::Left(once(format!("({value},{})", run.count)))
        } else {
            Either::Right(repeat_n(value, run.count))
        }
    })
}

/// Decodes text-format tokens back to plain string tokens.
///
/// A token shaped `(<item>,<count>)` expands to `count` copies of `item`.
/// Tokens that merely look parenthesised but carry no parseable interior are
/// passed through unchanged as literal values, never an error.
pub fn decode_from_string<I>(tokens: I) -> impl Iterator<Item = String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    tokens.into_iter().flat_map(|token| {
        let token = token.into();
        match split_compressed(&token) {
            Some((item, count)) => Either::Left(repeat_n(item.to_string(), count)),
            None => Either::Right(once(token)),
        }
    })
}

/// Splits a compressed `(<item>,<count>)` token at the first interior comma.
fn split_compressed(token: &str) -> Option<(&str, usize)> {
    let interior = token.strip_prefix('(')?.strip_suffix(')')?;
    let (item, count) = interior.split_once(',')?;
    Some((item, count.parse().ok()?))
}
