//! Values of one of two shapes.

use dynops_core::{DataResult, DynamicOps, Message};

use crate::Codec;
use crate::tracing_macros::trace;

/// One of two values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
    /// The first alternative.
    Left(L),
    /// The second alternative.
    Right(R),
}

impl<L, R> Either<L, R> {
    /// Map the left side.
    pub fn map_left<T>(self, f: impl FnOnce(L) -> T) -> Either<T, R> {
        match self {
            Either::Left(l) => Either::Left(f(l)),
            Either::Right(r) => Either::Right(r),
        }
    }

    /// Map the right side.
    pub fn map_right<T>(self, f: impl FnOnce(R) -> T) -> Either<L, T> {
        match self {
            Either::Left(l) => Either::Left(l),
            Either::Right(r) => Either::Right(f(r)),
        }
    }

    /// The left value, if this is one.
    pub fn left(self) -> Option<L> {
        match self {
            Either::Left(l) => Some(l),
            Either::Right(_) => None,
        }
    }

    /// The right value, if this is one.
    pub fn right(self) -> Option<R> {
        match self {
            Either::Left(_) => None,
            Either::Right(r) => Some(r),
        }
    }
}

impl<T> Either<T, T> {
    /// Whichever side is present.
    pub fn into_inner(self) -> T {
        match self {
            Either::Left(v) | Either::Right(v) => v,
        }
    }
}

/// See [`either`].
#[derive(Clone, Debug)]
pub struct EitherCodec<F, S> {
    first: F,
    second: S,
}

/// A codec that tries `first`, then `second`.
///
/// A clean success of either side wins, `first` before `second`. When both
/// fail, the side that still produced a partial value is kept (again
/// `first` before `second`). Otherwise the decode fails with both messages.
pub fn either<F, S>(first: F, second: S) -> EitherCodec<F, S> {
    EitherCodec { first, second }
}

impl<L, R, F, S> Codec<Either<L, R>> for EitherCodec<F, S>
where
    F: Codec<L>,
    S: Codec<R>,
{
    fn encode<O: DynamicOps>(
        &self,
        input: &Either<L, R>,
        ops: &O,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        match input {
            Either::Left(value) => self.first.encode(value, ops, prefix),
            Either::Right(value) => self.second.encode(value, ops, prefix),
        }
    }

    fn decode<O: DynamicOps>(
        &self,
        ops: &O,
        input: &O::Value,
    ) -> DataResult<(Either<L, R>, O::Value)> {
        let first = self
            .first
            .decode(ops, input)
            .map(|(value, rest)| (Either::Left(value), rest));
        if first.is_success() {
            return first;
        }
        let second = self
            .second
            .decode(ops, input)
            .map(|(value, rest)| (Either::Right(value), rest));
        if second.is_success() {
            trace!("either: first alternative failed, second matched");
            return second;
        }
        if first.has_result_or_partial() {
            return first;
        }
        if second.has_result_or_partial() {
            return second;
        }
        let m1 = first.message().cloned().unwrap_or_else(|| Message::from(""));
        let m2 = second.message().cloned().unwrap_or_else(|| Message::from(""));
        let lifecycle = first.lifecycle().add(second.lifecycle());
        let message = Message::new(move || format!("Failed to parse either. First: {m1}; Second: {m2}"));
        DataResult::error_with(message, None, lifecycle)
    }
}

/// See [`with_alternative`].
#[derive(Clone, Debug)]
pub struct Alternative<P, Q> {
    inner: EitherCodec<P, Q>,
}

/// Decode with `primary`, falling back to `alternative`, and always encode
/// with `primary`. Useful for reading a legacy representation.
pub fn with_alternative<P, Q>(primary: P, alternative: Q) -> Alternative<P, Q> {
    Alternative {
        inner: either(primary, alternative),
    }
}

impl<A, P, Q> Codec<A> for Alternative<P, Q>
where
    P: Codec<A>,
    Q: Codec<A>,
{
    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        self.inner.first.encode(input, ops, prefix)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(A, O::Value)> {
        self.inner
            .decode(ops, input)
            .map(|(value, rest)| (value.into_inner(), rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{INT, STRING};
    use dynops_testhelpers::test;
    use dynops_value::{Value, ValueOps};
    use insta::assert_snapshot;

    #[test]
    fn first_success_wins() {
        let codec = either(INT, INT.xmap(|v| v + 1, |v: &i32| v - 1));
        assert_eq!(
            codec.parse(&ValueOps, &Value::Int(1)).into_value(),
            Some(Either::Left(1))
        );
    }

    #[test]
    fn falls_back_to_second() {
        let codec = either(INT, STRING);
        assert_eq!(
            codec.parse(&ValueOps, &Value::from("x")).into_value(),
            Some(Either::Right("x".to_string()))
        );
    }

    #[test]
    fn combined_message_when_both_fail() {
        let result = either(INT, STRING).parse(&ValueOps, &Value::Bool(true));
        assert_snapshot!(
            result.error_message().unwrap(),
            @"Failed to parse either. First: Not a number: true; Second: Not a string: true"
        );
    }

    #[test]
    fn total_failure_keeps_both_lifecycles() {
        let result = either(INT, STRING.deprecated(4)).parse(&ValueOps, &Value::Bool(true));
        assert!(result.is_error());
        assert_eq!(result.lifecycle(), dynops_core::Lifecycle::deprecated(4));
    }

    #[test]
    fn partial_beats_plain_error() {
        let partial_first = INT.list_of();
        let input = Value::list(vec![Value::Int(1), Value::from("x")]);
        let result = either(partial_first, STRING).decode(&ValueOps, &input);
        assert!(result.is_error());
        let (value, _) = result.into_result_or_partial().unwrap();
        assert_eq!(value, Either::Left(vec![1]));
    }

    #[test]
    fn second_partial_used_when_first_has_none() {
        let result = either(STRING, INT.list_of())
            .decode(&ValueOps, &Value::list(vec![Value::from("x"), Value::Int(2)]));
        assert!(result.is_error());
        let (value, _) = result.into_result_or_partial().unwrap();
        assert_eq!(value, Either::Right(vec![2]));
    }

    #[test]
    fn encode_follows_the_side() {
        let codec = either(INT, STRING);
        assert_eq!(
            codec
                .encode_start(&ValueOps, &Either::Right("a".to_string()))
                .into_value(),
            Some(Value::from("a"))
        );
    }

    #[test]
    fn alternative_reads_legacy_and_writes_primary() {
        let legacy = STRING.comap_flat_map(
            |s: String| match s.parse::<i32>() {
                Ok(v) => DataResult::success(v),
                Err(_) => DataResult::error(move || format!("not numeric: {s}")),
            },
            |v: &i32| v.to_string(),
        );
        let codec = with_alternative(INT, legacy);
        assert_eq!(codec.parse(&ValueOps, &Value::from("12")).into_value(), Some(12));
        assert_eq!(
            codec.encode_start(&ValueOps, &12).into_value(),
            Some(Value::Int(12))
        );
    }
}
