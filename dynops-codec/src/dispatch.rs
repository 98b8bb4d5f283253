//! Tagged unions.

use alloc::borrow::Cow;
use core::fmt;
use core::hash::Hash;
use core::marker::PhantomData;
use std::collections::HashMap;

use dynops_core::{DataResult, DynamicOps, Lifecycle, MapLike, RecordBuilder};
use parking_lot::RwLock;

use crate::map_codec::MapSnapshot;
use crate::tracing_macros::{debug, trace};
use crate::{Codec, MapCodec};

/// Picks the payload codec for a tag.
pub trait Selector<K, V> {
    /// The payload codec.
    type Codec: MapCodec<V>;

    /// The payload codec for `key`, or an error for an unknown tag.
    fn select(&self, key: &K) -> DataResult<Self::Codec>;
}

impl<K, V, C, F> Selector<K, V> for F
where
    F: Fn(&K) -> DataResult<C>,
    C: MapCodec<V>,
{
    type Codec = C;

    fn select(&self, key: &K) -> DataResult<C> {
        self(key)
    }
}

/// A map codec for `V` that stores a tag of type `K` under a type key and
/// the rest of the value next to it. Created by [`Codec::dispatch_map`].
///
/// Decoding reads the tag, picks the payload codec and decodes the whole
/// map with it. Encoding writes the tag first, then the payload.
pub struct KeyDispatchCodec<K, V, KC, G, S> {
    type_key: Cow<'static, str>,
    key_codec: KC,
    getter: G,
    selector: S,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, KC, G, S> KeyDispatchCodec<K, V, KC, G, S> {
    pub(crate) fn new(
        type_key: impl Into<Cow<'static, str>>,
        key_codec: KC,
        getter: G,
        selector: S,
    ) -> Self {
        Self {
            type_key: type_key.into(),
            key_codec,
            getter,
            selector,
            _marker: PhantomData,
        }
    }

    /// The key the tag is stored under.
    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    /// Remember the payload codec of every tag after its first use.
    ///
    /// Only successful selections are kept. Two threads racing on a new
    /// tag may both run the selector; the first insert wins.
    pub fn cached(self) -> KeyDispatchCodec<K, V, KC, G, CachedSelector<K, V, S>>
    where
        S: Selector<K, V>,
    {
        KeyDispatchCodec {
            type_key: self.type_key,
            key_codec: self.key_codec,
            getter: self.getter,
            selector: CachedSelector {
                inner: self.selector,
                cache: RwLock::new(HashMap::new()),
                _marker: PhantomData,
            },
            _marker: PhantomData,
        }
    }
}

impl<K, V, KC: fmt::Debug, G, S> fmt::Debug for KeyDispatchCodec<K, V, KC, G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDispatchCodec")
            .field("type_key", &self.type_key)
            .field("key_codec", &self.key_codec)
            .finish_non_exhaustive()
    }
}

impl<K, V, KC, G, S> MapCodec<V> for KeyDispatchCodec<K, V, KC, G, S>
where
    KC: Codec<K>,
    G: Fn(&V) -> DataResult<K>,
    S: Selector<K, V>,
{
    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
        vec![ops.create_string(&self.type_key)]
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &dyn MapLike<O::Value>) -> DataResult<V> {
        let Some(tag) = input.get_str(&self.type_key) else {
            debug!("dispatch: no `{}` key in input", self.type_key);
            let type_key = self.type_key.clone();
            let map = MapSnapshot::of(input);
            return DataResult::error(move || {
                format!("Input does not contain a key [{type_key}]: {map}")
            });
        };
        self.key_codec
            .parse(ops, &tag)
            .flat_map(|key| self.selector.select(&key))
            .flat_map(|codec| codec.decode(ops, input))
    }

    fn encode<O: DynamicOps>(&self, input: &V, ops: &O, builder: &mut RecordBuilder<'_, O>) {
        let key = match (self.getter)(input) {
            DataResult::Success { value, lifecycle } => {
                builder.add_lifecycle(lifecycle);
                value
            }
            failed => {
                builder.with_errors_from(&failed);
                return;
            }
        };
        builder.add_str_result(&self.type_key, self.key_codec.encode_start(ops, &key));
        match self.selector.select(&key) {
            DataResult::Success {
                value: codec,
                lifecycle,
            } => {
                builder.add_lifecycle(lifecycle);
                codec.encode(input, ops, builder);
            }
            failed => {
                builder.with_errors_from(&failed);
            }
        }
    }
}

/// A [`Selector`] that remembers its answers. See
/// [`KeyDispatchCodec::cached`].
pub struct CachedSelector<K, V, S: Selector<K, V>> {
    inner: S,
    cache: RwLock<HashMap<K, (S::Codec, Lifecycle)>>,
    _marker: PhantomData<fn() -> V>,
}

impl<K, V, S: Selector<K, V>> CachedSelector<K, V, S> {
    /// Number of tags whose codec has been selected so far.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Returns `true` if nothing was selected yet.
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

impl<K, V, S> Selector<K, V> for CachedSelector<K, V, S>
where
    K: Hash + Eq + Clone,
    S: Selector<K, V>,
    S::Codec: Clone,
{
    type Codec = S::Codec;

    fn select(&self, key: &K) -> DataResult<S::Codec> {
        if let Some((codec, lifecycle)) = self.cache.read().get(key) {
            return DataResult::success_with(codec.clone(), *lifecycle);
        }
        let selected = self.inner.select(key);
        if let DataResult::Success { value, lifecycle } = &selected {
            trace!("dispatch: caching payload codec for a new tag");
            self.cache
                .write()
                .entry(key.clone())
                .or_insert_with(|| (value.clone(), *lifecycle));
        }
        selected
    }
}

impl<K, V, KC, G, S> KeyDispatchCodec<K, V, KC, G, CachedSelector<K, V, S>>
where
    S: Selector<K, V>,
{
    /// The selection cache.
    pub fn cache(&self) -> &CachedSelector<K, V, S> {
        &self.selector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{INT, MapCodec, STRING, group, string_resolver, unit};
    use dynops_testhelpers::test;
    use dynops_value::{Value, ValueOps};
    use insta::assert_snapshot;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Kind {
        Circle,
        Point,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Shape {
        Circle { radius: i32 },
        Point,
    }

    fn kind_codec() -> impl Codec<Kind> + Clone {
        string_resolver(
            |k: &Kind| match k {
                Kind::Circle => "circle".to_string(),
                Kind::Point => "point".to_string(),
            },
            |name| match name {
                "circle" => Some(Kind::Circle),
                "point" => Some(Kind::Point),
                _ => None,
            },
        )
    }

    fn kind_of(shape: &Shape) -> DataResult<Kind> {
        DataResult::success(match shape {
            Shape::Circle { .. } => Kind::Circle,
            Shape::Point => Kind::Point,
        })
    }

    fn payload(kind: &Kind) -> DataResult<crate::BoxedMapCodec<Shape>> {
        DataResult::success(match kind {
            Kind::Circle => group((INT.field_of("radius").for_getter(|s: &Shape| match s {
                Shape::Circle { radius } => radius,
                Shape::Point => &0,
            }),))
            .apply(|radius| Shape::Circle { radius })
            .boxed(),
            Kind::Point => unit(Shape::Point).boxed(),
        })
    }

    #[test]
    fn tagged_round_trip() {
        let codec = kind_codec().dispatch(kind_of, payload);
        let circle = Shape::Circle { radius: 4 };
        let encoded = codec.encode_start(&ValueOps, &circle).into_value().unwrap();
        assert_snapshot!(encoded.to_string(), @r#"{"type": "circle", "radius": 4}"#);
        assert_eq!(codec.parse(&ValueOps, &encoded).into_value(), Some(circle));

        let point = codec.encode_start(&ValueOps, &Shape::Point).into_value().unwrap();
        assert_snapshot!(point.to_string(), @r#"{"type": "point"}"#);
        assert_eq!(codec.parse(&ValueOps, &point).into_value(), Some(Shape::Point));
    }

    #[test]
    fn missing_tag_is_an_error() {
        let codec = kind_codec().dispatch(kind_of, payload);
        let input = Value::map(vec![(Value::from("radius"), Value::Int(1))]);
        assert_snapshot!(
            codec.parse(&ValueOps, &input).error_message().unwrap(),
            @r#"Input does not contain a key [type]: MapLike[{"radius": 1}]"#
        );
    }

    #[test]
    fn unknown_tag_names_the_tag() {
        let codec = kind_codec().dispatch(kind_of, payload);
        let input = Value::map(vec![(Value::from("type"), Value::from("square"))]);
        assert_snapshot!(
            codec.parse(&ValueOps, &input).error_message().unwrap(),
            @"Unknown element name: square"
        );
    }

    #[test]
    fn custom_type_key() {
        let codec = kind_codec().dispatch_map("kind", kind_of, payload).codec();
        let encoded = codec.encode_start(&ValueOps, &Shape::Point).into_value().unwrap();
        assert_snapshot!(encoded.to_string(), @r#"{"kind": "point"}"#);
    }

    #[test]
    fn cached_selector_fills_once_per_tag() {
        let dispatch = kind_codec().dispatch_map("type", kind_of, payload).cached();
        let codec = (&dispatch).codec();
        for _ in 0..3 {
            let encoded = codec
                .encode_start(&ValueOps, &Shape::Circle { radius: 1 })
                .into_value()
                .unwrap();
            assert!(codec.parse(&ValueOps, &encoded).is_success());
        }
        assert_eq!(dispatch.cache().len(), 1);
        let _ = codec.encode_start(&ValueOps, &Shape::Point);
        assert_eq!(dispatch.cache().len(), 2);
    }

    #[test]
    fn string_tags() {
        let codec = STRING.dispatch(
            |v: &(String, i32)| DataResult::success(v.0.clone()),
            |_: &String| {
                let n = INT.field_of("n").for_getter(|v: &(String, i32)| &v.1);
                DataResult::success(group((n,)).apply(|n| ("num".to_string(), n)))
            },
        );
        let value = ("num".to_string(), 3);
        let encoded = codec.encode_start(&ValueOps, &value).into_value().unwrap();
        assert_snapshot!(encoded.to_string(), @r#"{"type": "num", "n": 3}"#);
        assert_eq!(codec.parse(&ValueOps, &encoded).into_value(), Some(value));
    }
}
