//! Codecs for recursive types.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};
use core::fmt;

use dynops_core::{DataResult, DynamicOps};

use crate::boxed::{Erased, ErasedCodec};
use crate::erased::{ErasedOps, ErasedValue};
use crate::{BoxedCodec, Codec};

struct Node<A> {
    codec: Box<dyn ErasedCodec<A>>,
}

impl<A> ErasedCodec<A> for Node<A> {
    fn encode_erased(
        &self,
        input: &A,
        ops: &ErasedOps<'_>,
        prefix: ErasedValue,
    ) -> DataResult<ErasedValue> {
        self.codec.encode_erased(input, ops, prefix)
    }

    fn decode_erased(&self, ops: &ErasedOps<'_>, input: &ErasedValue) -> DataResult<(A, ErasedValue)> {
        self.codec.decode_erased(ops, input)
    }
}

/// A handle to the recursive codec being defined. See [`recursive`].
pub struct RecursiveRef<A> {
    node: Weak<Node<A>>,
    name: Cow<'static, str>,
}

impl<A> RecursiveRef<A> {
    fn resolve(&self) -> Option<BoxedCodec<A>>
    where
        A: 'static,
    {
        self.node.upgrade().map(|node| BoxedCodec(node))
    }

    fn dropped<R>(&self) -> DataResult<R> {
        let name = self.name.clone();
        DataResult::error(move || format!("Recursive codec {name} is no longer alive"))
    }
}

impl<A> Clone for RecursiveRef<A> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            name: self.name.clone(),
        }
    }
}

impl<A> fmt::Debug for RecursiveRef<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecursiveRef({})", self.name)
    }
}

impl<A: 'static> Codec<A> for RecursiveRef<A> {
    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        match self.resolve() {
            Some(codec) => codec.encode(input, ops, prefix),
            None => self.dropped(),
        }
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(A, O::Value)> {
        match self.resolve() {
            Some(codec) => codec.decode(ops, input),
            None => self.dropped(),
        }
    }
}

/// Define a codec that refers to itself, for types like trees.
///
/// `build` receives a [`RecursiveRef`] standing for the codec under
/// construction. The returned codec holds the only strong reference to
/// itself, so dropping it frees the whole definition.
pub fn recursive<A, C, F>(name: impl Into<Cow<'static, str>>, build: F) -> BoxedCodec<A>
where
    A: 'static,
    C: Codec<A> + Send + Sync + 'static,
    F: FnOnce(RecursiveRef<A>) -> C,
{
    let name = name.into();
    let node = Arc::new_cyclic(|weak: &Weak<Node<A>>| {
        let codec = build(RecursiveRef {
            node: weak.clone(),
            name,
        });
        Node {
            codec: Box::new(Erased(codec)),
        }
    });
    BoxedCodec(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{INT, MapCodec, group};
    use dynops_testhelpers::test;
    use dynops_value::{Value, ValueOps};
    use insta::assert_snapshot;

    #[derive(Clone, Debug, PartialEq)]
    struct Tree {
        value: i32,
        children: Vec<Tree>,
    }

    fn tree_codec() -> BoxedCodec<Tree> {
        recursive("tree", |tree| {
            group((
                INT.field_of("value").for_getter(|t: &Tree| &t.value),
                tree.list_of().field_of("children").for_getter(|t: &Tree| &t.children),
            ))
            .apply(|value, children| Tree { value, children })
            .codec()
        })
    }

    #[test]
    fn nested_tree_round_trip() {
        let tree = Tree {
            value: 1,
            children: vec![
                Tree {
                    value: 2,
                    children: vec![],
                },
                Tree {
                    value: 3,
                    children: vec![Tree {
                        value: 4,
                        children: vec![],
                    }],
                },
            ],
        };
        let codec = tree_codec();
        let encoded = codec.encode_start(&ValueOps, &tree).into_value().unwrap();
        assert_snapshot!(
            encoded.to_string(),
            @r#"{"value": 1, "children": [{"value": 2, "children": []}, {"value": 3, "children": [{"value": 4, "children": []}]}]}"#
        );
        assert_eq!(codec.parse(&ValueOps, &encoded).into_value(), Some(tree));
    }

    #[test]
    fn errors_surface_from_any_depth() {
        let input = Value::map(vec![
            (Value::from("value"), Value::Int(1)),
            (
                Value::from("children"),
                Value::list(vec![Value::map(vec![(Value::from("value"), Value::from("x"))])]),
            ),
        ]);
        let result = tree_codec().parse(&ValueOps, &input);
        assert_snapshot!(
            result.error_message().unwrap(),
            @r#"Not a number: "x"; No key children in MapLike[{"value": "x"}]"#
        );
    }

    #[test]
    fn dangling_reference_reports_an_error() {
        let mut leaked = None;
        let codec = recursive("leaf", |this: RecursiveRef<i32>| {
            leaked = Some(this);
            INT
        });
        drop(codec);
        let this = leaked.unwrap();
        assert_snapshot!(
            this.parse(&ValueOps, &Value::Int(1)).error_message().unwrap(),
            @"Recursive codec leaf is no longer alive"
        );
    }
}
