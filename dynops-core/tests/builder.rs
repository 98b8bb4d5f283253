//! Record and list builders, `Dynamic`, and `VecMapLike` against the
//! reference backend.

use dynops_core::{DataResult, DynamicOps, Lifecycle, MapLike, Message, VecMapLike};
use dynops_testhelpers::test;
use dynops_value::{Value, ValueOps};
use insta::assert_snapshot;

static_assertions::assert_impl_all!(DataResult<Value>: Send, Sync);
static_assertions::assert_impl_all!(Message: Send, Sync);
static_assertions::assert_impl_all!(Lifecycle: Send, Sync, Copy);

fn s(v: &str) -> Value {
    Value::from(v)
}

#[test]
fn record_builder_merges_into_prefix() {
    let ops = ValueOps;
    let prefix = Value::map([(s("existing"), Value::Int(0))]);
    let mut builder = ops.map_builder();
    builder
        .add_str("a", Value::Int(1))
        .add_str_result("b", DataResult::success(Value::Bool(true)));
    let built = builder.build(prefix).into_value().unwrap();
    assert_snapshot!(built.to_string(), @r#"{"existing": 0, "a": 1, "b": true}"#);
}

#[test]
fn record_builder_fails_fast_and_reports_everything() {
    let ops = ValueOps;
    let mut builder = ops.map_builder();
    builder
        .add_str("a", Value::Int(1))
        .add_str_result("b", DataResult::error(|| "b is broken".to_string()))
        .add_str_result("c", DataResult::error(|| "c is broken".to_string()));
    assert!(builder.has_errors());
    let r = builder.build(ops.empty());
    assert_eq!(r.partial(), None);
    assert_snapshot!(r.error_message().unwrap(), @"b is broken; c is broken");
}

#[test]
fn lenient_build_keeps_successful_subset() {
    let ops = ValueOps;
    let mut builder = ops.map_builder();
    builder
        .add_str("a", Value::Int(1))
        .add_str_result("b", DataResult::error(|| "nope".to_string()));
    let r = builder.build_lenient(ops.empty());
    assert_eq!(r.partial(), Some(&Value::map([(s("a"), Value::Int(1))])));
    assert_eq!(r.error_message().as_deref(), Some("nope"));
}

#[test]
fn record_builder_rejects_non_map_prefix() {
    let ops = ValueOps;
    let mut builder = ops.map_builder();
    builder.add_str("a", Value::Int(1));
    assert!(builder.build(Value::Int(5)).is_error());
}

#[test]
fn record_builder_tracks_lifecycles() {
    let ops = ValueOps;
    let mut builder = ops.map_builder();
    builder
        .add_results(
            DataResult::success(s("k")),
            DataResult::success_with(Value::Int(1), Lifecycle::deprecated(2)),
        )
        .with_errors_from(&DataResult::success_with((), Lifecycle::deprecated(1)));
    let r = builder.build(ops.empty());
    assert!(r.is_success());
    assert_eq!(r.lifecycle(), Lifecycle::deprecated(1));
}

#[test]
fn record_builder_comes_apart_unbuilt() {
    let ops = ValueOps;
    let mut builder = ops.map_builder();
    builder
        .add_str("a", Value::Int(1))
        .add_str_result("b", DataResult::error(|| "b is broken".to_string()))
        .add_lifecycle(Lifecycle::experimental());
    let (entries, errors, lifecycle) = builder.into_parts();
    assert_eq!(entries, vec![(s("a"), Value::Int(1))]);
    assert_eq!(errors.map(|m| m.render()).as_deref(), Some("b is broken"));
    assert_eq!(lifecycle, Lifecycle::experimental());
}

#[test]
fn list_builder_appends() {
    let ops = ValueOps;
    let mut builder = ops.list_builder();
    builder
        .add(Value::Int(1))
        .add_result(DataResult::success(Value::Int(2)));
    let built = builder.build(Value::list([Value::Int(0)])).into_value().unwrap();
    assert_eq!(built, Value::list([Value::Int(0), Value::Int(1), Value::Int(2)]));

    let mut broken = ops.list_builder();
    broken.add_result(DataResult::error(|| "bad element".to_string()));
    assert_snapshot!(broken.build(ops.empty()).error_message().unwrap(), @"bad element");
}

#[test]
fn dynamic_navigation() {
    let ops = ValueOps;
    let v = Value::map([
        (s("a"), Value::Float(1.5)),
        (s("b"), Value::list([Value::Int(1), Value::Int(2), Value::Int(3)])),
    ]);
    let dynamic = dynops_core::Dynamic::new(&ops, v);
    assert_eq!(
        dynamic.get("a").flat_map(|a| a.as_number()).into_value(),
        Some(dynops_core::Number::Float(1.5))
    );
    let items = dynamic.get("b").flat_map(|b| b.as_list()).into_value().unwrap();
    assert_eq!(items.len(), 3);

    let without_a = dynamic.clone().remove("a");
    assert!(without_a.get("a").is_error());
    let with_c = without_a.set("c", s("x"));
    assert_eq!(with_c.get("c").flat_map(|c| c.as_string()).into_value().as_deref(), Some("x"));
    assert_eq!(dynamic.convert(&ops), dynamic);
}

#[test]
fn vec_map_like_is_last_wins() {
    let ops = ValueOps;
    let view = VecMapLike::new(
        &ops,
        vec![(s("k"), Value::Int(1)), (s("k"), Value::Int(2)), (s("z"), Value::Int(3))],
    );
    assert_eq!(view.get_str("k"), Some(Value::Int(2)));
    assert_eq!(view.get(&s("z")), Some(Value::Int(3)));
    assert_eq!(view.entries().count(), 3);
    assert_eq!(view.len(), 3);

    let merged = ops.merge_to_map_like(&ops.empty(), &view).into_value().unwrap();
    assert_eq!(merged.get("k"), Some(&Value::Int(2)));
}
