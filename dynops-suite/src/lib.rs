#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

use core::fmt::Debug;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use dynops_codec::{
    BOOL, BYTE, BYTE_BUFFER, BoxedCodec, BoxedMapCodec, Codec, DOUBLE, Either, FLOAT, INT,
    INT_STREAM, LONG, LONG_STREAM, MapCodec, SHORT, STRING, compound_list, either, group,
    recursive, unbounded_map,
};
use dynops_core::{DataResult, DynamicOps};
use indexmap::IndexMap;
use indoc::formatdoc;

/// The tree type of a suite's backend.
pub type SuiteValue<S> = <<S as BackendSuite>::Ops as DynamicOps>::Value;

/// Trait every backend implements to participate in the suite.
///
/// Each method returning a [`CaseSpec`] corresponds to a canonical case.
/// When the suite adds a new case, the trait sprouts another required method,
/// forcing every backend to acknowledge it.
pub trait BackendSuite: Sized {
    /// The backend under test.
    type Ops: DynamicOps;

    /// Human-readable name for diagnostics.
    fn backend_name() -> &'static str;

    /// The ops value every case runs against.
    fn ops() -> Self::Ops;

    /// Render a tree for the case showcase.
    fn render(value: &SuiteValue<Self>) -> String {
        format!("{value:?}")
    }

    /// Case: record with every primitive, a list, a map, a compound list and
    /// a tagged union.
    fn record_all_fields() -> CaseSpec<SuiteValue<Self>>;
    /// Case: list of strings.
    fn sequence_strings() -> CaseSpec<SuiteValue<Self>>;
    /// Case: string-keyed map of arbitrary size.
    fn map_unbounded() -> CaseSpec<SuiteValue<Self>>;
    /// Case: ordered key/value pairs with repeated keys.
    fn list_compound() -> CaseSpec<SuiteValue<Self>>;
    /// Case: one value of every day in the tagged union.
    fn dispatch_days() -> CaseSpec<SuiteValue<Self>>;
    /// Case: numbers read by an `either(DOUBLE, INT)`, where the first
    /// branch always wins.
    fn either_first_wins() -> CaseSpec<SuiteValue<Self>>;
    /// Case: nested recursive tree.
    fn recursive_tree() -> CaseSpec<SuiteValue<Self>>;
    /// Case: byte, int and long streams.
    fn streams() -> CaseSpec<SuiteValue<Self>>;
}

/// Execute suite cases; kept for convenience, but backends should register
/// each case individually via [`all_cases`].
pub fn run_suite<S: BackendSuite>() {
    for case in all_cases::<S>() {
        match case.run() {
            CaseOutcome::Passed => {}
            CaseOutcome::Skipped(reason) => {
                eprintln!(
                    "dynops-suite: skipping {} for {} ({reason})",
                    case.id,
                    S::backend_name()
                );
            }
            CaseOutcome::Failed(msg) => {
                panic!(
                    "dynops-suite case {} ({}) failed: {msg}",
                    case.id, case.description
                );
            }
        }
    }
}

/// Enumerate every canonical case with its typed descriptor.
pub fn all_cases<S: BackendSuite>() -> Vec<SuiteCase> {
    vec![
        SuiteCase::new::<S, TestData>(&CASE_RECORD_ALL_FIELDS, S::record_all_fields),
        SuiteCase::new::<S, Vec<String>>(&CASE_SEQUENCE_STRINGS, S::sequence_strings),
        SuiteCase::new::<S, IndexMap<String, String>>(&CASE_MAP_UNBOUNDED, S::map_unbounded),
        SuiteCase::new::<S, Vec<(String, String)>>(&CASE_LIST_COMPOUND, S::list_compound),
        SuiteCase::new::<S, Vec<DayData>>(&CASE_DISPATCH_DAYS, S::dispatch_days),
        SuiteCase::new::<S, Vec<Either<f64, i32>>>(&CASE_EITHER_FIRST_WINS, S::either_first_wins),
        SuiteCase::new::<S, Tree>(&CASE_RECURSIVE_TREE, S::recursive_tree),
        SuiteCase::new::<S, Streams>(&CASE_STREAMS, S::streams),
    ]
}

/// Encode `value` and decode it again: `read(write(x))`.
pub fn write_read<O, A, C>(ops: &O, codec: &C, value: &A) -> DataResult<A>
where
    O: DynamicOps,
    C: Codec<A>,
{
    codec
        .encode_start(ops, value)
        .flat_map(|encoded| codec.parse(ops, &encoded))
}

/// Decode `input` and encode the result again: `write(read(x))`.
pub fn read_write<O, A, C>(ops: &O, codec: &C, input: &O::Value) -> DataResult<O::Value>
where
    O: DynamicOps,
    C: Codec<A>,
{
    codec
        .parse(ops, input)
        .flat_map(|value| codec.encode_start(ops, &value))
}

/// Specification returned by each trait method.
#[derive(Debug, Clone)]
pub struct CaseSpec<V> {
    payload: CasePayload<V>,
    note: Option<&'static str>,
    roundtrip: RoundtripSpec,
}

impl<V> CaseSpec<V> {
    /// Let the backend encode the expected value itself.
    pub const fn generated() -> Self {
        Self {
            payload: CasePayload::Generated,
            note: None,
            roundtrip: RoundtripSpec::Enabled,
        }
    }

    /// Start from a hand-written tree that must decode to the expected value.
    pub const fn from_input(input: V) -> Self {
        Self {
            payload: CasePayload::Input(input),
            note: None,
            roundtrip: RoundtripSpec::Enabled,
        }
    }

    /// Mark the case as skipped for this backend, documenting the reason.
    pub const fn skip(reason: &'static str) -> Self {
        Self {
            payload: CasePayload::Skip { reason },
            note: None,
            roundtrip: RoundtripSpec::Enabled,
        }
    }

    /// Attach an optional note for diagnostics.
    pub fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    /// Disable the re-encoding check for this case, documenting the reason.
    pub fn without_roundtrip(mut self, reason: &'static str) -> Self {
        self.roundtrip = RoundtripSpec::Disabled { reason };
        self
    }
}

#[derive(Debug, Clone)]
enum CasePayload<V> {
    Generated,
    Input(V),
    Skip { reason: &'static str },
}

#[derive(Debug, Clone)]
enum RoundtripSpec {
    Enabled,
    Disabled { reason: &'static str },
}

struct CaseDescriptor<T> {
    id: &'static str,
    description: &'static str,
    expected: fn() -> T,
    codec: fn() -> BoxedCodec<T>,
}

/// What running one case produced.
#[derive(Debug)]
pub enum CaseOutcome {
    /// Every check held.
    Passed,
    /// The backend opted out.
    Skipped(&'static str),
    /// A check failed; the message says which.
    Failed(String),
}

/// One canonical case bound to a backend.
pub struct SuiteCase {
    /// Stable identifier, e.g. `record::all_fields`.
    pub id: &'static str,
    /// What the case covers.
    pub description: &'static str,
    skip_reason: Option<&'static str>,
    runner: Box<dyn Fn() -> CaseOutcome + Send + Sync + 'static>,
}

impl SuiteCase {
    fn new<S, T>(
        desc: &'static CaseDescriptor<T>,
        provider: fn() -> CaseSpec<SuiteValue<S>>,
    ) -> Self
    where
        S: BackendSuite,
        T: Debug + PartialEq + 'static,
    {
        let case_spec = provider();
        let skip_reason = match case_spec.payload {
            CasePayload::Skip { reason } => Some(reason),
            _ => None,
        };
        let runner = move || execute_case::<S, T>(desc, case_spec.clone());
        Self {
            id: desc.id,
            description: desc.description,
            skip_reason,
            runner: Box::new(runner),
        }
    }

    /// Run the case.
    pub fn run(&self) -> CaseOutcome {
        (self.runner)()
    }

    /// Why the backend skips this case, if it does.
    pub fn skip_reason(&self) -> Option<&'static str> {
        self.skip_reason
    }
}

fn execute_case<S, T>(desc: &'static CaseDescriptor<T>, case_spec: CaseSpec<SuiteValue<S>>) -> CaseOutcome
where
    S: BackendSuite,
    T: Debug + PartialEq,
{
    let note = case_spec.note;
    let roundtrip_disabled_reason = match case_spec.roundtrip {
        RoundtripSpec::Enabled => None,
        RoundtripSpec::Disabled { reason } => Some(reason),
    };
    let ops = S::ops();
    let codec = (desc.codec)();
    let expected = (desc.expected)();

    let input = match case_spec.payload {
        CasePayload::Skip { reason } => return CaseOutcome::Skipped(reason),
        CasePayload::Input(input) => input,
        CasePayload::Generated => match codec.encode_start(&ops, &expected).into_result() {
            Ok(encoded) => encoded,
            Err(err) => {
                return CaseOutcome::Failed(format!(
                    "dynops-suite {} ({}) encoding failed: {err}",
                    desc.id, desc.description
                ));
            }
        },
    };

    let actual = match codec.parse(&ops, &input).into_result() {
        Ok(value) => value,
        Err(err) => {
            return CaseOutcome::Failed(format!(
                "dynops-suite {} ({}) decoding failed: {err}",
                desc.id, desc.description
            ));
        }
    };

    emit_case_showcase::<S, T>(desc, note, roundtrip_disabled_reason, &input, &actual);

    let first_assert = panic::catch_unwind(AssertUnwindSafe(|| {
        assert_eq!(
            actual, expected,
            "dynops-suite {} ({}) produced unexpected value",
            desc.id, desc.description
        );
    }));
    if let Err(payload) = first_assert {
        return CaseOutcome::Failed(format_panic(payload));
    }

    if roundtrip_disabled_reason.is_some() {
        return CaseOutcome::Passed;
    }

    let reencoded = match codec.encode_start(&ops, &actual).into_result() {
        Ok(tree) => tree,
        Err(err) => {
            return CaseOutcome::Failed(format!(
                "dynops-suite {} ({}) re-encoding failed: {err}",
                desc.id, desc.description
            ));
        }
    };

    match panic::catch_unwind(AssertUnwindSafe(|| {
        assert_eq!(
            reencoded, input,
            "dynops-suite {} ({}) round-trip mismatch",
            desc.id, desc.description
        );
    })) {
        Ok(()) => CaseOutcome::Passed,
        Err(payload) => CaseOutcome::Failed(format_panic(payload)),
    }
}

fn format_panic(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic with non-string payload".into()
    }
}

fn emit_case_showcase<S, T>(
    desc: &'static CaseDescriptor<T>,
    note: Option<&'static str>,
    roundtrip_disabled_reason: Option<&'static str>,
    input: &SuiteValue<S>,
    actual: &T,
) where
    S: BackendSuite,
    T: Debug,
{
    let note_line = note.map(|n| format!("note: {n}\n")).unwrap_or_default();
    let roundtrip_line = roundtrip_disabled_reason
        .map(|r| format!("roundtrip: disabled ({r})\n"))
        .unwrap_or_default();

    println!(
        "{}",
        formatdoc!(
            "
            ── dynops-suite :: {backend_name} :: {case_id} ──
            description: {description}
            {note_line}{roundtrip_line}input:
            {input_block}

            decoded:
            {actual:#?}
            ",
            backend_name = S::backend_name(),
            case_id = desc.id,
            description = desc.description,
            note_line = note_line,
            roundtrip_line = roundtrip_line,
            input_block = S::render(input),
            actual = actual,
        )
    );
}

const CASE_RECORD_ALL_FIELDS: CaseDescriptor<TestData> = CaseDescriptor {
    id: "record::all_fields",
    description: "twelve-field record covering every primitive and composite codec",
    expected: TestData::sample,
    codec: || test_data_codec().boxed(),
};

const CASE_SEQUENCE_STRINGS: CaseDescriptor<Vec<String>> = CaseDescriptor {
    id: "sequence::strings",
    description: "list of strings, including an empty one",
    expected: || vec!["alpha".into(), String::new(), "gamma".into()],
    codec: || STRING.list_of().boxed(),
};

const CASE_MAP_UNBOUNDED: CaseDescriptor<IndexMap<String, String>> = CaseDescriptor {
    id: "map::unbounded",
    description: "string map read through unbounded_map",
    expected: || {
        IndexMap::from([
            ("north".to_string(), "cold".to_string()),
            ("south".to_string(), "warm".to_string()),
        ])
    },
    codec: || unbounded_map(STRING, STRING).boxed(),
};

const CASE_LIST_COMPOUND: CaseDescriptor<Vec<(String, String)>> = CaseDescriptor {
    id: "list::compound",
    description: "ordered pairs with a repeated key, as a list of single-entry maps",
    expected: || {
        vec![
            ("b".to_string(), "1".to_string()),
            ("a".to_string(), "2".to_string()),
            ("b".to_string(), "3".to_string()),
        ]
    },
    codec: || compound_list(STRING, STRING).boxed(),
};

const CASE_DISPATCH_DAYS: CaseDescriptor<Vec<DayData>> = CaseDescriptor {
    id: "dispatch::days",
    description: "one value per tag of the day union",
    expected: || {
        vec![
            DayData::Tuesday(3),
            DayData::Wednesday("meetings lol".into()),
            DayData::Sunday(2.5),
        ]
    },
    codec: || day_data_codec().list_of().boxed(),
};

const CASE_EITHER_FIRST_WINS: CaseDescriptor<Vec<Either<f64, i32>>> = CaseDescriptor {
    id: "either::first_wins",
    description: "numbers both branches accept are read by the first",
    expected: || vec![Either::Left(3.0), Either::Left(-1.5)],
    codec: || either(DOUBLE, INT).list_of().boxed(),
};

const CASE_RECURSIVE_TREE: CaseDescriptor<Tree> = CaseDescriptor {
    id: "recursive::tree",
    description: "tree nested three levels deep",
    expected: Tree::sample,
    codec: tree_codec,
};

const CASE_STREAMS: CaseDescriptor<Streams> = CaseDescriptor {
    id: "streams::all",
    description: "byte buffer, int stream and long stream side by side",
    expected: || Streams {
        bytes: Bytes::from_static(&[0, 1, 0xff]),
        ints: vec![-1, 0, i32::MAX],
        longs: vec![i64::MIN, 7],
    },
    codec: || streams_codec().boxed(),
};

/// The tag of [`DayData`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Day {
    /// Carries an int.
    Tuesday,
    /// Carries a string.
    Wednesday,
    /// Carries a float.
    Sunday,
}

impl Day {
    /// Every day, in declaration order.
    pub const ALL: [Day; 3] = [Day::Tuesday, Day::Wednesday, Day::Sunday];

    /// The serialized name.
    pub fn name(self) -> &'static str {
        match self {
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Sunday => "sunday",
        }
    }

    /// Look a day up by its serialized name.
    pub fn by_name(name: &str) -> Option<Day> {
        Day::ALL.into_iter().find(|day| day.name() == name)
    }

    /// The payload codec for this day's data, stored under `"value"`.
    pub fn payload(&self) -> DataResult<BoxedMapCodec<DayData>> {
        let codec = match self {
            Day::Tuesday => INT
                .flat_comap_map(DayData::Tuesday, |data: &DayData| match data {
                    DayData::Tuesday(x) => DataResult::success(*x),
                    other => wrong_day(other, Day::Tuesday),
                })
                .field_of("value")
                .boxed(),
            Day::Wednesday => STRING
                .flat_comap_map(DayData::Wednesday, |data: &DayData| match data {
                    DayData::Wednesday(y) => DataResult::success(y.clone()),
                    other => wrong_day(other, Day::Wednesday),
                })
                .field_of("value")
                .boxed(),
            Day::Sunday => FLOAT
                .flat_comap_map(DayData::Sunday, |data: &DayData| match data {
                    DayData::Sunday(z) => DataResult::success(*z),
                    other => wrong_day(other, Day::Sunday),
                })
                .field_of("value")
                .boxed(),
        };
        DataResult::success(codec)
    }
}

fn wrong_day<T>(data: &DayData, expected: Day) -> DataResult<T> {
    let found = data.day();
    DataResult::error(move || format!("Expected {} data, got {}", expected.name(), found.name()))
}

/// A tagged union keyed by [`Day`].
#[derive(Clone, Debug, PartialEq)]
pub enum DayData {
    /// Tuesday's payload.
    Tuesday(i32),
    /// Wednesday's payload.
    Wednesday(String),
    /// Sunday's payload.
    Sunday(f32),
}

impl DayData {
    /// The tag of this value.
    pub fn day(&self) -> Day {
        match self {
            DayData::Tuesday(_) => Day::Tuesday,
            DayData::Wednesday(_) => Day::Wednesday,
            DayData::Sunday(_) => Day::Sunday,
        }
    }
}

/// Reads and writes a [`Day`] by name. Unknown names fail with
/// `unknown day: {name}`.
pub fn day_codec() -> impl Codec<Day> + Clone + Send + Sync + 'static {
    STRING.comap_flat_map(
        |name: String| {
            DataResult::from_option(Day::by_name(&name), move || format!("unknown day: {name}"))
        },
        |day: &Day| day.name().to_string(),
    )
}

/// [`DayData`] with its tag under `"type"`.
pub fn day_data_codec() -> impl Codec<DayData> + Send + Sync + 'static {
    day_codec().dispatch(|data: &DayData| DataResult::success(data.day()), Day::payload)
}

/// A record touching every codec family.
#[derive(Clone, Debug, PartialEq)]
pub struct TestData {
    /// A float.
    pub a: f32,
    /// A double.
    pub b: f64,
    /// A byte.
    pub c: i8,
    /// A short.
    pub d: i16,
    /// An int.
    pub e: i32,
    /// A long.
    pub f: i64,
    /// A bool.
    pub g: bool,
    /// A string.
    pub h: String,
    /// A list.
    pub i: Vec<String>,
    /// An unbounded map.
    pub j: IndexMap<String, String>,
    /// A compound list.
    pub k: Vec<(String, String)>,
    /// A tagged union.
    pub day_data: DayData,
}

impl TestData {
    /// A fixed sample with non-trivial values in every field.
    pub fn sample() -> Self {
        TestData {
            a: 0.72,
            b: 1234.5678,
            c: -93,
            d: 23_014,
            e: -1_360_544_799,
            f: 4_987_346_022_152_712_407,
            g: true,
            h: "0.4367618".into(),
            i: vec!["0.29711145".into(), "0.5011585".into()],
            j: IndexMap::from([
                ("0.81".to_string(), "0.11".to_string()),
                ("0.03".to_string(), "0.97".to_string()),
            ]),
            k: vec![
                ("0.5".to_string(), "0.25".to_string()),
                ("0.5".to_string(), "0.125".to_string()),
            ],
            day_data: DayData::Wednesday("meetings lol".into()),
        }
    }
}

/// The codec for [`TestData`].
pub fn test_data_codec() -> impl Codec<TestData> + Send + Sync + 'static {
    group((
        FLOAT.field_of("a").for_getter(|d: &TestData| &d.a),
        DOUBLE.field_of("b").for_getter(|d: &TestData| &d.b),
        BYTE.field_of("c").for_getter(|d: &TestData| &d.c),
        SHORT.field_of("d").for_getter(|d: &TestData| &d.d),
        INT.field_of("e").for_getter(|d: &TestData| &d.e),
        LONG.field_of("f").for_getter(|d: &TestData| &d.f),
        BOOL.field_of("g").for_getter(|d: &TestData| &d.g),
        STRING.field_of("h").for_getter(|d: &TestData| &d.h),
        STRING.list_of().field_of("i").for_getter(|d: &TestData| &d.i),
        unbounded_map(STRING, STRING)
            .field_of("j")
            .for_getter(|d: &TestData| &d.j),
        compound_list(STRING, STRING)
            .field_of("k")
            .for_getter(|d: &TestData| &d.k),
        day_data_codec()
            .field_of("day_data")
            .for_getter(|d: &TestData| &d.day_data),
    ))
    .apply(|a, b, c, d, e, f, g, h, i, j, k, day_data| TestData {
        a,
        b,
        c,
        d,
        e,
        f,
        g,
        h,
        i,
        j,
        k,
        day_data,
    })
    .codec()
}

/// A recursive fixture.
#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
    /// The node's label.
    pub label: String,
    /// Child nodes, in order.
    pub children: Vec<Tree>,
}

impl Tree {
    /// A leaf node.
    pub fn leaf(label: &str) -> Self {
        Tree {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// A node with children.
    pub fn node(label: &str, children: Vec<Tree>) -> Self {
        Tree {
            label: label.into(),
            children,
        }
    }

    /// `root(a, b(c))`.
    pub fn sample() -> Self {
        Tree::node(
            "root",
            vec![Tree::leaf("a"), Tree::node("b", vec![Tree::leaf("c")])],
        )
    }
}

/// The codec for [`Tree`]. Children are optional and omitted when empty.
pub fn tree_codec() -> BoxedCodec<Tree> {
    recursive("tree", |tree| {
        group((
            STRING.field_of("label").for_getter(|t: &Tree| &t.label),
            tree.list_of()
                .optional_field_of_or("children", Vec::new())
                .for_getter(|t: &Tree| &t.children),
        ))
        .apply(|label, children| Tree { label, children })
        .codec()
    })
}

/// Stream fixture.
#[derive(Clone, Debug, PartialEq)]
pub struct Streams {
    /// Raw bytes.
    pub bytes: Bytes,
    /// Ints.
    pub ints: Vec<i32>,
    /// Longs.
    pub longs: Vec<i64>,
}

/// The codec for [`Streams`].
pub fn streams_codec() -> impl Codec<Streams> + Send + Sync + 'static {
    group((
        BYTE_BUFFER.field_of("bytes").for_getter(|s: &Streams| &s.bytes),
        INT_STREAM.field_of("ints").for_getter(|s: &Streams| &s.ints),
        LONG_STREAM.field_of("longs").for_getter(|s: &Streams| &s.longs),
    ))
    .apply(|bytes, ints, longs| Streams { bytes, ints, longs })
    .codec()
}
