use crate::{
    error::ErrorKind,
    primop::StdPrimitives,
    runtime::{
        engine::{ENTRY_POINT, Engine, SNAPSHOT_VERSION, Snapshot, Step},
        memory::ReadPolicy,
    },
    syntax::parse,
};

const PROGRAM: &str = "
start #main
  create
  dupl
  desccall
  input
  push #_intrin_putstring
  push_func
  assign 6
  desccall
  input
  push twice
  push_func
finish
start twice
  desccall
  push_param 0
  dupl
  input
  input
  create
  dupl
  return
  push #_intrin_add
  push_func
  desccall
  input
  push #_intrin_putstring
  push_func
finish
";

fn fresh() -> Engine<StdPrimitives<Vec<u8>>> {
    let mut engine = Engine::new(parse(PROGRAM).unwrap(), StdPrimitives::with_writer(Vec::new()));
    engine.seed(ENTRY_POINT);
    engine
}

fn drain(engine: &mut Engine<StdPrimitives<Vec<u8>>>) -> Vec<Step> {
    let mut steps = Vec::new();
    loop {
        let step = engine.step().unwrap();
        if !step.made_progress() {
            return steps;
        }
        steps.push(step);
    }
}

#[test]
fn uninterrupted_run_output() {
    let mut engine = fresh();
    drain(&mut engine);
    let output = String::from_utf8(engine.into_primitives().into_writer()).unwrap();
    assert_eq!(output, "6\n12\n");
}

#[test]
fn resuming_at_every_step_matches_uninterrupted_run() {
    let mut reference = fresh();
    let expected = drain(&mut reference);
    let expected_output = String::from_utf8(reference.primitives().writer().clone()).unwrap();

    for cut in 0..expected.len() {
        let mut first = fresh();
        for _ in 0..cut {
            first.step().unwrap();
        }
        let json = first.snapshot().to_json().unwrap();
        let mut output = first.into_primitives().into_writer();

        let snapshot = Snapshot::from_json(&json).unwrap();
        let mut second = Engine::resume(
            parse(PROGRAM).unwrap(),
            StdPrimitives::with_writer(Vec::new()),
            snapshot,
        )
        .unwrap();
        let rest = drain(&mut second);
        output.extend_from_slice(second.primitives().writer());

        assert_eq!(rest.as_slice(), &expected[cut..], "cut at step {cut}");
        assert_eq!(String::from_utf8(output).unwrap(), expected_output);
    }
}

#[test]
fn snapshot_round_trips_through_json() {
    let mut engine = fresh();
    engine.set_read_policy(ReadPolicy::Strict);
    for _ in 0..5 {
        engine.step().unwrap();
    }

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    assert_eq!(snapshot.steps, 5);
    assert_eq!(snapshot.frame.as_ref().unwrap().ip, 5);

    let restored = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(restored, snapshot);

    let resumed = Engine::resume(
        parse(PROGRAM).unwrap(),
        StdPrimitives::with_writer(Vec::new()),
        restored,
    )
    .unwrap();
    assert_eq!(resumed.read_policy(), ReadPolicy::Strict);
    assert_eq!(resumed.steps(), 5);
}

#[test]
fn resume_rejects_other_program() {
    let engine = fresh();
    let snapshot = engine.snapshot();

    let other = parse("start #main\nfinish").unwrap();
    let err = Engine::resume(other, StdPrimitives::with_writer(Vec::new()), snapshot)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::SnapshotMismatch);
}

#[test]
fn garbage_json_is_a_snapshot_error() {
    let err = Snapshot::from_json("{\"version\": 1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SnapshotMismatch);
}
