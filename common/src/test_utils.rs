use serde_json::json;

use crate::domain::{ActorId, Comparator, RunnerConfig, TestCase};

/// Builders for fixture values.
///
/// Public so that other crates can reuse them for their own tests.

pub fn actor(id: &str) -> ActorId {
    ActorId::try_new(id).unwrap()
}

pub fn sample_runner(timeout_ms: i64) -> RunnerConfig {
    RunnerConfig {
        timeout_ms,
        memory_mb: None,
        entry_fn_name: Some("solve".to_owned()),
        runtime_version: None,
    }
}

pub fn io_test(name: &str) -> TestCase {
    TestCase::Io {
        id: None,
        name: name.to_owned(),
        input: json!([2, 7, 11, 15]),
        expected: json!([0, 1]),
        comparator: Comparator::DeepEqual,
    }
}

pub fn unit_test(name: &str) -> TestCase {
    TestCase::Unit {
        id: None,
        name: name.to_owned(),
        test_code: "expect(solve([3, 3])).toEqual([0, 1])".to_owned(),
        framework: None,
    }
}
