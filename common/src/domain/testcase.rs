use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Pass/fail rule for an input/output style test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Comparator {
    DeepEqual,
    StrictEqual,
    NumberTolerance {
        tolerance: f64,
    },
    StringNormalized {
        #[serde(default)]
        normalize_whitespace: bool,
        #[serde(default)]
        ignore_case: bool,
    },
    /// Runner-defined comparator, looked up by id at grading time.
    Custom {
        custom_comparator_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestFramework {
    Jest,
    Vitest,
}

/// One test case embedded in a lab version. The two variants have disjoint
/// required fields, so they are modelled as a tagged union and handled
/// exhaustively wherever the grading boundary will eventually care.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TestCase {
    Io {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        /// Arbitrary structured data, so arrays/objects are supported.
        input: Value,
        expected: Value,
        comparator: Comparator,
    },
    Unit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        test_code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        framework: Option<TestFramework>,
    },
}

impl TestCase {
    pub fn id(&self) -> Option<&str> {
        match self {
            TestCase::Io { id, .. } | TestCase::Unit { id, .. } => id.as_deref(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TestCase::Io { name, .. } | TestCase::Unit { name, .. } => name,
        }
    }
}

/// Assign an identity to every test case that lacks one, preserving existing
/// identities and order. Pure and idempotent; identities survive any later
/// normalization pass.
pub fn normalize_test_cases(cases: Vec<TestCase>) -> Vec<TestCase> {
    cases
        .into_iter()
        .map(|mut case| {
            let id = match &mut case {
                TestCase::Io { id, .. } => id,
                TestCase::Unit { id, .. } => id,
            };
            if id.is_none() {
                *id = Some(Uuid::new_v4().to_string());
            }
            case
        })
        .collect()
}

/// Optional publisher-only reference solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceSolution {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_markdown: Option<String>,
}

pub const TIMEOUT_MS_MIN: i64 = 100;
pub const TIMEOUT_MS_MAX: i64 = 300_000;
pub const MEMORY_MB_MIN: i64 = 16;
pub const MEMORY_MB_MAX: i64 = 4096;

/// Execution limits and entry point for the (external) code runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    pub timeout_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_fn_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
}

impl RunnerConfig {
    pub fn timeout_in_bounds(&self) -> bool {
        (TIMEOUT_MS_MIN..=TIMEOUT_MS_MAX).contains(&self.timeout_ms)
    }

    /// Bounds check applied at the request boundary.
    pub fn validate(&self) -> Result<(), String> {
        if !self.timeout_in_bounds() {
            return Err(format!(
                "runner.timeoutMs must be between {} and {}",
                TIMEOUT_MS_MIN, TIMEOUT_MS_MAX
            ));
        }
        if let Some(memory_mb) = self.memory_mb {
            if !(MEMORY_MB_MIN..=MEMORY_MB_MAX).contains(&memory_mb) {
                return Err(format!(
                    "runner.memoryMb must be between {} and {}",
                    MEMORY_MB_MIN, MEMORY_MB_MAX
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn io_case(id: Option<&str>) -> TestCase {
        TestCase::Io {
            id: id.map(str::to_owned),
            name: "adds small numbers".to_owned(),
            input: json!([1, 2]),
            expected: json!(3),
            comparator: Comparator::DeepEqual,
        }
    }

    #[test]
    fn normalize_assigns_missing_identities_only() {
        let normalized = normalize_test_cases(vec![io_case(Some("keep-me")), io_case(None)]);

        assert_eq!(normalized[0].id(), Some("keep-me"));
        assert!(normalized[1].id().is_some());
        assert_ne!(normalized[0].id(), normalized[1].id());
    }

    #[test]
    fn normalize_is_idempotent_and_order_preserving() {
        let first = normalize_test_cases(vec![io_case(None), io_case(Some("x")), io_case(None)]);
        let second = normalize_test_cases(first.clone());

        assert_eq!(first, second);
        assert_eq!(second[1].id(), Some("x"));
    }

    #[test]
    fn test_case_union_parses_by_kind() {
        let io: TestCase = serde_json::from_value(json!({
            "kind": "io",
            "name": "t",
            "input": [1, 2],
            "expected": 3,
            "comparator": { "kind": "numberTolerance", "tolerance": 0.001 }
        }))
        .unwrap();
        assert!(matches!(
            io,
            TestCase::Io { comparator: Comparator::NumberTolerance { .. }, .. }
        ));

        let unit: TestCase = serde_json::from_value(json!({
            "kind": "unit",
            "name": "t",
            "testCode": "expect(add(1, 2)).toBe(3)",
            "framework": "vitest"
        }))
        .unwrap();
        assert!(matches!(
            unit,
            TestCase::Unit { framework: Some(TestFramework::Vitest), .. }
        ));
    }

    #[test]
    fn runner_bounds_are_enforced() {
        let mut runner = RunnerConfig {
            timeout_ms: 1000,
            memory_mb: None,
            entry_fn_name: None,
            runtime_version: None,
        };
        assert!(runner.validate().is_ok());

        runner.timeout_ms = 99;
        assert!(runner.validate().is_err());
        runner.timeout_ms = 300_001;
        assert!(runner.validate().is_err());

        runner.timeout_ms = 2000;
        runner.memory_mb = Some(8);
        assert!(runner.validate().is_err());
        runner.memory_mb = Some(512);
        assert!(runner.validate().is_ok());
    }
}
