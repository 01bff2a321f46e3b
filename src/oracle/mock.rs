/*!
 * Mock oracle implementations for testing.
 *
 * The mock simulates the compliance spectrum of the real service:
 * - `MockOracle::echo()` - translates every unit, perfectly aligned
 * - `MockOracle::dropping(..)` - omits some indices from the response
 * - `MockOracle::failing_times(..)` - errors for the first N calls
 * - `MockOracle::unreachable()` - panics when invoked at all
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::OracleError;
use crate::oracle::{Oracle, OracleRequest, OracleResponse};
use crate::translation::segmenter::{self, BOILERPLATE_MARKER, MISSING_MARKER};

/// Behavior mode for the mock oracle
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Echo every unit back with a translation prefix, fully aligned
    Echo,
    /// Echo, but omit these indices entirely
    DropIndices(Vec<usize>),
    /// Echo, but answer these indices with the missing placeholder
    MissingIndices(Vec<usize>),
    /// Echo, but answer these indices with the boilerplate marker
    BoilerplateIndices(Vec<usize>),
    /// Fail the first N calls, then echo
    FailTimes(u32),
    /// Fail every call
    AlwaysFail,
    /// Return prose without any index tags
    Untagged,
    /// Return this exact text
    Fixed(String),
    /// Panic when invoked; for asserting that dispatch was skipped
    Unreachable,
}

/// Mock oracle for testing pipeline behavior
#[derive(Debug)]
pub struct MockOracle {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of complete() invocations so far
    calls: Arc<AtomicUsize>,
    /// Term proposals appended as a fenced glossary block
    term_block: Vec<(String, String)>,
}

impl MockOracle {
    /// Create a new mock oracle with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            term_block: Vec::new(),
        }
    }

    /// Mock that translates every unit
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Mock that drops the given indices from its response
    pub fn dropping(indices: Vec<usize>) -> Self {
        Self::new(MockBehavior::DropIndices(indices))
    }

    /// Mock that errors for the first `n` calls, then echoes
    pub fn failing_times(n: u32) -> Self {
        Self::new(MockBehavior::FailTimes(n))
    }

    /// Mock that errors on every call
    pub fn always_failing() -> Self {
        Self::new(MockBehavior::AlwaysFail)
    }

    /// Mock that panics if it is ever invoked
    pub fn unreachable() -> Self {
        Self::new(MockBehavior::Unreachable)
    }

    /// Append a fenced glossary block proposing these terms
    pub fn with_term_block(mut self, terms: Vec<(String, String)>) -> Self {
        self.term_block = terms;
        self
    }

    /// Number of complete() invocations so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared handle to the call counter, usable after the oracle has been
    /// moved into the pipeline
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    fn echo_units(&self, payload: &str, behavior: &MockBehavior) -> String {
        let mut units = Vec::new();
        for (index, content) in segmenter::decode(payload) {
            let rendered = match behavior {
                MockBehavior::DropIndices(skip) if skip.contains(&index) => continue,
                MockBehavior::MissingIndices(miss) if miss.contains(&index) => {
                    MISSING_MARKER.to_string()
                }
                MockBehavior::BoilerplateIndices(noise) if noise.contains(&index) => {
                    BOILERPLATE_MARKER.to_string()
                }
                _ => format!("[tr] {content}"),
            };
            units.push(segmenter::encode(index, &rendered));
        }
        let mut text = units.join("\n\n");
        if !self.term_block.is_empty() {
            text.push_str("\n\n```glossary\n");
            for (source, target) in &self.term_block {
                text.push_str(&format!("{source}\u{21e2}{target}\n"));
            }
            text.push_str("```\n");
        }
        text
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn complete(&self, request: OracleRequest) -> Result<OracleResponse, OracleError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        match &self.behavior {
            MockBehavior::Unreachable => {
                panic!("mock oracle invoked but dispatch should have been skipped");
            }
            MockBehavior::AlwaysFail => Err(OracleError::RequestFailed(format!(
                "simulated failure on call {call}"
            ))),
            MockBehavior::FailTimes(n) if call <= *n as usize => Err(
                OracleError::RequestFailed(format!("simulated failure on call {call}")),
            ),
            MockBehavior::Untagged => Ok(OracleResponse {
                text: "An answer that carries no index tags at all.".to_string(),
            }),
            MockBehavior::Fixed(text) => Ok(OracleResponse { text: text.clone() }),
            behavior => Ok(OracleResponse {
                text: self.echo_units(&request.payload, behavior),
            }),
        }
    }
}
