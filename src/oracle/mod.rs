/*!
 * Oracle clients for the external translation service.
 *
 * This module contains the common `Oracle` trait and its implementations:
 * - `chat`: OpenAI-compatible chat-completions HTTP client
 * - `mock`: scripted oracle for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::OracleError;

/// A single request to the translation oracle.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    /// System-level task instructions
    pub instructions: String,

    /// User payload, typically the tagged segment text
    pub payload: String,

    /// Sampling temperature
    pub temperature: f32,
}

impl OracleRequest {
    /// Create a new request
    pub fn new(
        instructions: impl Into<String>,
        payload: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            instructions: instructions.into(),
            payload: payload.into(),
            temperature,
        }
    }
}

/// Free-form response text from the oracle. The service gives no
/// compliance guarantee; the alignment validator reconciles it.
#[derive(Debug, Clone)]
pub struct OracleResponse {
    /// Raw response text
    pub text: String,
}

/// Common trait for translation oracles.
///
/// Implementations are injected into the dispatcher as trait objects so
/// that tests can substitute scripted behavior for the network client.
#[async_trait]
pub trait Oracle: Send + Sync + Debug {
    /// Complete one request against the oracle
    async fn complete(&self, request: OracleRequest) -> Result<OracleResponse, OracleError>;
}

pub mod chat;
pub mod mock;
