/*!
 * Request assembly and oracle dispatch.
 *
 * One request per batch: fixed task instructions, the current glossary
 * snapshot, the run's style profile, and the tagged segment payload.
 * Dispatch retries under a `RetryPolicy`; after the attempts are used up
 * the error is batch-scoped and the caller moves on to the next batch.
 * The dispatcher never mutates shared state.
 */

use log::{debug, warn};
use std::sync::Arc;

use crate::errors::OracleError;
use crate::oracle::{Oracle, OracleRequest};
use crate::translation::retry::RetryPolicy;
use crate::translation::segmenter::{BOILERPLATE_MARKER, MISSING_MARKER};

/// Builds oracle requests and dispatches them with bounded retry.
#[derive(Clone)]
pub struct Dispatcher {
    oracle: Arc<dyn Oracle>,
    retry: RetryPolicy,
    temperature: f32,
}

impl Dispatcher {
    /// Create a dispatcher around an oracle handle.
    pub fn new(oracle: Arc<dyn Oracle>, retry: RetryPolicy, temperature: f32) -> Self {
        Self {
            oracle,
            retry,
            temperature,
        }
    }

    /// Fixed task instructions for one batch, carrying the glossary and
    /// style blocks.
    pub fn build_instructions(
        source_language: &str,
        target_language: &str,
        glossary_block: &str,
        style_block: &str,
    ) -> String {
        let glossary_section = if glossary_block.is_empty() {
            "(none yet)".to_string()
        } else {
            glossary_block.to_string()
        };

        format!(
            "You are a senior literary translator. Translate the {source_language} text \
below into {target_language}, segment by segment.\n\
\n\
Alignment rules:\n\
1. Every input unit is wrapped in <sN>...</sN> delimiters. Output exactly one \
<sN>...</sN> unit for every input index, in the same order. Never merge, split or \
skip units.\n\
2. If a unit cannot be translated, output <sN>{MISSING_MARKER}</sN> for it.\n\
3. If a unit is a page number, running header or footer, or table-of-contents \
matter, output <sN>{BOILERPLATE_MARKER}</sN> for it.\n\
4. Before finishing, check for unanswered indices and emit \
<sN>{MISSING_MARKER}</sN> for each one.\n\
\n\
Terminology:\n\
- Render every term listed in the glossary below exactly as given.\n\
- For new proper nouns, keep the source form in the translation and propose the \
mapping in a fenced block:\n\
```glossary\n\
source\u{21e2}target\n\
```\n\
\n\
Style notes: {style_block}\n\
\n\
Glossary:\n\
{glossary_section}"
        )
    }

    /// Dispatch one request, retrying per the policy. Returns the oracle's
    /// raw tagged response text.
    pub async fn dispatch(
        &self,
        instructions: &str,
        payload: &str,
    ) -> Result<String, OracleError> {
        let mut last_error: Option<OracleError> = None;

        for attempt in 1..=self.retry.max_attempts {
            debug!("Oracle dispatch attempt {attempt}/{}", self.retry.max_attempts);
            let request = OracleRequest::new(instructions, payload, self.temperature);

            match self.oracle.complete(request).await {
                Ok(response) => return Ok(response.text),
                Err(error) => {
                    warn!(
                        "Oracle attempt {attempt}/{} failed: {error}",
                        self.retry.max_attempts
                    );
                    last_error = Some(error);
                }
            }

            if self.retry.allows_retry(attempt) {
                tokio::time::sleep(self.retry.delay_for(attempt)).await;
            }
        }

        Err(OracleError::RetriesExhausted {
            attempts: self.retry.max_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempt was made".to_string()),
        })
    }

}
