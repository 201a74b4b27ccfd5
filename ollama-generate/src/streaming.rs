//! NDJSON streaming decode for the Ollama `/api/generate` API.
//!
//! Ollama emits one JSON object per line in streaming mode:
//! ```text
//! {"model":"phi3","response":"Hello","done":false}
//! {"model":"phi3","response":" world","done":false}
//! {"model":"phi3","response":"","done":true,"done_reason":"stop","eval_count":10,"prompt_eval_count":20}
//! ```
//!
//! The transport delivers raw byte chunks whose boundaries fall anywhere,
//! including inside a multi-byte UTF-8 character or in the middle of a line.
//! [`DecoderState`] buffers across both kinds of split and turns the chunk
//! sequence into an ordered sequence of text fragments plus the accumulated
//! full text.
//!
//! Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion>

use std::fmt;
use std::pin::Pin;

use futures::{Stream, StreamExt};
use reqwest::Response;

use crate::error::OllamaError;
use crate::types::GenerateResponse;

/// An event emitted while decoding a streaming generate response.
#[derive(Debug, Clone)]
pub enum GenerateEvent {
    /// One incremental piece of generated text, emitted as it arrives.
    Fragment(String),
    /// The stream ended. Carries the accumulated full text and the statistics
    /// from the final record. Emitted exactly once, even for an empty stream.
    Done(GenerateSummary),
    /// The transport failed mid-stream. Terminal; nothing follows.
    Error(String),
}

/// Final result of a fully consumed stream.
#[derive(Debug, Clone, Default)]
pub struct GenerateSummary {
    /// Concatenation of every fragment, in arrival order.
    pub text: String,
    /// Why generation stopped (e.g. "stop"), from the final record.
    pub done_reason: Option<String>,
    /// Number of tokens in the prompt, from the final record.
    pub prompt_eval_count: Option<u64>,
    /// Number of tokens generated, from the final record.
    pub eval_count: Option<u64>,
    /// Total time spent on the request in nanoseconds, from the final record.
    pub total_duration: Option<u64>,
    /// Time spent loading the model in nanoseconds, from the final record.
    pub load_duration: Option<u64>,
    /// Time spent generating the response in nanoseconds, from the final
    /// record.
    pub eval_duration: Option<u64>,
}

/// Handle to a streaming generate response.
///
/// The event stream is lazy, finite, and non-restartable: fragments are
/// decoded as the caller polls, and a stream can only be consumed once.
pub struct GenerateStream {
    /// The stream of events. Consume with `StreamExt::next()`.
    pub events: Pin<Box<dyn Stream<Item = GenerateEvent> + Send>>,
}

impl fmt::Debug for GenerateStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateStream")
            .field("events", &"Stream<GenerateEvent>")
            .finish()
    }
}

impl GenerateStream {
    /// Drain the stream and return the accumulated full text.
    ///
    /// Fragments are discarded as they arrive; use the event stream directly
    /// for incremental output. A transport failure surfaces once, as
    /// [`OllamaError::Stream`].
    pub async fn collect_text(mut self) -> Result<String, OllamaError> {
        while let Some(event) = self.events.next().await {
            match event {
                GenerateEvent::Fragment(_) => {}
                GenerateEvent::Done(summary) => return Ok(summary.text),
                GenerateEvent::Error(message) => return Err(OllamaError::Stream(message)),
            }
        }
        // The decoder always terminates with Done or Error.
        Ok(String::new())
    }
}

/// Wrap an HTTP response body into a [`GenerateStream`].
pub(crate) fn stream_generate(response: Response) -> GenerateStream {
    let byte_stream = response.bytes_stream();
    GenerateStream {
        events: Box::pin(decode_chunks(byte_stream)),
    }
}

/// Decode a raw byte stream into [`GenerateEvent`]s.
///
/// Chunks are requested one at a time; the next chunk is not polled until the
/// current one has been fully processed. The stream completes after a single
/// terminal `Done` or `Error` event.
fn decode_chunks(
    byte_stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> impl Stream<Item = GenerateEvent> + Send + 'static {
    async_stream::stream! {
        let mut state = DecoderState::new();
        let mut byte_stream = std::pin::pin!(byte_stream);

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield GenerateEvent::Error(format!("stream read error: {e}"));
                    return;
                }
            };

            for fragment in state.push_chunk(&chunk) {
                yield GenerateEvent::Fragment(fragment);
            }
        }

        let (fragments, summary) = state.finish();
        for fragment in fragments {
            yield GenerateEvent::Fragment(fragment);
        }
        yield GenerateEvent::Done(summary);
    }
}

/// Decoder state for one stream consumption.
///
/// Constructed per stream and discarded when the stream ends; there is no
/// process-wide state. A single consumer drives it, so no synchronization is
/// involved.
struct DecoderState {
    /// Cross-chunk UTF-8 carry.
    utf8: Utf8Decoder,
    /// Decoded text not yet terminated by a newline.
    line_buf: String,
    /// Accumulated text and final-record statistics.
    summary: GenerateSummary,
}

impl DecoderState {
    fn new() -> Self {
        Self {
            utf8: Utf8Decoder::default(),
            line_buf: String::new(),
            summary: GenerateSummary::default(),
        }
    }

    /// Feed one byte chunk; returns the fragments completed by it, in order.
    fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        let text = self.utf8.decode(chunk);
        self.line_buf.push_str(&text);

        let mut fragments = Vec::new();
        while let Some(newline_pos) = self.line_buf.find('\n') {
            let line = self.line_buf[..newline_pos].trim_end_matches('\r').to_string();
            self.line_buf.drain(..=newline_pos);

            if line.trim().is_empty() {
                continue;
            }

            if let Some(fragment) = self.process_line(&line) {
                fragments.push(fragment);
            }
        }
        fragments
    }

    /// Signal end of stream: flush buffered partial UTF-8 bytes, process a
    /// final record that arrived without a trailing newline, and hand back the
    /// summary.
    fn finish(mut self) -> (Vec<String>, GenerateSummary) {
        self.line_buf.push_str(&self.utf8.flush());

        let mut fragments = Vec::new();
        let remaining = self.line_buf.trim();
        if !remaining.is_empty() {
            let line = remaining.to_string();
            if let Some(fragment) = self.process_line(&line) {
                fragments.push(fragment);
            }
        }
        (fragments, self.summary)
    }

    /// Parse one NDJSON line; returns the fragment it contributes, if any.
    ///
    /// A line that fails to parse is skipped and the loop continues. Partial
    /// or garbled lines are a normal streaming artifact, not an error, so the
    /// skip is deliberate policy rather than error recovery.
    fn process_line(&mut self, line: &str) -> Option<String> {
        let record: GenerateResponse = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unparseable stream line");
                return None;
            }
        };

        if record.done {
            self.summary.done_reason = record.done_reason;
            self.summary.prompt_eval_count = record.prompt_eval_count;
            self.summary.eval_count = record.eval_count;
            self.summary.total_duration = record.total_duration;
            self.summary.load_duration = record.load_duration;
            self.summary.eval_duration = record.eval_duration;
        }

        if record.response.is_empty() {
            return None;
        }
        self.summary.text.push_str(&record.response);
        Some(record.response)
    }
}

/// Stateful UTF-8 decoder.
///
/// An incomplete multi-byte sequence at the end of a chunk is carried over and
/// prepended to the next chunk, so a character split across a chunk boundary
/// decodes to the same character as if it had arrived whole. Invalid interior
/// sequences decode to U+FFFD and decoding continues.
#[derive(Debug, Default)]
struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    /// Decode a chunk, prepending any bytes carried from the previous one.
    fn decode(&mut self, chunk: &[u8]) -> String {
        self.carry.extend_from_slice(chunk);
        let bytes = std::mem::take(&mut self.carry);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(invalid_len) => {
                            out.push('\u{FFFD}');
                            rest = &after[invalid_len..];
                        }
                        None => {
                            // Incomplete sequence at the chunk boundary; hold
                            // it until more bytes arrive.
                            self.carry = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush carried bytes at true end of stream.
    ///
    /// A dangling incomplete sequence decodes best-effort to U+FFFD rather
    /// than being dropped or raised as an error.
    fn flush(&mut self) -> String {
        String::from_utf8_lossy(&std::mem::take(&mut self.carry)).into_owned()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
