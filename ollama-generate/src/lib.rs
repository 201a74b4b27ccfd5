#![deny(missing_docs)]
//! Client for Ollama's `/api/generate` endpoint with blocking and streaming
//! modes.
//!
//! Non-streaming mode sends one request and reads one complete JSON object.
//! Streaming mode consumes Ollama's NDJSON response incrementally: text
//! fragments are emitted as they arrive, and the full accumulated text is
//! available once the stream ends. The decoder tolerates chunk boundaries
//! that fall mid-line or mid-character, and skips malformed lines without
//! aborting.
//!
//! # Usage
//!
//! ```no_run
//! use futures::StreamExt;
//! use ollama_generate::{GenerateEvent, Ollama};
//!
//! # async fn run() -> Result<(), ollama_generate::OllamaError> {
//! let client = Ollama::new().model("phi3").temperature(0.8);
//!
//! // Blocking: one complete answer.
//! let answer = client.generate("Explica embeddings").await?;
//! println!("{}", answer.response);
//!
//! // Streaming: print fragments as they arrive.
//! let mut stream = client.generate_stream("Explica embeddings").await?;
//! while let Some(event) = stream.events.next().await {
//!     if let GenerateEvent::Fragment(text) = event {
//!         print!("{text}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod streaming;
pub mod types;

pub use client::Ollama;
pub use error::OllamaError;
pub use streaming::{GenerateEvent, GenerateStream, GenerateSummary};
pub use types::{GenerateRequest, GenerateResponse};
