//! Streaming generation: print each fragment as it arrives.

use std::io::Write;

use futures::StreamExt;
use ollama_generate::{GenerateEvent, Ollama, OllamaError};

#[tokio::main]
async fn main() -> Result<(), OllamaError> {
    let client = Ollama::new().model("phi3").temperature(0.8);

    let mut stream = client.generate_stream("Explica embeddings").await?;
    while let Some(event) = stream.events.next().await {
        match event {
            GenerateEvent::Fragment(text) => {
                print!("{text}");
                std::io::stdout().flush().ok();
            }
            GenerateEvent::Done(summary) => {
                println!();
                if let Some(count) = summary.eval_count {
                    eprintln!("generated {count} tokens");
                }
            }
            GenerateEvent::Error(message) => {
                eprintln!("stream failed: {message}");
                break;
            }
        }
    }

    Ok(())
}
