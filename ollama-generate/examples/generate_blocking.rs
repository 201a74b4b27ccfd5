//! Blocking generation: one request, one complete answer.

use ollama_generate::{Ollama, OllamaError};

#[tokio::main]
async fn main() -> Result<(), OllamaError> {
    let client = Ollama::new().model("phi3").temperature(0.8);

    let answer = client.generate("Explica embeddings").await?;
    println!("{}", answer.response);

    Ok(())
}
