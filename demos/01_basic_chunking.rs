//! Basic Text Chunking
//!
//! The minimal example: chunk a string and write it out as JSONL.
//!
//! ```bash
//! cargo run --example 01_basic_chunking
//! ```

use ragprep::{Config, Pipeline, Source};

fn main() -> ragprep::Result<()> {
    let document = "Machine learning models learn patterns from data. \
        They generalize these patterns to make predictions. \
        This is fundamentally different from traditional programming. \
        Deep learning extends this with multiple hidden layers. \
        Each layer learns increasingly abstract representations.";

    // Pack whole sentences into chunks of at most 120 characters.
    let config = Config {
        chunk_strategy: "sentence".into(),
        chunk_size: 120,
        chunk_overlap: 0,
        ..Config::default()
    };
    let pipeline = Pipeline::new(config)?;
    let chunks: Vec<_> = pipeline.prepare(Source::Text(document.into()))?.collect();

    println!("Document: {} chars", document.chars().count());
    println!("Chunks: {}\n", chunks.len());

    for chunk in &chunks {
        println!(
            "[{}] {} chars: \"{}\"",
            chunk.chunk_id.as_deref().unwrap_or("-"),
            chunk.len(),
            chunk.text
        );
    }

    let output = std::env::temp_dir().join("ragprep_basic.jsonl");
    let written = pipeline.prepare_to_jsonl(Source::Text(document.into()), &output)?;
    println!("\nWrote {written} chunks to {}", output.display());
    Ok(())
}
