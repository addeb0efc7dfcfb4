//! Chunking Strategies Comparison
//!
//! Demonstrates the built-in chunking strategies and their trade-offs, plus a
//! custom strategy registered by name.
//!
//! ```bash
//! cargo run --example chunking_strategies
//! ```

use ragprep::{
    register_strategy, resolve, CharacterChunker, Chunker, Metadata, StrategyKind, StrategyParams,
};

/// Character windows that only cut on whitespace.
struct WordWindows(CharacterChunker);

impl Chunker for WordWindows {
    fn chunk<'a>(&'a self, text: &'a str, metadata: &'a Metadata) -> ragprep::Chunks<'a> {
        Box::new(self.0.chunk(text, metadata).map(|mut chunk| {
            chunk.text = chunk.text.trim().to_string();
            chunk
        }))
    }
}

fn main() -> ragprep::Result<()> {
    println!("Text Chunking Strategies");
    println!("========================\n");

    // Sample document with varied structure
    let document = r"Machine learning models learn patterns from data. They generalize these patterns to make predictions on new, unseen examples. This is fundamentally different from traditional programming, where humans write explicit rules.

The training process involves three key steps. Forward pass: input flows through the network. Loss computation: predictions are compared against ground truth. Backpropagation: gradients flow backward, updating weights.

Dr. Geoffrey Hinton pioneered backpropagation in the 1980s. In 2024, he was recognized with the Nobel Prize.";

    println!("Document length: {} characters\n", document.chars().count());

    let meta = Metadata::new().with("source_id", "ml_intro");
    let params = StrategyParams::new(200, 20);

    for kind in StrategyKind::ALL {
        let chunker = resolve(kind.as_str(), &params)?;
        let chunks: Vec<_> = chunker.chunk(document, &meta).collect();

        println!("{kind}: {} chunks", chunks.len());
        for chunk in &chunks {
            let preview = chunk.text.chars().take(60).collect::<String>();
            println!(
                "   [{}] ({} chars): \"{}...\"",
                chunk.chunk_id.as_deref().unwrap_or("-"),
                chunk.len(),
                preview.replace('\n', " ")
            );
        }
        println!();
    }
    println!("Note: sentence packing splits after \"Dr.\"; the boundary rule is punctuation only.\n");

    // Custom strategy, resolved by name like the built-ins.
    register_strategy("word_windows", |size, overlap| {
        CharacterChunker::new(size, overlap).map(WordWindows)
    });
    let custom = resolve("word_windows", &params)?;
    println!("word_windows: {} chunks", custom.chunk(document, &meta).count());

    // Summary
    println!("\n--- Summary ---\n");
    println!("| Strategy  | Unit       | Preserves Boundaries | Best For            |");
    println!("|-----------|------------|----------------------|---------------------|");
    println!("| character | characters | No                   | Logs, baselines     |");
    println!("| token     | tokens     | No                   | Embedding budgets   |");
    println!("| sentence  | characters | Yes (sentences)      | Prose, articles     |");
    println!("| none      | document   | Yes (whole document) | Short records       |");
    Ok(())
}
