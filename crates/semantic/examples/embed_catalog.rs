use std::{env, error::Error, fs};

use semantic::{ApiEmbedder, Embedder, EmbeddingConfig};
use serde::{Deserialize, Serialize};

/// Builds an FAQ catalog by embedding each question with the configured provider.
///
/// Input is a JSON array of `{ "question", "answer" }`; output adds the
/// `embedding` field, ready to be served as `FAQ_SERVER__CATALOG_PATH`.
/// Queries must later be embedded with the same provider and model.
///
/// ```bash
/// OPENAI_API_KEY=sk-xxx \
/// cargo run -p faq-semantic --example embed_catalog -- questions.json data/faq.json
/// ```
///
/// `EMBEDDING_API_URL` and `EMBEDDING_MODEL` override the OpenAI defaults.
#[derive(Deserialize)]
struct Pair {
    question: String,
    answer: String,
}

#[derive(Serialize)]
struct Entry {
    question: String,
    answer: String,
    embedding: Vec<f32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let input = args.next().ok_or("usage: embed_catalog <questions.json> <faq.json>")?;
    let output = args.next().unwrap_or_else(|| "data/faq.json".into());

    let mut cfg = EmbeddingConfig::default();
    if let Ok(url) = env::var("EMBEDDING_API_URL") {
        cfg.api_url = url;
    }
    if let Ok(model) = env::var("EMBEDDING_MODEL") {
        cfg.model = model;
    }
    if let Ok(key) = env::var("OPENAI_API_KEY") {
        cfg = cfg.with_api_key(key);
    }
    cfg.validate()?;

    println!("Embedding with {} ({})", cfg.model, cfg.api_url);
    let embedder = ApiEmbedder::new(cfg)?;

    let pairs: Vec<Pair> = serde_json::from_str(&fs::read_to_string(&input)?)?;
    let mut entries = Vec::with_capacity(pairs.len());
    for (i, pair) in pairs.into_iter().enumerate() {
        let embedding = embedder.embed(&pair.question).await?;
        println!("[{}] {} ({} dims)", i, pair.question, embedding.len());
        entries.push(Entry {
            question: pair.question,
            answer: pair.answer,
            embedding,
        });
    }

    fs::write(&output, serde_json::to_string_pretty(&entries)?)?;
    println!("Wrote {} entries to {}", entries.len(), output);
    Ok(())
}
