//! Affiche une réponse WSMAN au format JSON
//!
//! Usage: `cargo run -p pmowsman --example dump_response -- tests/data/gensettings.xml`

use std::fs::File;

use pmowsman::soap::parse_wsman_reader;

fn main() -> anyhow::Result<()> {
    // Initialiser le logging
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/data/gensettings.xml".to_string());

    let document = parse_wsman_reader(File::open(&path)?)?;
    println!("{}", serde_json::to_string_pretty(&document)?);

    if let Some(context) = document.enumeration_context() {
        println!("\nEnumerationContext: {}", context);
    }

    Ok(())
}
