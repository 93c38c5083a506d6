//! Print a transform chain and the matrix it amounts to.
//!
//! ```text
//! cargo run -p rune-transform --example print_chain -- chain.toml
//! ```

use anyhow::{Context, Result};
use rune_transform::{Transform, TransformChain};
use tracing_subscriber::EnvFilter;

const DEFAULT_CHAIN: &str = r#"
[[transforms]]
type = "translate"
x = 100.0
y = 50.0

[[transforms]]
type = "rotate"
angle = 30.0
pivot_x = 10.0
pivot_y = 10.0

[[transforms]]
type = "scale"
x = 2.0
y = 0.5
"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let chain = match std::env::args().nth(1) {
        Some(path) => TransformChain::load_from_file(&path)
            .with_context(|| format!("failed to load transform chain from {path}"))?,
        None => TransformChain::from_toml_str(DEFAULT_CHAIN)?,
    };

    for (index, transform) in chain.build()?.iter().enumerate() {
        println!("{index}: {transform}");
    }

    let effective = chain.concatenate()?;
    println!("effective: {}", effective.to_matrix());
    match effective.create_inverse() {
        Ok(inverse) => println!("inverse:   {}", inverse.to_matrix()),
        Err(e) => println!("inverse:   {e}"),
    }
    Ok(())
}
