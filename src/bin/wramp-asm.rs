use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use wramp_rs::asm::assemble;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble WRAMP source into a little-endian word image"
)]
struct Opts {
    /// Input assembly file (one instruction, label, or directive per line)
    #[arg(value_name = "ASMFILE")]
    input: PathBuf,
    /// Output binary file
    #[arg(value_name = "BINFILE")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let opts = Opts::parse();
    let text = std::fs::read_to_string(&opts.input)?;
    let out = assemble(&text)?;
    std::fs::write(&opts.output, &out.bytes)?;
    Ok(())
}
