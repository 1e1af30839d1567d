use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use wramp_rs::disasm::{decode_words, label_table, synthesize_labels};
use wramp_rs::image::load_words;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Disassemble a little-endian word image into WRAMP source"
)]
struct Opts {
    /// Input binary file (length must be a multiple of 4 bytes)
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
    /// Output assembly file
    #[arg(value_name = "ASMFILE")]
    output: PathBuf,
    /// Export synthesized labels as JSON (Vec<{ addr, name }>)
    #[arg(long, value_name = "FILE")]
    labels_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct LabelKV {
    addr: i64,
    name: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let opts = Opts::parse();
    let words = load_words(&opts.input)?;
    let (lines, targets) = decode_words(&words);

    if let Some(path) = &opts.labels_out {
        let kv: Vec<LabelKV> = label_table(&targets)
            .into_iter()
            .map(|(addr, name)| LabelKV { addr, name })
            .collect();
        std::fs::write(path, serde_json::to_string_pretty(&kv)?)?;
    }

    let mut text = String::new();
    for line in synthesize_labels(lines, &targets) {
        text.push_str(&line);
        text.push('\n');
    }
    std::fs::write(&opts.output, text)?;
    Ok(())
}
