use clap::Parser;
use std::error::Error;

use subword_ffi::{Affixes, Processor, ProcessorConfig};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Encode text with a serialized tokenizer and decode it back", long_about = None)]
struct CliArgs {
    /// Path to a tokenizer.json model.
    #[clap(long, value_parser)]
    model_path: String,
    #[clap(long, value_parser)]
    text: String,
    /// Optional processor config (JSON).
    #[clap(long, value_parser)]
    config_path: Option<String>,
    /// Emit 16-bit ids.
    #[clap(long)]
    narrow: bool,
    #[clap(long, value_parser)]
    prefix: Option<u16>,
    #[clap(long, value_parser)]
    suffix: Option<u16>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();

    let config = match &args.config_path {
        Some(path) => ProcessorConfig::load(path)?,
        None => ProcessorConfig::default(),
    };
    let model = std::fs::read(&args.model_path)
        .map_err(|e| format!("Failed to read model {}: {}", args.model_path, e))?;

    let mut processor: Processor = Processor::with_config(config);
    processor.load(&model)?;
    println!("Loaded {} pieces (unk={}, bos={}, eos={}, pad={})",
        processor.num_pieces(), processor.unk_id(), processor.bos_id(), processor.eos_id(), processor.pad_id());

    let affixes = Affixes { prefix: args.prefix, suffix: args.suffix };
    let decoded = if args.narrow || affixes != Affixes::NONE {
        let ids = processor.encode16_with(&args.text, affixes)?;
        println!("Encoded IDs (u16): {:?}", ids.as_slice());
        // Affix sentinels are not necessarily pieces of the model; decode only the interior.
        let start = usize::from(affixes.prefix.is_some());
        let end = ids.len() - usize::from(affixes.suffix.is_some());
        processor.decode16(&ids[start..end])?
    } else {
        let ids = processor.encode(&args.text)?;
        println!("Encoded IDs: {:?}", ids.as_slice());
        processor.decode(&ids)?
    };

    println!("Decoded text: '{}'", String::from_utf8_lossy(decoded.as_slice()));
    Ok(())
}
