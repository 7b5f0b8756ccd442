use anyhow::{Context, Result};
use indicatif::MultiProgress;
use shac::container;

use crate::cli::command::{Cli, InfoArgs};

pub fn cmd_info(args: &InfoArgs, _cli: &Cli, _multi: Option<&MultiProgress>) -> Result<()> {
    let bytes = std::fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let parsed = container::parse(&bytes)?;
    let header = &parsed.header;

    println!("file:             {}", args.input.display());
    println!("format version:   {}", header.version);
    println!("ambisonic order:  {}", header.order);
    println!("channel count:    {}", header.channel_count);
    println!("normalization:    {:?}", header.normalization());
    println!("sample rate:      {} Hz", header.sample_rate);
    println!("sample count:     {}", header.sample_count);
    println!(
        "duration:         {:.3} s",
        header.sample_count as f64 / header.sample_rate as f64
    );
    println!("layers:           {}", parsed.layers.len());

    for layer in &parsed.layers {
        println!(
            "  - id={:?} type={:?} position={:?}",
            layer.id, layer.meta.kind, layer.meta.position
        );
    }

    Ok(())
}
