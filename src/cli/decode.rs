use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use shac::container;
use shac::{Decoder, DecoderConfig, HrtfTable, ListenerPose, PoseSlot};

use crate::cli::command::{Cli, DecodeArgs};
use crate::wav::WavWriter;

pub fn cmd_decode(args: &DecodeArgs, _cli: &Cli, progress: Option<&MultiProgress>) -> Result<()> {
    let bytes = std::fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let parsed = container::parse(&bytes)?;

    let order = parsed.header.order as usize;
    let sample_count = parsed.header.sample_count as usize;
    let sample_rate = parsed.header.sample_rate;

    let layers = parsed
        .layers
        .iter()
        .map(|layer| {
            let position = shac::Cartesian::new(
                layer.meta.position[0],
                layer.meta.position[1],
                layer.meta.position[2],
            );
            (position, layer.meta.gain, layer.samples.clone())
        })
        .collect();

    let config = DecoderConfig {
        block_size: args.block_size,
        ..DecoderConfig::default()
    };

    let hrtf = HrtfTable::flat(order, 0.7, 0.7);
    let pose = Arc::new(PoseSlot::new(ListenerPose {
        yaw: args.yaw,
        pitch: args.pitch,
        ..ListenerPose::default()
    }));
    let mut decoder = Decoder::new(order, layers, sample_count, hrtf, pose)?;

    let mut writer = WavWriter::create(&args.output, sample_rate, 2)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let pb = progress.map(|multi| {
        let bar = multi.add(ProgressBar::new(sample_count as u64));
        bar.set_style(
            ProgressStyle::with_template("{spinner} decoding [{bar:40}] {pos}/{len} frames")
                .unwrap(),
        );
        bar
    });

    let mut block = vec![0.0f32; config.block_size * 2];
    let mut frames_done = 0usize;
    loop {
        let produced = decoder.produce_block(&mut block);
        if produced == 0 {
            break;
        }
        writer.write_samples(&block[..produced * 2])?;
        frames_done += produced;
        if let Some(bar) = &pb {
            bar.set_position(frames_done as u64);
        }
        if produced < config.block_size {
            break;
        }
    }
    if let Some(bar) = &pb {
        bar.finish_and_clear();
    }

    writer.finish()?;

    log::info!(
        "decoded {} ({} frames, order {}) into {}",
        args.input.display(),
        frames_done,
        order,
        args.output.display()
    );

    Ok(())
}
