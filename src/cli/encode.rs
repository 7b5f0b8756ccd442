use anyhow::{bail, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use shac::container::{Layer, LayerMeta, Writer};
use shac::{Cartesian, Encoder, EncoderConfig};

use crate::cli::command::{Cli, EncodeArgs};
use crate::wav;

pub fn cmd_encode(args: &EncodeArgs, _cli: &Cli, progress: Option<&MultiProgress>) -> Result<()> {
    if args.order == 0 || args.order > shac::sphharm::MAX_ORDER {
        bail!("--order must be in 1..={}", shac::sphharm::MAX_ORDER);
    }

    let wav = wav::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    if wav.channels != 1 {
        bail!("{} is not mono ({} channels)", args.input.display(), wav.channels);
    }

    let position = parse_position(&args.position)?;

    let config = EncoderConfig {
        order: args.order,
        normalization: args.normalization.into(),
        apply_distance_gain: true,
    };
    let encoder = Encoder::new(config);

    let pb = progress.map(|multi| {
        let bar = multi.add(ProgressBar::new(wav.samples.len() as u64));
        bar.set_style(
            ProgressStyle::with_template("{spinner} encoding [{bar:40}] {pos}/{len} samples")
                .unwrap(),
        );
        bar
    });

    let mut ambisonic = vec![0.0f32; wav.samples.len() * encoder.num_channels()];
    encoder.encode_mono(&wav.samples, position, &mut ambisonic);
    if let Some(bar) = &pb {
        bar.set_position(wav.samples.len() as u64);
        bar.finish_and_clear();
    }

    let mut writer = Writer::new(
        encoder.order(),
        config.normalization,
        wav.sample_rate,
        wav.samples.len() as u32,
    )?;
    let meta = LayerMeta::new("point", [position.x, position.y, position.z]);
    let layer = Layer::new(args.layer_id.clone(), meta, ambisonic)?;
    writer.add_layer(layer)?;

    let bytes = writer.write()?;
    std::fs::write(&args.output, bytes)
        .with_context(|| format!("writing {}", args.output.display()))?;

    log::info!(
        "encoded {} ({} samples, order {}) into {}",
        args.input.display(),
        wav.samples.len(),
        encoder.order(),
        args.output.display()
    );

    Ok(())
}

fn parse_position(spec: &str) -> Result<Cartesian> {
    let parts: Vec<&str> = spec.split(',').collect();
    if parts.len() != 3 {
        bail!("--position must be \"x,y,z\", got {spec:?}");
    }
    let mut values = [0.0f32; 3];
    for (slot, part) in values.iter_mut().zip(parts) {
        *slot = part
            .trim()
            .parse()
            .with_context(|| format!("invalid position component {part:?}"))?;
    }
    Ok(Cartesian::new(values[0], values[1], values[2]))
}
