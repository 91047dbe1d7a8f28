//! Offline WAV processing.

use super::common::{
    apply_normalized, apply_params, load_state_file, parse_bit_depth, parse_key_val,
    save_state_file,
};
use crate::wav::{read_wav_stereo, write_wav_stereo};
use anyhow::bail;
use clap::Args;
use delayfilter::DelayFilter;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// Parameter assignment (e.g., filterType=Phaser, mix=0.8)
    #[arg(short, long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, String)>,

    /// Parameter assignment on the 0..1 host scale, applied after --param
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    norm: Vec<(String, String)>,

    /// State file applied before any --param
    #[arg(long)]
    state: Option<PathBuf>,

    /// Write the final parameter state here after processing
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Block size for processing
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16, 24 or 32 for float)
    #[arg(long, default_value = "32", value_parser = parse_bit_depth)]
    bit_depth: u16,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        bail!("Block size must be at least 1");
    }

    println!("Reading {}...", args.input.display());
    let (mut samples, spec) = read_wav_stereo(&args.input)?;
    if samples.is_empty() {
        tracing::warn!(path = %args.input.display(), "input has no samples");
    }
    if spec.channels > 2 {
        tracing::warn!(channels = spec.channels, "keeping only the first two channels");
    }

    let mut engine = DelayFilter::new();
    if let Some(path) = &args.state {
        load_state_file(engine.params(), path)?;
    }
    apply_params(engine.params(), &args.param)?;
    apply_normalized(engine.params(), &args.norm)?;
    engine.prepare(f64::from(spec.sample_rate), args.block_size);

    let snapshot = engine.params().snapshot();
    println!(
        "Processing {} samples at {} Hz, {}-bit ({}, mix {:.2})",
        samples.len(),
        spec.sample_rate,
        spec.bits_per_sample,
        snapshot.filter_type.label(),
        snapshot.mix
    );

    let input_rms = samples.rms();
    let input_peak = samples.peak();

    let total_blocks = samples.len().div_ceil(args.block_size) as u64;
    let pb = ProgressBar::new(total_blocks);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let frames = samples.len();
    let (left, right) = (&mut samples.left[..frames], &mut samples.right[..frames]);
    for (l, r) in left
        .chunks_mut(args.block_size)
        .zip(right.chunks_mut(args.block_size))
    {
        engine.process_block(l, r);
        pb.inc(1);
    }
    pb.finish_with_message("done");

    println!(
        "Input:  RMS {:.1} dB, peak {:.1} dB",
        linear_to_db(input_rms),
        linear_to_db(input_peak)
    );
    println!(
        "Output: RMS {:.1} dB, peak {:.1} dB",
        linear_to_db(samples.rms()),
        linear_to_db(samples.peak())
    );

    write_wav_stereo(&args.output, &samples, spec.sample_rate, args.bit_depth)?;
    println!("Wrote {}", args.output.display());

    if let Some(path) = &args.save_state {
        save_state_file(engine.params(), path)?;
    }

    Ok(())
}

fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}
