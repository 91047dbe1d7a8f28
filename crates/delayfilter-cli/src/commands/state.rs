//! Standalone state file creation.

use super::common::{
    apply_normalized, apply_params, load_state_file, parse_key_val, save_state_file,
};
use clap::Args;
use delayfilter::ParameterSet;
use std::path::PathBuf;

#[derive(Args)]
pub struct StateArgs {
    /// Output state file
    #[arg(short, long)]
    output: PathBuf,

    /// Start from an existing state file instead of defaults
    #[arg(long)]
    from: Option<PathBuf>,

    /// Parameter assignment (e.g., filterType=Comb)
    #[arg(short, long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, String)>,

    /// Parameter assignment on the 0..1 host scale, applied after --param
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    norm: Vec<(String, String)>,
}

pub fn run(args: StateArgs) -> anyhow::Result<()> {
    let params = ParameterSet::new();
    if let Some(path) = &args.from {
        load_state_file(&params, path)?;
    }
    apply_params(&params, &args.param)?;
    apply_normalized(&params, &args.norm)?;
    save_state_file(&params, &args.output)?;
    println!("Wrote {}", args.output.display());
    Ok(())
}
