//! Parameter listing.

use clap::Args;
use delayfilter::ParameterSet;
use delayfilter_core::{ParamDescriptor, ParamScale};
use serde_json::json;

#[derive(Args)]
pub struct ParamsArgs {
    /// Print as JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let params = ParameterSet::new();

    if args.json {
        let list: Vec<_> = params.descriptors().iter().map(describe_json).collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!(
        "{:12} {:16} {:>18} {:>10}  Values",
        "ID", "Name", "Range", "Default"
    );
    println!("{}", "-".repeat(72));
    for desc in params.descriptors() {
        let unit = desc.unit.suffix();
        let range = format!("{}..{}", desc.min, desc.max);
        let default = match desc.label(desc.default) {
            Some(label) => label.to_string(),
            None => format!("{}{}", desc.default, unit),
        };
        let values = if desc.is_choice() {
            desc.labels.join(", ")
        } else if desc.scale == ParamScale::Logarithmic {
            format!("log{unit}")
        } else {
            unit.trim().to_string()
        };
        println!(
            "{:12} {:16} {:>18} {:>10}  {}",
            desc.string_id, desc.name, range, default, values
        );
    }

    Ok(())
}

fn describe_json(desc: &ParamDescriptor) -> serde_json::Value {
    let mut entry = json!({
        "id": desc.string_id,
        "index": desc.id.0,
        "name": desc.name,
        "min": desc.min,
        "max": desc.max,
        "default": desc.default,
        "defaultNormalized": desc.normalize(desc.default),
        "unit": desc.unit.suffix().trim(),
    });
    if desc.is_choice() {
        entry["labels"] = json!(desc.labels);
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_entries_carry_labels() {
        let params = ParameterSet::new();
        let filter_type = describe_json(&params.descriptors()[0]);
        assert_eq!(filter_type["id"], "filterType");
        assert_eq!(filter_type["labels"][3], "Phaser");

        let mix = describe_json(&params.descriptors()[1]);
        assert_eq!(mix["id"], "mix");
        assert_eq!(mix["defaultNormalized"], 0.5);
        assert!(mix.get("labels").is_none());
    }
}
