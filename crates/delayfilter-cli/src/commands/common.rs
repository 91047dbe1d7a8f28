//! Argument parsing shared by several commands.

use anyhow::{Context, bail};
use delayfilter::ParameterSet;
use std::path::Path;

/// Parses `key=value`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 || parts[0].is_empty() {
        return Err(format!("Invalid parameter format: '{}' (expected key=value)", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// Parses an output bit depth: 16 or 24 bit PCM, or 32 bit float.
pub fn parse_bit_depth(s: &str) -> Result<u16, String> {
    match s.parse::<u16>() {
        Ok(bits @ (16 | 24 | 32)) => Ok(bits),
        _ => Err(format!("Unsupported bit depth: '{}' (expected 16, 24 or 32)", s)),
    }
}

/// Applies `name=value` assignments. Choice parameters also accept their labels.
pub fn apply_params(params: &ParameterSet, assignments: &[(String, String)]) -> anyhow::Result<()> {
    for (name, raw) in assignments {
        let Some(index) = params.index_of(name) else {
            bail!("Unknown parameter: '{}' (run `delayfilter params` for the list)", name);
        };
        let desc = &params.descriptors()[index];

        let value = match raw.trim().parse::<f32>() {
            Ok(v) if v.is_finite() => v,
            Ok(_) => bail!("Invalid value '{}' for '{}'", raw, name),
            Err(_) => desc
                .label_index(raw.trim())
                .map(|i| i as f32)
                .with_context(|| format!("Invalid value '{}' for '{}'", raw, name))?,
        };

        if value < desc.min || value > desc.max {
            tracing::warn!(
                param = name.as_str(),
                value,
                min = desc.min,
                max = desc.max,
                "value out of range, clamping"
            );
        }
        params.set(index, value);
    }
    Ok(())
}

/// Applies `name=value` assignments given on the host's 0..1 scale, as
/// automation lanes record them.
pub fn apply_normalized(
    params: &ParameterSet,
    assignments: &[(String, String)],
) -> anyhow::Result<()> {
    for (name, raw) in assignments {
        let Some(index) = params.index_of(name) else {
            bail!("Unknown parameter: '{}' (run `delayfilter params` for the list)", name);
        };
        let normalized = match raw.trim().parse::<f32>() {
            Ok(v) if (0.0..=1.0).contains(&v) => v,
            _ => bail!("Normalized value for '{}' must be within 0..1, got '{}'", name, raw),
        };
        params.set_normalized(index, normalized);
    }
    Ok(())
}

/// Loads a state file into `params`.
pub fn load_state_file(params: &ParameterSet, path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read state file '{}'", path.display()))?;
    let restored = params
        .try_load_state(&bytes)
        .with_context(|| format!("Invalid state file '{}'", path.display()))?;
    tracing::info!(path = %path.display(), restored, "loaded state");
    Ok(())
}

/// Saves `params` to a state file.
pub fn save_state_file(params: &ParameterSet, path: &Path) -> anyhow::Result<()> {
    let bytes = params.save_state()?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write state file '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "saved state");
    Ok(())
}
