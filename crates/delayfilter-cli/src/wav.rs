//! Stereo WAV reading and writing via `hound`.

use anyhow::Context;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Planar stereo audio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoSamples {
    /// Left channel.
    pub left: Vec<f32>,
    /// Right channel.
    pub right: Vec<f32>,
}

impl StereoSamples {
    /// Number of frames.
    pub fn len(&self) -> usize {
        self.left.len().min(self.right.len())
    }

    /// Whether there are no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Peak absolute sample across both channels.
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(self.right.iter())
            .map(|s| s.abs())
            .fold(0.0, f32::max)
    }

    /// RMS across both channels.
    pub fn rms(&self) -> f32 {
        let count = self.left.len() + self.right.len();
        if count == 0 {
            return 0.0;
        }
        let sum: f32 = self.left.iter().chain(self.right.iter()).map(|s| s * s).sum();
        (sum / count as f32).sqrt()
    }
}

/// Sample rate and bit depth of a file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Channels in the source file.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
}

/// Reads a WAV file as stereo.
///
/// Mono files are duplicated to both channels. Files with more than two
/// channels keep only the first two.
pub fn read_wav_stereo(path: &Path) -> anyhow::Result<(StereoSamples, WavSpec)> {
    let reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file '{}'", path.display()))?;
    let hound_spec = reader.spec();
    let spec = WavSpec {
        channels: hound_spec.channels,
        sample_rate: hound_spec.sample_rate,
        bits_per_sample: hound_spec.bits_per_sample,
    };
    let channels = usize::from(spec.channels.max(1));

    let all_samples: Vec<f32> = match hound_spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let stereo = if channels == 1 {
        StereoSamples {
            left: all_samples.clone(),
            right: all_samples,
        }
    } else {
        let frames = all_samples.len() / channels;
        let mut left = Vec::with_capacity(frames);
        let mut right = Vec::with_capacity(frames);
        for frame in all_samples.chunks_exact(channels) {
            left.push(frame[0]);
            right.push(frame[1]);
        }
        StereoSamples { left, right }
    };

    Ok((stereo, spec))
}

/// Writes stereo samples. 32 bits writes IEEE float, 16 and 24 write PCM.
pub fn write_wav_stereo(
    path: &Path,
    samples: &StereoSamples,
    sample_rate: u32,
    bits_per_sample: u16,
) -> anyhow::Result<()> {
    let hound_spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample,
        sample_format: if bits_per_sample == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    let mut writer = WavWriter::create(path, hound_spec)
        .with_context(|| format!("Failed to create WAV file '{}'", path.display()))?;

    if bits_per_sample == 32 {
        for (l, r) in samples.left.iter().zip(samples.right.iter()) {
            writer.write_sample(*l)?;
            writer.write_sample(*r)?;
        }
    } else {
        let max_val = (1i32 << (bits_per_sample - 1)) as f32;
        for (l, r) in samples.left.iter().zip(samples.right.iter()) {
            let int_l = (*l * max_val).clamp(-max_val, max_val - 1.0) as i32;
            let int_r = (*r * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_l)?;
            writer.write_sample(int_r)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn write_mono(path: &Path, samples: &[f32]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn mono_is_duplicated() {
        let file = NamedTempFile::new().unwrap();
        write_mono(file.path(), &[0.1, -0.2, 0.3]);

        let (stereo, spec) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(stereo.left, vec![0.1, -0.2, 0.3]);
        assert_eq!(stereo.left, stereo.right);
    }

    #[test]
    fn roundtrip_f32() {
        let samples = StereoSamples {
            left: (0..1000).map(|i| (i as f32 / 1000.0).sin()).collect(),
            right: (0..1000).map(|i| -(i as f32 / 1000.0).sin()).collect(),
        };
        let file = NamedTempFile::new().unwrap();
        write_wav_stereo(file.path(), &samples, 48000, 32).unwrap();

        let (loaded, spec) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(loaded, samples);
    }

    #[test]
    fn roundtrip_i24() {
        let samples = StereoSamples {
            left: (0..1000).map(|i| (i as f32 / 100.0).sin() * 0.9).collect(),
            right: vec![0.25; 1000],
        };
        let file = NamedTempFile::new().unwrap();
        write_wav_stereo(file.path(), &samples, 44100, 24).unwrap();

        let (loaded, spec) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(spec.bits_per_sample, 24);
        assert_eq!(loaded.len(), 1000);
        for (a, b) in samples.left.iter().zip(loaded.left.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn stats() {
        let samples = StereoSamples {
            left: vec![0.5, -0.5],
            right: vec![0.5, -1.0],
        };
        assert_eq!(samples.peak(), 1.0);
        assert!((samples.rms() - (1.75f32 / 4.0).sqrt()).abs() < 1e-6);
        assert!(StereoSamples::default().is_empty());
    }
}
