use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::AppError;

/// Sample rate reference recordings are normalized to.
pub const REFERENCE_SAMPLE_RATE: u32 = 24_000;

/// Decode WAV bytes into mono f32 samples plus the source sample rate.
///
/// Multi-channel input is downmixed by averaging across channels.
pub fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, u32), AppError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| AppError::InvalidAudio(format!("Failed to decode audio: {}", e)))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| AppError::InvalidAudio(format!("Failed to read samples: {}", e)))?,
        SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max))
                .collect::<Result<_, _>>()
                .map_err(|e| AppError::InvalidAudio(format!("Failed to read samples: {}", e)))?
        }
    };

    let mono = if spec.channels > 1 {
        samples
            .chunks(spec.channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    } else {
        samples
    };

    Ok((mono, spec.sample_rate))
}

/// Read and decode a WAV file from disk.
pub fn load_wav(path: &Path) -> Result<(Vec<f32>, u32), AppError> {
    let bytes = std::fs::read(path)?;
    decode_wav(&bytes)
}

/// Decode uploaded audio and normalize it to mono at the given rate.
pub fn normalize(bytes: &[u8], target_rate: u32) -> Result<Vec<f32>, AppError> {
    let (mono, source_rate) = decode_wav(bytes)?;
    if mono.is_empty() {
        return Err(AppError::InvalidAudio("Recording is empty".to_string()));
    }
    resample(&mono, source_rate, target_rate)
}

/// Resample mono samples using sinc interpolation.
pub fn resample(samples: &[f32], in_rate: u32, out_rate: u32) -> Result<Vec<f32>, AppError> {
    if in_rate == out_rate {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 64,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 128,
        window: WindowFunction::Blackman2,
    };

    let chunk_size = 1024;
    let ratio = out_rate as f64 / in_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| AppError::InvalidAudio(format!("Failed to create resampler: {}", e)))?;

    let mut output = Vec::with_capacity((samples.len() as f64 * ratio) as usize + chunk_size);
    let mut pos = 0;
    while pos < samples.len() {
        let end = (pos + chunk_size).min(samples.len());
        let mut frame = samples[pos..end].to_vec();
        // Last chunk is zero-padded to the fixed input size
        frame.resize(chunk_size, 0.0);

        let mut processed = resampler
            .process(&[frame], None)
            .map_err(|e| AppError::InvalidAudio(format!("Resampling failed: {}", e)))?;
        output.append(&mut processed.remove(0));
        pos = end;
    }

    output.truncate((samples.len() as f64 * ratio).round() as usize);
    Ok(output)
}

/// Convert audio samples to 16-bit mono WAV format.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, AppError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut buffer = Vec::new();
    {
        let cursor = Cursor::new(&mut buffer);
        let mut writer = WavWriter::new(cursor, spec)
            .map_err(|e| AppError::Synthesis(format!("Failed to create WAV writer: {}", e)))?;

        for sample in samples {
            let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(scaled)
                .map_err(|e| AppError::Synthesis(format!("Failed to write sample: {}", e)))?;
        }

        writer
            .finalize()
            .map_err(|e| AppError::Synthesis(format!("Failed to finalize WAV: {}", e)))?;
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_wav(sample_rate: u32, channels: u16, seconds: f32) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut buffer = Vec::new();
        {
            let mut writer = WavWriter::new(Cursor::new(&mut buffer), spec).unwrap();
            let total = (sample_rate as f32 * seconds) as u32;
            for i in 0..total {
                let t = i as f32 / sample_rate as f32;
                let value = (t * 440.0 * 2.0 * std::f32::consts::PI).sin();
                for _ in 0..channels {
                    writer.write_sample((value * 20000.0) as i16).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        buffer
    }

    #[test]
    fn test_encode_wav_empty() {
        let wav = encode_wav(&[], 22050).unwrap();
        // Should produce valid WAV header even for empty audio
        assert!(wav.starts_with(b"RIFF"));
    }

    #[test]
    fn test_encode_wav_valid() {
        let samples: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0];
        let wav = encode_wav(&samples, 22050).unwrap();
        assert!(wav.starts_with(b"RIFF"));
        assert!(wav.len() > 44); // Header + some data
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_wav(b"definitely not a wav file"),
            Err(AppError::InvalidAudio(_))
        ));
    }

    #[test]
    fn test_normalize_downmixes_and_resamples() {
        let wav = sine_wav(44_100, 2, 1.0);
        let samples = normalize(&wav, REFERENCE_SAMPLE_RATE).unwrap();
        assert_eq!(samples.len(), REFERENCE_SAMPLE_RATE as usize);
    }

    #[test]
    fn test_normalize_same_rate_passthrough() {
        let wav = sine_wav(REFERENCE_SAMPLE_RATE, 1, 0.5);
        let samples = normalize(&wav, REFERENCE_SAMPLE_RATE).unwrap();
        assert_eq!(samples.len(), REFERENCE_SAMPLE_RATE as usize / 2);
    }

    #[test]
    fn test_normalize_rejects_empty_recording() {
        let wav = sine_wav(16_000, 1, 0.0);
        assert!(matches!(
            normalize(&wav, REFERENCE_SAMPLE_RATE),
            Err(AppError::InvalidAudio(_))
        ));
    }

    #[test]
    fn test_roundtrip_preserves_length() {
        let samples: Vec<f32> = (0..4800).map(|i| (i as f32 / 100.0).sin() * 0.3).collect();
        let wav = encode_wav(&samples, REFERENCE_SAMPLE_RATE).unwrap();
        let (decoded, rate) = decode_wav(&wav).unwrap();
        assert_eq!(rate, REFERENCE_SAMPLE_RATE);
        assert_eq!(decoded.len(), samples.len());
    }
}
