// Voice quality analysis
//
// Clarity is a weighted blend of loudness, dynamic range and how much of the
// chunk is near-silent.

use anyhow::{anyhow, Result};
use log::warn;
use std::io::Cursor;

use super::types::{clamp01, QualityLabel, VoiceQualitySample};

/// Amplitude below which a sample counts as silence
const SILENCE_THRESHOLD: f32 = 0.01;

const VOLUME_WEIGHT: f32 = 0.4;
const SNR_WEIGHT: f32 = 0.3;
const CONSISTENCY_WEIGHT: f32 = 0.3;

/// Score a mono waveform. Empty or non-finite input yields the error sentinel.
pub fn analyze_samples(samples: &[f32]) -> VoiceQualitySample {
    if samples.is_empty() || samples.iter().any(|s| !s.is_finite()) {
        return VoiceQualitySample::error();
    }

    let len = samples.len() as f32;
    let rms = (samples.iter().map(|&x| x * x).sum::<f32>() / len).sqrt();
    let peak = samples
        .iter()
        .fold(0.0f32, |max, &sample| max.max(sample.abs()));
    let silent = samples
        .iter()
        .filter(|s| s.abs() < SILENCE_THRESHOLD)
        .count() as f32;
    let silence_ratio = silent / len;

    let volume_score = clamp01(rms * 20.0);
    let snr_score = clamp01((peak - rms) * 10.0);
    let consistency_score = clamp01(1.0 - silence_ratio * 2.0);

    let clarity = clamp01(
        VOLUME_WEIGHT * volume_score + SNR_WEIGHT * snr_score + CONSISTENCY_WEIGHT * consistency_score,
    );

    crate::perf_debug!(
        "Voice quality: rms={:.4} peak={:.4} silence={:.2} clarity={:.3}",
        rms,
        peak,
        silence_ratio,
        clarity
    );

    VoiceQualitySample {
        clarity,
        label: QualityLabel::from_clarity(clarity),
        volume: volume_score,
        confidence: clarity,
    }
}

/// Decode an encoded audio chunk and score it.
///
/// Never fails: malformed audio is logged and reported as the error sentinel
/// so the live view is never held up by one bad chunk.
pub fn analyze_audio(encoded: &[u8]) -> VoiceQualitySample {
    match decode_wav_mono(encoded) {
        Ok(samples) => analyze_samples(&samples),
        Err(e) => {
            warn!("Could not decode audio chunk ({} bytes): {}", encoded.len(), e);
            VoiceQualitySample::error()
        }
    }
}

/// Decode WAV bytes to mono f32 samples in [-1, 1]
pub fn decode_wav_mono(encoded: &[u8]) -> Result<Vec<f32>> {
    let reader = hound::WavReader::new(Cursor::new(encoded))
        .map_err(|e| anyhow!("invalid WAV data: {}", e))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| anyhow!("failed to read float samples: {}", e))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| anyhow!("failed to read integer samples: {}", e))?
        }
    };

    if interleaved.is_empty() {
        return Err(anyhow!("audio chunk contains no samples"));
    }

    if channels == 1 {
        return Ok(interleaved);
    }

    Ok(interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect())
}

/// Session-level clarity: mean over decodable samples, 0.5 with nothing to average
pub fn calculate_voice_clarity(history: &[VoiceQualitySample]) -> f32 {
    let valid: Vec<f32> = history
        .iter()
        .filter(|s| !s.is_error())
        .map(|s| s.clarity)
        .collect();

    if valid.is_empty() {
        return 0.5;
    }

    clamp01(valid.iter().sum::<f32>() / valid.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(samples: &[i16], channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_silence_scores_very_poor() {
        let sample = analyze_samples(&vec![0.0; 1600]);
        assert_eq!(sample.clarity, 0.0);
        assert_eq!(sample.label, QualityLabel::VeryPoor);
        assert_eq!(sample.volume, 0.0);
    }

    #[test]
    fn test_clear_speech_like_signal() {
        // 0.5 amplitude square-ish wave: rms 0.5, peak 0.5, no silence
        let samples: Vec<f32> = (0..1600)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        let sample = analyze_samples(&samples);
        // volume 1.0, snr 0.0, consistency 1.0
        assert!((sample.clarity - 0.7).abs() < 1e-5);
        assert_eq!(sample.label, QualityLabel::Good);
        assert_eq!(sample.confidence, sample.clarity);
    }

    #[test]
    fn test_empty_and_non_finite_input_is_error() {
        assert!(analyze_samples(&[]).is_error());
        assert!(analyze_samples(&[0.1, f32::NAN]).is_error());
    }

    #[test]
    fn test_malformed_audio_is_error_sentinel() {
        let sample = analyze_audio(b"definitely not a wav file");
        assert_eq!(sample, VoiceQualitySample::error());
        assert!(analyze_audio(&[]).is_error());
    }

    #[test]
    fn test_decode_wav_downmixes_stereo() {
        let bytes = wav_bytes(&[16384, 0, -16384, 0], 2);
        let mono = decode_wav_mono(&bytes).unwrap();
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.25).abs() < 1e-4);
        assert!((mono[1] + 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_analyze_audio_decodes_wav() {
        let samples: Vec<i16> = (0..3200).map(|i| if i % 2 == 0 { 8000 } else { -8000 }).collect();
        let sample = analyze_audio(&wav_bytes(&samples, 1));
        assert!(!sample.is_error());
        assert!(sample.clarity > 0.6);
    }

    #[test]
    fn test_voice_clarity_history() {
        assert_eq!(calculate_voice_clarity(&[]), 0.5);
        assert_eq!(calculate_voice_clarity(&[VoiceQualitySample::error()]), 0.5);

        let good = VoiceQualitySample {
            clarity: 0.8,
            label: QualityLabel::Good,
            volume: 0.9,
            confidence: 0.8,
        };
        let fair = VoiceQualitySample {
            clarity: 0.4,
            label: QualityLabel::Poor,
            volume: 0.3,
            confidence: 0.4,
        };
        let avg = calculate_voice_clarity(&[good, VoiceQualitySample::error(), fair]);
        assert!((avg - 0.6).abs() < 1e-6);
    }
}
