use tracing::debug;

use crate::clip::{AudioClip, TARGET_SAMPLE_RATE};
use crate::decoder::decode_bytes;
use crate::{payload, resampler, AudioError};

/// Decodes a base64 audio payload into a 16kHz mono [`AudioClip`].
///
/// Runs the full chain: payload repair, base64 decode, container decode,
/// down-mix and resample.
pub fn load_clip(audio_base64: &str) -> Result<AudioClip, AudioError> {
    load_clip_with_hint(audio_base64, None)
}

/// Like [`load_clip`], with a container hint such as `"mp3"`.
pub fn load_clip_with_hint(
    audio_base64: &str,
    extension: Option<&str>,
) -> Result<AudioClip, AudioError> {
    let bytes = payload::decode(audio_base64)?;
    debug!(bytes = bytes.len(), "audio: payload decoded");

    let pcm = decode_bytes(bytes, extension)?;
    let samples = resampler::resample(&pcm.samples, pcm.sample_rate, TARGET_SAMPLE_RATE)?;
    Ok(AudioClip::new(samples, TARGET_SAMPLE_RATE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{mp3_silence, sine_i16, wav_bytes};

    #[test]
    fn load_16k_wav() {
        let wav = wav_bytes(&sine_i16(220.0, 16000, 4000, 0.3), 16000, 1);
        let clip = load_clip(&payload::encode(&wav)).unwrap();
        assert_eq!(clip.sample_rate(), TARGET_SAMPLE_RATE);
        assert_eq!(clip.len(), 4000);
    }

    #[test]
    fn load_resamples_to_16k() {
        let wav = wav_bytes(&sine_i16(220.0, 8000, 4000, 0.3), 8000, 1);
        let clip = load_clip(&payload::encode(&wav)).unwrap();
        assert_eq!(clip.sample_rate(), TARGET_SAMPLE_RATE);
        assert_eq!(clip.len(), 8000);
    }

    #[test]
    fn data_uri_and_bare_payload_decode_identically() {
        let wav = wav_bytes(&sine_i16(300.0, 16000, 2000, 0.4), 16000, 1);
        let bare = payload::encode(&wav);
        let prefixed = format!("data:audio/wav;base64,{bare}");
        assert_eq!(load_clip(&bare).unwrap(), load_clip(&prefixed).unwrap());
    }

    #[test]
    fn load_unpadded_wrapped_payload() {
        let wav = wav_bytes(&sine_i16(300.0, 16000, 1000, 0.4), 16000, 1);
        let encoded = payload::encode(&wav);
        let wrapped: String = encoded
            .trim_end_matches('=')
            .as_bytes()
            .chunks(76)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(encoded.ends_with("=="));
        assert_eq!(load_clip(&wrapped).unwrap().len(), 1000);
    }

    #[test]
    fn load_mp3_resamples_to_16k() {
        let clip = load_clip(&payload::encode(&mp3_silence(40))).unwrap();
        assert_eq!(clip.sample_rate(), TARGET_SAMPLE_RATE);
        assert!((16_000..=16_800).contains(&clip.len()), "len = {}", clip.len());
    }

    #[test]
    fn load_header_only_wav_is_empty_clip() {
        let wav = wav_bytes(&[], 16000, 1);
        assert!(load_clip(&payload::encode(&wav)).unwrap().is_empty());
    }

    #[test]
    fn load_invalid_base64() {
        assert!(matches!(load_clip("%%%%"), Err(AudioError::Decode(_))));
    }

    #[test]
    fn load_non_audio_bytes() {
        let text = payload::encode(b"this is definitely not an audio file, just some text");
        assert!(matches!(load_clip(&text), Err(AudioError::Format(_))));
    }
}
