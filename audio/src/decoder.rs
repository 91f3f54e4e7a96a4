//! Container and codec decoding via symphonia.
//!
//! The raw payload bytes are staged in an in-memory `Cursor` owned by the
//! media source stream. The stream lives only for the duration of
//! [`decode_bytes`] and is dropped on every return path.

use std::io::{self, Cursor};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};
use tracing::debug;

use crate::AudioError;
use crate::resampler::downmix_into;

/// Mono PCM at the source's native sample rate.
#[derive(Debug, Clone)]
pub struct DecodedPcm {
    /// Mono samples, channels averaged.
    pub samples: Vec<f32>,
    /// Native sample rate of the first audio track.
    pub sample_rate: u32,
    /// Channel count before down-mixing.
    pub channels: usize,
}

/// Decodes a complete audio file held in memory.
///
/// `extension` is an optional probe hint such as `"mp3"`; the container is
/// detected from its content either way. Corrupt packets are skipped; a
/// container that cannot be probed or has no audio track is an
/// [`AudioError::Format`].
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedPcm, AudioError> {
    if bytes.is_empty() {
        return Err(AudioError::Format("empty audio payload".to_string()));
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Format("no audio track found".to_string()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

    let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    let mut skipped = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let capacity = decoded.capacity() as u64;
                sample_rate = spec.rate;
                channels = spec.channels.count();

                let mut buf = SampleBuffer::<f32>::new(capacity, spec);
                buf.copy_interleaved_ref(decoded);
                downmix_into(buf.samples(), channels, &mut samples);
            }
            Err(SymphoniaError::DecodeError(e)) => {
                skipped += 1;
                debug!("audio: skipping corrupt packet: {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if sample_rate == 0 {
        return Err(AudioError::Format("unknown sample rate".to_string()));
    }

    debug!(
        samples = samples.len(),
        sample_rate, channels, skipped, "audio: decoded payload"
    );

    Ok(DecodedPcm {
        samples,
        sample_rate,
        channels,
    })
}
