//! Audio file decoding with Symphonia
//!
//! Feeds a [`WaveformModel`] packet by packet, the same way a streaming
//! decoder would: `begin_decoding`, one `append_buffer` per packet,
//! `finish_decoding`.

use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::config::WaveformConfig;
use crate::error::{Result, WaveformError};
use crate::model::WaveformModel;
use crate::pcm::{PcmBuffer, PcmSamples};

/// File extensions the decoder is expected to handle
const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "m4a", "aac", "opus"];

/// Whether `path` looks like a file the decoder can read
pub fn supports_format(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Decode `path` into a fresh model laid out `width` pixels wide
pub fn load_file(path: &Path, config: WaveformConfig, width: u32) -> Result<WaveformModel> {
    let mut model = WaveformModel::new(config);
    model.resize(width);
    decode_into(&mut model, path)?;
    Ok(model)
}

/// Decode `path` into `model`, replacing any audio it held
///
/// Recoverable packet errors are skipped. A file that yields no audio at
/// all is an error.
pub fn decode_into(model: &mut WaveformModel, path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(WaveformError::FileNotFound(path.display().to_string()));
    }

    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| WaveformError::Symphonia(format!("Failed to probe file: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| WaveformError::decode("No audio tracks found"))?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);
    let duration_ms = track
        .codec_params
        .n_frames
        .map(|frames| frames * 1000 / u64::from(sample_rate.max(1)));

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| WaveformError::Symphonia(format!("Failed to create decoder: {}", e)))?;

    debug!(
        "Decoding {} ({} Hz, {:?}ms)",
        path.display(),
        sample_rate,
        duration_ms
    );

    model.begin_decoding();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut frames = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => {
                model.finish_decoding();
                return Err(WaveformError::Symphonia(format!(
                    "Error reading packet: {}",
                    e
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping undecodable packet in {}: {}", path.display(), e);
                continue;
            }
            Err(e) => {
                model.finish_decoding();
                return Err(WaveformError::decode(e.to_string()));
            }
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        let needed = decoded.capacity() * channels;

        if !matches!(&sample_buf, Some(buf) if buf.capacity() >= needed) {
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        let pcm = PcmBuffer::new(PcmSamples::F32(buf.samples()), channels as u16, spec.rate);
        frames += pcm.frames();
        model.append_buffer(&pcm, duration_ms);
    }

    model.finish_decoding();

    if frames == 0 {
        return Err(WaveformError::Empty(path.display().to_string()));
    }
    debug!("Decoded {} frames from {}", frames, path.display());
    Ok(())
}
