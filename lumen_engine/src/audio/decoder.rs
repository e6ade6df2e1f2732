//! Audio file decoding to interleaved signed 16-bit PCM.
//!
//! The container is chosen from the file extension alone:
//!
//! - `.wav` (hound)
//! - `.flac` (claxon)
//! - `.mp3` (symphonia)
//! - `.ogg` Vorbis (lewton)
//!
//! Any other extension is rejected before the file is opened.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use crate::error::Result;
use crate::{engine_bail, engine_err};

const SOURCE: &str = "lumen::AudioDecoder";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioContainer {
    Wav,
    Flac,
    Mp3,
    Ogg,
}

impl AudioContainer {
    /// Container for the extension of `path`, case-insensitive
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "wav" => Some(AudioContainer::Wav),
            "flac" => Some(AudioContainer::Flac),
            "mp3" => Some(AudioContainer::Mp3),
            "ogg" => Some(AudioContainer::Ogg),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            AudioContainer::Wav => "wav",
            AudioContainer::Flac => "flac",
            AudioContainer::Mp3 => "mp3",
            AudioContainer::Ogg => "ogg",
        }
    }
}

impl fmt::Display for AudioContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Fully decoded audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    samples: Vec<i16>,
    channels: u16,
    sample_rate: u32,
}

impl DecodedAudio {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let Some(container) = AudioContainer::from_path(path) else {
            engine_bail!(SOURCE, Unsupported, "No audio decoder for '{}'", path.display());
        };

        let decoded = match container {
            AudioContainer::Wav => decode_wav(path),
            AudioContainer::Flac => decode_flac(path),
            AudioContainer::Mp3 => decode_mp3(path),
            AudioContainer::Ogg => decode_ogg(path),
        };
        let decoded = decoded.map_err(|message| {
            engine_err!(SOURCE, DecodeFailed, "Failed to decode {} '{}': {}", container, path.display(), message)
        })?;

        crate::engine_debug!(
            SOURCE,
            "Decoded '{}': {} channels, {} Hz, {} frames",
            path.display(),
            decoded.channels,
            decoded.sample_rate,
            decoded.frame_count()
        );
        Ok(decoded)
    }

    /// Wrap interleaved samples; the length must be a whole number of frames
    pub fn from_pcm(samples: Vec<i16>, channels: u16, sample_rate: u32) -> Result<Self> {
        Self::validated(samples, channels, sample_rate)
            .map_err(|message| engine_err!(SOURCE, DecodeFailed, "{}", message))
    }

    fn validated(samples: Vec<i16>, channels: u16, sample_rate: u32) -> std::result::Result<Self, String> {
        if channels == 0 || sample_rate == 0 {
            return Err(format!("invalid layout: {} channels at {} Hz", channels, sample_rate));
        }
        if samples.len() % channels as usize != 0 {
            return Err(format!("{} samples do not divide into {} channels", samples.len(), channels));
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples per channel
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }
}

type DecodeResult = std::result::Result<DecodedAudio, String>;

/// Rescale a signed sample of `bits` bits to 16 bits
fn to_i16(sample: i32, bits: u32) -> i16 {
    if bits > 16 {
        (sample >> (bits - 16)) as i16
    } else {
        (sample << (16 - bits)) as i16
    }
}

fn decode_wav(path: &Path) -> DecodeResult {
    let mut reader = hound::WavReader::open(path).map_err(|e| e.to_string())?;
    let spec = reader.spec();

    let samples: std::result::Result<Vec<i16>, hound::Error> = match spec.sample_format {
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader.samples::<i16>().collect(),
            bits @ (8 | 24 | 32) => reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| to_i16(s, bits as u32)))
                .collect(),
            bits => return Err(format!("unsupported bit depth {}", bits)),
        },
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map(|s| (s.clamp(-1.0, 1.0) * 32767.0) as i16))
            .collect(),
    };

    DecodedAudio::validated(samples.map_err(|e| e.to_string())?, spec.channels, spec.sample_rate)
}

fn decode_flac(path: &Path) -> DecodeResult {
    let mut reader = claxon::FlacReader::open(path).map_err(|e| e.to_string())?;
    let info = reader.streaminfo();

    let samples = reader
        .samples()
        .map(|sample| sample.map(|s| to_i16(s, info.bits_per_sample)))
        .collect::<std::result::Result<Vec<i16>, claxon::Error>>()
        .map_err(|e| e.to_string())?;

    DecodedAudio::validated(samples, info.channels as u16, info.sample_rate)
}

fn decode_ogg(path: &Path) -> DecodeResult {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut reader = lewton::inside_ogg::OggStreamReader::new(BufReader::new(file)).map_err(|e| e.to_string())?;
    let channels = reader.ident_hdr.audio_channels as u16;
    let sample_rate = reader.ident_hdr.audio_sample_rate;

    let mut samples = Vec::new();
    while let Some(packet) = reader.read_dec_packet_itl().map_err(|e| e.to_string())? {
        samples.extend(packet);
    }

    DecodedAudio::validated(samples, channels, sample_rate)
}

fn decode_mp3(path: &Path) -> DecodeResult {
    use symphonia::core::audio::SampleBuffer;
    use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
    use symphonia::core::errors::Error as SymphoniaError;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let file = File::open(path).map_err(|e| e.to_string())?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");
    let probed = symphonia::default::get_probe()
        .format(&hint, stream, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| e.to_string())?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| "no audio track".to_string())?;
    let track_id = track.id;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| e.to_string())?;

    let mut samples = Vec::new();
    let mut channels = 0;
    let mut sample_rate = 0;
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.to_string()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // A corrupt frame is dropped, the stream goes on
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.to_string()),
        };
        let spec = *decoded.spec();
        channels = spec.channels.count() as u16;
        sample_rate = spec.rate;

        let mut buffer = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    DecodedAudio::validated(samples, channels, sample_rate)
}

#[cfg(test)]
#[path = "decoder_tests.rs"]
mod tests;
