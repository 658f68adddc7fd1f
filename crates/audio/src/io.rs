use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer as PcmBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::bank::SampleBuffer;
use crate::error::{AudioError, Result};

pub struct AudioDecoder;

impl AudioDecoder {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SampleBuffer> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref)?;
        let mut hint = Hint::new();
        if let Some(ext) = path_ref.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let detected = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|err| AudioError::Decode(format!("unrecognized format: {err}")))?;
        let mut format = detected.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::Decode("no audio track found".into()))?;
        let track_id = track.id;
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|err| AudioError::Decode(err.to_string()))?;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(1);

        let mut samples = Vec::new();
        loop {
            match format.next_packet() {
                Ok(packet) if packet.track_id() == track_id => match decoder.decode(&packet) {
                    Ok(decoded) => {
                        let spec = *decoded.spec();
                        sample_rate = spec.rate;
                        channels = spec.channels.count() as u16;
                        let mut pcm = PcmBuffer::<f32>::new(decoded.capacity() as u64, spec);
                        pcm.copy_interleaved_ref(decoded);
                        samples.extend_from_slice(pcm.samples());
                    }
                    // skip undecodable packet
                    Err(SymphError::DecodeError(_)) => {}
                    Err(err) => return Err(AudioError::Decode(err.to_string())),
                },
                Ok(_) => {}
                Err(SymphError::IoError(err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(err) => return Err(AudioError::Decode(err.to_string())),
            }
        }

        if samples.is_empty() {
            return Err(AudioError::Decode("stream contained no audio".into()));
        }
        Ok(SampleBuffer::new(sample_rate, channels, samples))
    }
}
