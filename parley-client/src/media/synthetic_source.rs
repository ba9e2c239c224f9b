use crate::media::{LocalStream, MediaConstraints, MediaSource, MediaTrack, TrackKind};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, trace};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

const OPUS_FRAME: Duration = Duration::from_millis(20);
const OPUS_SILENCE: [u8; 3] = [0xF8, 0xFF, 0xFE];

/// A capture-less source for headless members: an Opus track fed with silence and an
/// idle VP8 track.
#[derive(Debug, Clone)]
pub struct SyntheticMediaSource {
    stream_id: String,
}

impl SyntheticMediaSource {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
        }
    }
}

impl Default for SyntheticMediaSource {
    fn default() -> Self {
        Self::new("parley")
    }
}

#[async_trait]
impl MediaSource for SyntheticMediaSource {
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<LocalStream> {
        let mut tracks = Vec::new();

        if constraints.audio {
            let track = Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    clock_rate: 48000,
                    channels: 2,
                    ..Default::default()
                },
                "audio".to_owned(),
                self.stream_id.clone(),
            ));
            spawn_silence(Arc::downgrade(&track));
            tracks.push(MediaTrack {
                id: "audio".to_owned(),
                kind: TrackKind::Audio,
                track,
            });
        }

        if let Some(video) = constraints.video {
            debug!("Synthetic video track at {}x{}", video.width, video.height);
            let track = Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    clock_rate: 90000,
                    ..Default::default()
                },
                "video".to_owned(),
                self.stream_id.clone(),
            ));
            tracks.push(MediaTrack {
                id: "video".to_owned(),
                kind: TrackKind::Video,
                track,
            });
        }

        Ok(LocalStream {
            id: self.stream_id.clone(),
            tracks,
        })
    }
}

/// Writes Opus silence frames until the track is dropped.
fn spawn_silence(track: Weak<TrackLocalStaticSample>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(OPUS_FRAME);
        loop {
            ticker.tick().await;
            let Some(track) = track.upgrade() else { break };
            let sample = Sample {
                data: Bytes::from_static(&OPUS_SILENCE),
                duration: OPUS_FRAME,
                ..Default::default()
            };
            if let Err(e) = track.write_sample(&sample).await {
                trace!("Silence frame dropped: {}", e);
            }
        }
        debug!("Silence pump stopped");
    });
}
