use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: Option<VideoConstraints>,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: Some(VideoConstraints {
                width: 1280,
                height: 720,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// One local track, shareable across every peer link of the member.
#[derive(Clone)]
pub struct MediaTrack {
    pub id: String,
    pub kind: TrackKind,
    pub track: Arc<TrackLocalStaticSample>,
}

impl fmt::Debug for MediaTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LocalStream {
    pub id: String,
    pub tracks: Vec<MediaTrack>,
}

/// Camera/microphone access.
#[async_trait]
pub trait MediaSource: Send + Sync + 'static {
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<LocalStream>;
}
