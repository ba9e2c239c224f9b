use crate::media::{LocalStream, MediaConstraints, MediaSource};
use parley_core::SignalingError;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// The member's single local stream.
///
/// The source is asked at most once; both the stream and a failure are kept, so every
/// session reuses the same tracks and a refused device is never asked again.
pub struct LocalMedia {
    source: Arc<dyn MediaSource>,
    constraints: MediaConstraints,
    stream: OnceCell<Result<LocalStream, SignalingError>>,
}

impl LocalMedia {
    pub fn new(source: Arc<dyn MediaSource>, constraints: MediaConstraints) -> Self {
        Self {
            source,
            constraints,
            stream: OnceCell::new(),
        }
    }

    pub async fn acquire(&self) -> Result<LocalStream, SignalingError> {
        self.stream
            .get_or_init(|| async {
                match self.source.acquire(&self.constraints).await {
                    Ok(stream) => {
                        info!(
                            "Local stream '{}' ready with {} track(s)",
                            stream.id,
                            stream.tracks.len()
                        );
                        Ok(stream)
                    }
                    Err(e) => {
                        error!("Could not get user media: {:#}", e);
                        Err(SignalingError::MediaUnavailable(format!("{:#}", e)))
                    }
                }
            })
            .await
            .clone()
    }

    pub fn is_settled(&self) -> bool {
        self.stream.initialized()
    }
}
