//! Background clip delivery.
//!
//! A [`ClipSource`] receives [`ClipRequest`]s and answers each one exactly
//! once through [`ClipRequest::complete`], from whatever thread it likes.
//! Completions travel over a `flume` channel and are drained by the owning
//! controller at the start of a frame.

use flume::Sender;

use crate::animation::clip::AnimationClip;
use crate::errors::Result;

/// Something that can fetch animation clips in the background.
pub trait ClipSource: Send + Sync {
    /// Starts fetching `request.url`. Must not block.
    fn fetch_clip(&self, request: ClipRequest);
}

/// A pending fetch for the clip registered under `name`.
#[derive(Debug)]
pub struct ClipRequest {
    pub name: String,
    pub url: String,
    reply: Sender<ClipLoaded>,
}

/// Outcome of a [`ClipRequest`].
#[derive(Debug)]
pub struct ClipLoaded {
    pub name: String,
    pub result: Result<AnimationClip>,
}

impl ClipRequest {
    #[must_use]
    pub fn new(name: &str, url: &str, reply: Sender<ClipLoaded>) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            reply,
        }
    }

    /// Delivers the outcome and returns whether the requester received it.
    /// If the requester is gone (its character was despawned) the result is
    /// dropped.
    pub fn complete(self, result: Result<AnimationClip>) -> bool {
        let loaded = ClipLoaded {
            name: self.name,
            result,
        };
        match self.reply.send(loaded) {
            Ok(()) => true,
            Err(flume::SendError(stale)) => {
                log::debug!("Discarding clip '{}': requester is gone", stale.name);
                false
            }
        }
    }

    /// True once the requester has dropped its end of the channel.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.reply.is_disconnected()
    }
}
