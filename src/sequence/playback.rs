//! Cooperative playback.
//!
//! Playback never sleeps or spawns. [`Sequencer::play`] arms a run and hands back a token; the
//! host calls [`Sequencer::tick`] with that token from its timer or event loop, shows the returned
//! pixels, and schedules the next tick after [`PlaybackStep::hold`]. Stopping (or starting a new
//! run) invalidates the token, so a tick that was already scheduled finds the run gone and renders
//! nothing.

use std::time::Duration;

use crate::foundation::core::Viewport;
use crate::foundation::error::{StickgridError, StickgridResult};
use crate::render::compositor::{PixelBuffer, RenderSettings};
use crate::sequence::sequencer::Sequencer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Identifies one playback run.
pub struct PlaybackToken(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
/// One rendered playback step.
pub struct PlaybackStep {
    /// Entry that was rendered.
    pub index: usize,
    /// Pixels to show.
    pub pixels: PixelBuffer,
    /// How long to keep them on screen before the next tick.
    pub hold: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Observable playback state.
pub enum PlaybackStatus {
    /// Nothing is playing.
    Idle,
    /// A run is active; `next` is the entry the next tick renders.
    Playing {
        /// Entry rendered by the next tick.
        next: usize,
        /// Whether the run restarts at the first entry after the last.
        looping: bool,
    },
}

#[derive(Clone, Debug)]
struct ActiveRun {
    token: u64,
    next: usize,
    looping: bool,
    viewport: Option<Viewport>,
    settings: RenderSettings,
}

#[derive(Debug, Default)]
pub(crate) struct Playback {
    generation: u64,
    run: Option<ActiveRun>,
}

impl Sequencer {
    /// Start playback from the first entry, stopping any active run first.
    ///
    /// The viewport is resolved once here: the union viewport under a locking policy, otherwise
    /// per frame at each tick.
    pub fn play(
        &mut self,
        looping: bool,
        settings: RenderSettings,
    ) -> StickgridResult<PlaybackToken> {
        self.stop();
        if self.is_empty() {
            return Err(StickgridError::invalid_argument(
                "cannot play an empty sequence",
            ));
        }
        settings.validate()?;

        let viewport = self.locked_viewport();
        self.playback.generation += 1;
        let token = self.playback.generation;
        self.playback.run = Some(ActiveRun {
            token,
            next: 0,
            looping,
            viewport,
            settings,
        });
        tracing::debug!(token, looping, ?viewport, "playback started");
        Ok(PlaybackToken(token))
    }

    /// Stop the active run, if any. Pending ticks become no-ops.
    pub fn stop(&mut self) {
        if let Some(run) = self.playback.run.take() {
            tracing::debug!(token = run.token, "playback stopped");
        }
    }

    /// Current playback state.
    pub fn playback_status(&self) -> PlaybackStatus {
        match &self.playback.run {
            Some(run) => PlaybackStatus::Playing {
                next: run.next,
                looping: run.looping,
            },
            None => PlaybackStatus::Idle,
        }
    }

    /// Render the next step of the run identified by `token`.
    ///
    /// Returns `Ok(None)` when the run was stopped, replaced or has finished. A render failure
    /// ends the run and is returned; the entries are left untouched.
    pub fn tick(&mut self, token: PlaybackToken) -> StickgridResult<Option<PlaybackStep>> {
        let len = self.entries().len();
        let Some(run) = self.playback.run.as_mut() else {
            return Ok(None);
        };
        if run.token != token.0 {
            return Ok(None);
        }

        if run.next >= len {
            // Entries were removed since the last tick.
            if run.looping && len > 0 {
                run.next = 0;
            } else {
                self.playback.run = None;
                return Ok(None);
            }
        }

        let index = run.next;
        let viewport = run.viewport;
        let settings = run.settings;
        let rendered = self
            .viewport_with(index, viewport)
            .and_then(|vp| self.render_entry(index, &settings, Some(vp)));
        let pixels = match rendered {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(index, error = %e, "playback aborted");
                self.playback.run = None;
                return Err(e);
            }
        };
        let hold = Duration::from_millis(u64::from(self.entries()[index].duration_ms));

        if let Some(run) = self.playback.run.as_mut() {
            if index + 1 < len {
                run.next = index + 1;
            } else if run.looping {
                run.next = 0;
            } else {
                self.playback.run = None;
            }
        }

        Ok(Some(PlaybackStep {
            index,
            pixels,
            hold,
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/playback.rs"]
mod tests;
