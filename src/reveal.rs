//! Single-fire reveal transition.
//!
//! One gesture unmutes and starts the companion video, fires the heartbeat
//! and flips the state to `Revealed`. There is no way back to `Idle`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::audio::HeartbeatPlayer;
use crate::error::Result;
use crate::params::{BeatEvent, HEARTBEAT_PATTERN};

/// UI transition state read by the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionState {
    #[default]
    Idle,
    /// Terminal
    Revealed,
}

/// Externally owned video playback handle
pub trait VideoPlayback: Send {
    fn set_muted(&mut self, muted: bool);

    /// Request playback start; failure is `RevealError::PlaybackDenied`
    ///
    /// Implementations whose start resolves later may return `Ok` and
    /// drop the eventual rejection themselves.
    fn play(&mut self) -> Result<()>;
}

struct Inner<V> {
    state: TransitionState,
    /// Set by the first effective trigger, before `state` flips
    fired: bool,
    video: Option<V>,
}

/// Gates the Idle -> Revealed transition and its side effects
pub struct TransitionController<V, P> {
    inner: Mutex<Inner<V>>,
    player: P,
    pattern: Vec<BeatEvent>,
}

impl<V: VideoPlayback, P: HeartbeatPlayer> TransitionController<V, P> {
    /// Controller with no video attached yet, playing the heartbeat pattern
    pub fn new(player: P) -> Self {
        Self::with_pattern(player, &HEARTBEAT_PATTERN)
    }

    pub fn with_pattern(player: P, pattern: &[BeatEvent]) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: TransitionState::Idle,
                fired: false,
                video: None,
            }),
            player,
            pattern: pattern.to_vec(),
        }
    }

    /// Builder form of `attach_video`
    pub fn with_video(self, video: V) -> Self {
        self.attach_video(video);
        self
    }

    /// Make the video handle available (e.g. once the element is mounted)
    pub fn attach_video(&self, video: V) {
        self.lock().video = Some(video);
    }

    pub fn state(&self) -> TransitionState {
        self.lock().state
    }

    pub fn is_revealed(&self) -> bool {
        self.state() == TransitionState::Revealed
    }

    /// Read access to the attached video handle
    pub fn with_video_ref<R>(&self, f: impl FnOnce(Option<&V>) -> R) -> R {
        f(self.lock().video.as_ref())
    }

    /// Fire the reveal; a no-op unless Idle with a video attached
    ///
    /// The check and the claim happen under one lock, so rapid repeated
    /// triggers cannot both fire. The lock is not held while the heartbeat
    /// acquires its audio output, so `state()` readers and repeated triggers
    /// never wait on the device. Neither video start nor the heartbeat is
    /// awaited.
    pub fn trigger(&self) {
        {
            let mut inner = self.lock();
            if inner.fired || inner.state != TransitionState::Idle {
                return;
            }
            let Some(video) = inner.video.as_mut() else {
                return;
            };

            video.set_muted(false);
            if let Err(e) = video.play() {
                tracing::debug!(error = %e, "video playback start ignored");
            }
            inner.fired = true;
        }

        self.player.play_heartbeat(&self.pattern);

        self.lock().state = TransitionState::Revealed;
        tracing::debug!("revealed");
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioBackend, AudioOutput, AudioSessionManager, ManualTimer};
    use crate::error::RevealError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    #[derive(Default)]
    struct CallLog {
        unmuted: AtomicUsize,
        played: AtomicUsize,
    }

    struct FakeVideo {
        log: Arc<CallLog>,
        muted: bool,
        deny: bool,
    }

    impl FakeVideo {
        fn new(log: &Arc<CallLog>) -> Self {
            Self {
                log: Arc::clone(log),
                muted: true,
                deny: false,
            }
        }
    }

    impl VideoPlayback for FakeVideo {
        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
            if !muted {
                self.log.unmuted.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn play(&mut self) -> Result<()> {
            self.log.played.fetch_add(1, Ordering::SeqCst);
            if self.deny {
                return Err(RevealError::PlaybackDenied("autoplay policy".into()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingPlayer {
        calls: Mutex<Vec<Vec<BeatEvent>>>,
    }

    impl HeartbeatPlayer for RecordingPlayer {
        fn play_heartbeat(&self, pattern: &[BeatEvent]) {
            self.calls.lock().unwrap().push(pattern.to_vec());
        }
    }

    struct NoAudio;

    impl AudioBackend for NoAudio {
        fn open(&self) -> Result<Box<dyn AudioOutput>> {
            Err(RevealError::AudioUnavailable("denied".into()))
        }
    }

    #[test]
    fn test_single_trigger_fires_every_effect_once() {
        let log = Arc::new(CallLog::default());
        let player = Arc::new(RecordingPlayer::default());
        let controller =
            TransitionController::new(Arc::clone(&player)).with_video(FakeVideo::new(&log));

        assert_eq!(controller.state(), TransitionState::Idle);
        controller.trigger();

        assert!(controller.is_revealed());
        assert_eq!(log.unmuted.load(Ordering::SeqCst), 1);
        assert_eq!(log.played.load(Ordering::SeqCst), 1);
        let calls = player.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], HEARTBEAT_PATTERN.to_vec());
        controller.with_video_ref(|video| assert!(!video.unwrap().muted));
    }

    #[test]
    fn test_repeated_triggers_have_no_further_effect() {
        let log = Arc::new(CallLog::default());
        let player = Arc::new(RecordingPlayer::default());
        let controller =
            TransitionController::new(Arc::clone(&player)).with_video(FakeVideo::new(&log));

        for _ in 0..10 {
            controller.trigger();
        }

        assert!(controller.is_revealed());
        assert_eq!(log.unmuted.load(Ordering::SeqCst), 1);
        assert_eq!(log.played.load(Ordering::SeqCst), 1);
        assert_eq!(player.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_triggers_reveal_once() {
        let log = Arc::new(CallLog::default());
        let player = Arc::new(RecordingPlayer::default());
        let controller = Arc::new(
            TransitionController::new(Arc::clone(&player)).with_video(FakeVideo::new(&log)),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let controller = Arc::clone(&controller);
                std::thread::spawn(move || controller.trigger())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.played.load(Ordering::SeqCst), 1);
        assert_eq!(player.calls.lock().unwrap().len(), 1);
    }

    /// Holds `play_heartbeat` open until released, as a slow device would
    struct GatedPlayer {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
        calls: AtomicUsize,
    }

    impl HeartbeatPlayer for GatedPlayer {
        fn play_heartbeat(&self, _pattern: &[BeatEvent]) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
        }
    }

    #[test]
    fn test_slow_audio_acquisition_does_not_block_readers() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let player = Arc::new(GatedPlayer {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
            calls: AtomicUsize::new(0),
        });
        let log = Arc::new(CallLog::default());
        let controller = Arc::new(
            TransitionController::new(Arc::clone(&player)).with_video(FakeVideo::new(&log)),
        );

        let gesture = {
            let controller = Arc::clone(&controller);
            std::thread::spawn(move || controller.trigger())
        };
        entered_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("heartbeat never started");

        // Heartbeat still in flight: reads and repeated gestures return at once
        assert_eq!(controller.state(), TransitionState::Idle);
        controller.trigger();
        assert_eq!(log.played.load(Ordering::SeqCst), 1);

        release_tx.send(()).unwrap();
        gesture.join().unwrap();
        assert!(controller.is_revealed());
        assert_eq!(player.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_video_means_no_transition() {
        let player = Arc::new(RecordingPlayer::default());
        let controller: TransitionController<FakeVideo, _> =
            TransitionController::new(Arc::clone(&player));

        controller.trigger();
        assert_eq!(controller.state(), TransitionState::Idle);
        assert!(player.calls.lock().unwrap().is_empty());

        // The handle arriving later makes the gesture effective
        let log = Arc::new(CallLog::default());
        controller.attach_video(FakeVideo::new(&log));
        controller.trigger();
        assert!(controller.is_revealed());
    }

    #[test]
    fn test_playback_denied_still_reveals() {
        let log = Arc::new(CallLog::default());
        let player = Arc::new(RecordingPlayer::default());
        let mut video = FakeVideo::new(&log);
        video.deny = true;
        let controller = TransitionController::new(Arc::clone(&player)).with_video(video);

        controller.trigger();

        assert!(controller.is_revealed());
        assert_eq!(player.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_audio_unavailable_still_reveals() {
        let log = Arc::new(CallLog::default());
        let timer = Arc::new(ManualTimer::new());
        let manager = Arc::new(AudioSessionManager::new(Arc::new(NoAudio), timer.clone()));
        let controller =
            TransitionController::new(Arc::clone(&manager)).with_video(FakeVideo::new(&log));

        controller.trigger();

        assert!(controller.is_revealed());
        assert_eq!(manager.sessions_started(), 0);
        assert!(!manager.has_live_session());
        assert!(timer.pending_deadlines().is_empty());
    }
}
