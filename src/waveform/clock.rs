//! Playback clock: a thin wrapper over the audio player.
//!
//! The clock caches the last time reported by the player, derives progress,
//! and owns the periodic tick subscription. Ticks are produced by a tokio task
//! and queued on a channel so the UI loop can apply them between input events.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use tokio::task::JoinHandle;

/// Default tick interval (10 Hz).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Read-only view of the player's position, shared with the tick task.
pub trait Timeline: Send + Sync {
    /// Current position in seconds
    fn current_time(&self) -> f64;
    /// Track length in seconds
    fn duration(&self) -> f64;
    /// Playback ran off the end of the track
    fn reached_end(&self) -> bool;
}

/// Transport operations of the external audio player.
pub trait AudioPlayer {
    fn play(&mut self) -> anyhow::Result<()>;
    fn pause(&mut self) -> anyhow::Result<()>;
    fn seek(&mut self, seconds: f64);
    fn timeline(&self) -> Arc<dyn Timeline>;
}

/// Player capability: either bound to a loaded track or absent.
pub enum PlayerHandle {
    Bound {
        player: Box<dyn AudioPlayer>,
        sample_rate: u32,
    },
    Unbound,
}

impl PlayerHandle {
    pub fn bound(player: impl AudioPlayer + 'static, sample_rate: u32) -> Self {
        Self::Bound {
            player: Box::new(player),
            sample_rate,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound { .. })
    }

    pub fn sample_rate(&self) -> Option<u32> {
        match self {
            Self::Bound { sample_rate, .. } => Some(*sample_rate),
            Self::Unbound => None,
        }
    }
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bound { sample_rate, .. } => {
                f.debug_struct("Bound").field("sample_rate", sample_rate).finish()
            }
            Self::Unbound => write!(f, "Unbound"),
        }
    }
}

/// Event delivered by the tick subscription.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockEvent {
    Tick { current_time: f64, duration: f64 },
    EndOfMedia,
}

/// Live periodic-tick registration. Dropping it stops the tick task.
pub struct TickSubscription {
    task: JoinHandle<()>,
    events: UnboundedReceiver<ClockEvent>,
    /// Events kept back by [`Self::discard_ticks`]
    held: Vec<ClockEvent>,
}

impl TickSubscription {
    /// Starts ticking `timeline` every `interval` on the current tokio runtime.
    pub fn start(timeline: Arc<dyn Timeline>, interval: Duration) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut ended = false;
            loop {
                ticker.tick().await;
                let tick = ClockEvent::Tick {
                    current_time: timeline.current_time(),
                    duration: timeline.duration(),
                };
                if tx.send(tick).is_err() {
                    break;
                }
                // Only the transition into the end state is reported.
                let at_end = timeline.reached_end();
                if at_end && !ended && tx.send(ClockEvent::EndOfMedia).is_err() {
                    break;
                }
                ended = at_end;
            }
        });
        Self {
            task,
            events,
            held: Vec::new(),
        }
    }

    /// Returns every event queued since the last call.
    pub fn drain(&mut self) -> Vec<ClockEvent> {
        let mut drained = std::mem::take(&mut self.held);
        loop {
            match self.events.try_recv() {
                Ok(event) => drained.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        drained
    }

    /// Drops queued ticks, which report a position from before a seek.
    /// End-of-media notices are kept.
    pub fn discard_ticks(&mut self) {
        let mut pending = self.drain();
        pending.retain(|event| *event == ClockEvent::EndOfMedia);
        self.held = pending;
    }
}

impl Drop for TickSubscription {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("Tick subscription released");
    }
}

/// Derives progress from a time pair, treating an unusable duration as 0.
pub fn progress(current_time: f64, duration: f64) -> f64 {
    let value = current_time / duration;
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Formats seconds as `MM:SS` (minutes within the hour).
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", (total % 3600) / 60, total % 60)
}

/// Wraps the player handle and caches the latest clock state.
pub struct PlaybackClock {
    handle: PlayerHandle,
    current_time: f64,
    duration: f64,
    subscription: Option<TickSubscription>,
}

impl PlaybackClock {
    pub fn new(handle: PlayerHandle) -> Self {
        let (current_time, duration) = match &handle {
            PlayerHandle::Bound { player, .. } => {
                let timeline = player.timeline();
                (timeline.current_time(), timeline.duration())
            }
            PlayerHandle::Unbound => (0.0, 0.0),
        };
        Self {
            handle,
            current_time,
            duration,
            subscription: None,
        }
    }

    pub fn handle(&self) -> &PlayerHandle {
        &self.handle
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.handle.sample_rate()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn progress(&self) -> f64 {
        progress(self.current_time, self.duration)
    }

    /// Stores a tick's values as the last known clock state.
    pub fn apply_tick(&mut self, current_time: f64, duration: f64) {
        self.current_time = current_time;
        self.duration = duration;
    }

    /// Starts the tick task. Without a bound player or a tokio runtime there is
    /// nothing to observe and the call is a no-op.
    pub fn subscribe(&mut self, interval: Duration) {
        let PlayerHandle::Bound { player, .. } = &self.handle else {
            tracing::debug!("Tick subscription skipped: no player bound");
            return;
        };
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!("Tick subscription skipped: no async runtime");
            return;
        }
        self.subscription = Some(TickSubscription::start(player.timeline(), interval));
        tracing::debug!("Tick subscription started ({}ms)", interval.as_millis());
    }

    pub fn unsubscribe(&mut self) {
        self.subscription = None;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn drain_events(&mut self) -> Vec<ClockEvent> {
        self.subscription
            .as_mut()
            .map(TickSubscription::drain)
            .unwrap_or_default()
    }

    /// Starts playback. Returns whether the player accepted the command.
    pub fn play(&mut self) -> bool {
        self.with_player("play", |player| player.play())
    }

    pub fn pause(&mut self) -> bool {
        self.with_player("pause", |player| player.pause())
    }

    /// Pauses and rewinds to the start of the track.
    pub fn stop(&mut self) {
        self.pause();
        self.seek(0.0);
    }

    pub fn seek(&mut self, seconds: f64) {
        if let PlayerHandle::Bound { player, .. } = &mut self.handle {
            player.seek(seconds);
            self.current_time = seconds;
            if let Some(subscription) = self.subscription.as_mut() {
                subscription.discard_ticks();
            }
        } else {
            tracing::debug!("Seek to {:.2}s ignored: no player bound", seconds);
        }
    }

    fn with_player<F>(&mut self, action: &str, f: F) -> bool
    where
        F: FnOnce(&mut dyn AudioPlayer) -> anyhow::Result<()>,
    {
        match &mut self.handle {
            PlayerHandle::Bound { player, .. } => match f(player.as_mut()) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Player {} failed: {}", action, e);
                    false
                }
            },
            PlayerHandle::Unbound => {
                tracing::debug!("Player {} ignored: no player bound", action);
                false
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Call, FakePlayer};
    use super::*;

    #[test]
    fn test_progress_guards_unusable_duration() {
        assert_eq!(progress(5.0, 10.0), 0.5);
        assert_eq!(progress(5.0, 0.0), 0.0);
        assert_eq!(progress(0.0, 0.0), 0.0);
        assert_eq!(progress(5.0, f64::NAN), 0.0);
        assert_eq!(progress(5.0, f64::INFINITY), 0.0);
        assert_eq!(progress(12.0, 10.0), 1.0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(65.9), "01:05");
        assert_eq!(format_clock(3600.0 + 125.0), "02:05");
        assert_eq!(format_clock(f64::NAN), "00:00");
        assert_eq!(format_clock(-3.0), "00:00");
    }

    #[test]
    fn test_stop_pauses_and_rewinds() {
        let player = FakePlayer::new(30.0);
        let calls = player.calls.clone();
        let mut clock = PlaybackClock::new(PlayerHandle::bound(player, 48_000));
        clock.apply_tick(12.0, 30.0);
        clock.stop();
        assert_eq!(*calls.lock().unwrap(), vec![Call::Pause, Call::Seek(0.0)]);
        assert_eq!(clock.current_time(), 0.0);
        assert_eq!(clock.progress(), 0.0);
    }

    #[test]
    fn test_unbound_clock_is_inert() {
        let mut clock = PlaybackClock::new(PlayerHandle::Unbound);
        assert!(!clock.play());
        assert!(!clock.pause());
        clock.seek(3.0);
        assert_eq!(clock.current_time(), 0.0);
        assert_eq!(clock.sample_rate(), None);
        clock.subscribe(DEFAULT_TICK_INTERVAL);
        assert!(!clock.is_subscribed());
        assert!(clock.drain_events().is_empty());
    }

    #[test]
    fn test_subscribe_without_runtime_is_noop() {
        let mut clock = PlaybackClock::new(PlayerHandle::bound(FakePlayer::new(1.0), 8000));
        clock.subscribe(DEFAULT_TICK_INTERVAL);
        assert!(!clock.is_subscribed());
    }

    #[tokio::test]
    async fn test_subscription_ticks_and_reports_end_once() {
        let player = FakePlayer::new(20.0);
        let timeline = player.timeline.clone();
        timeline.set_time(4.0);
        let mut clock = PlaybackClock::new(PlayerHandle::bound(player, 44_100));
        clock.subscribe(Duration::from_millis(5));
        assert!(clock.is_subscribed());

        tokio::time::sleep(Duration::from_millis(40)).await;
        let events = clock.drain_events();
        assert!(events.contains(&ClockEvent::Tick {
            current_time: 4.0,
            duration: 20.0
        }));
        assert!(!events.contains(&ClockEvent::EndOfMedia));

        timeline.set_ended(true);
        tokio::time::sleep(Duration::from_millis(40)).await;
        let ends = clock
            .drain_events()
            .into_iter()
            .filter(|event| *event == ClockEvent::EndOfMedia)
            .count();
        assert_eq!(ends, 1);
    }

    #[tokio::test]
    async fn test_seek_discards_stale_ticks_but_keeps_end() {
        let player = FakePlayer::new(20.0);
        let timeline = player.timeline.clone();
        timeline.set_time(4.0);
        timeline.set_ended(true);
        let mut clock = PlaybackClock::new(PlayerHandle::bound(player, 44_100));
        clock.subscribe(Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(30)).await;

        clock.seek(12.0);
        let events = clock.drain_events();
        assert_eq!(events, vec![ClockEvent::EndOfMedia]);
        assert_eq!(clock.current_time(), 12.0);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(clock.drain_events().contains(&ClockEvent::Tick {
            current_time: 12.0,
            duration: 20.0
        }));
    }

    #[tokio::test]
    async fn test_dropping_subscription_stops_task() {
        let player = FakePlayer::new(20.0);
        let timeline = player.timeline.clone();
        let mut clock = PlaybackClock::new(PlayerHandle::bound(player, 44_100));
        clock.subscribe(Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(20)).await;

        // player + task each hold the timeline while subscribed
        assert!(Arc::strong_count(&timeline) >= 3);
        clock.unsubscribe();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(Arc::strong_count(&timeline), 2);
    }
}
