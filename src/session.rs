//! The prayer schedule session.
//!
//! [`SessionCore`] is the single-owner state machine: it holds the day's
//! schedule, the tracked next prayer, the countdown and the notification
//! gate, and mutates them only through `load` and `tick` with an
//! explicit `now`. [`PrayerScheduleSession`] wraps a core in a spawned
//! actor task that owns the 1 Hz ticker; `load`/`stop` arrive over a
//! command channel so all state stays confined to that one task.

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::clock::{SalatError, resolve_timezone};
use crate::countdown::{Countdown, format_hms, remaining_seconds};
use crate::notify::{NotificationGate, NotificationPolicy, NotificationRequest, NotificationSink, prayer_notification};
use crate::schedule::{NextPrayerState, ResolvedSchedule, next_prayer, resolve_schedule};
use crate::types::{DEFAULT_TIMEZONE, Prayer, ScheduleData, Timings};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Result of one session tick.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    /// Zero-padded "HH:MM:SS" countdown, absent when nothing is tracked.
    pub display: Option<String>,
    pub next: Option<NextPrayerState>,
    /// A gated notification request produced by a zero-crossing, if any.
    pub notification: Option<NotificationRequest>,
}

impl TickOutcome {
    fn idle() -> Self {
        Self { display: None, next: None, notification: None }
    }
}

/// Owns the resolved schedule, next-prayer state and notification gate.
///
/// All mutation goes through `load` and `tick`; callers supply `now`, so
/// the whole machine is deterministic under test.
#[derive(Debug)]
pub struct SessionCore {
    timings: Option<Timings>,
    tz: Tz,
    next: Option<NextPrayerState>,
    countdown: Option<Countdown>,
    gate: NotificationGate,
    policy: NotificationPolicy,
}

impl SessionCore {
    pub fn new(policy: NotificationPolicy) -> Self {
        Self {
            timings: None,
            // Overwritten by the first `load`; only a placeholder until then.
            tz: DEFAULT_TIMEZONE.parse().unwrap_or(chrono_tz::UTC),
            next: None,
            countdown: None,
            gate: NotificationGate::new(),
            policy,
        }
    }

    /// Installs a new day's schedule and retargets the countdown.
    ///
    /// Safe to call while ticking: the previous target is replaced
    /// wholesale. The gate is deliberately kept, so a manual refresh
    /// cannot re-arm prayers already notified today.
    ///
    /// # Errors
    /// Returns `UnknownTimezone` without touching existing state.
    pub fn load(&mut self, schedule: ScheduleData, now: DateTime<Utc>) -> Result<(), SalatError> {
        let tz = resolve_timezone(schedule.timezone.as_deref())?;
        self.tz = tz;
        self.next = next_prayer(&schedule.timings, now, tz);
        self.countdown = self.next.map(|n| Countdown::new(n.target));
        self.timings = Some(schedule.timings);
        Ok(())
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.policy.enabled = enabled;
    }

    pub fn set_policy(&mut self, policy: NotificationPolicy) {
        self.policy = policy;
    }

    pub fn next(&self) -> Option<NextPrayerState> {
        self.next
    }

    pub fn countdown_display(&self) -> Option<String> {
        self.next.map(|n| format_hms(n.remaining_seconds))
    }

    /// The full day's resolved instants, for display surfaces listing
    /// every prayer alongside the tracked one.
    pub fn resolved_schedule(&self, now: DateTime<Utc>) -> Option<ResolvedSchedule> {
        let timings = self.timings.as_ref()?;
        let today = now.with_timezone(&self.tz).date_naive();
        Some(resolve_schedule(timings, today, self.tz))
    }

    /// Drops the schedule and countdown; the session goes inert.
    pub fn clear(&mut self) {
        self.timings = None;
        self.next = None;
        self.countdown = None;
    }

    /// Advances the countdown by one observation of `now`.
    ///
    /// On the zero-crossing tick this produces at most one gated
    /// notification request, then immediately retargets to the next
    /// upcoming prayer so later ticks count toward the new target.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let Some(countdown) = self.countdown.as_mut() else {
            return TickOutcome::idle();
        };
        let tick = countdown.tick(now);

        let mut notification = None;
        if tick.reached {
            if let Some(reached) = self.next.map(|n| n.prayer) {
                notification = self.gated_notification(reached, now);
            }
            self.advance(now);
        }

        if let Some(next) = self.next.as_mut() {
            next.remaining_seconds = remaining_seconds(next.target, now);
        }
        TickOutcome {
            display: self.countdown_display(),
            next: self.next,
            notification,
        }
    }

    /// The orchestrator guard: enabled AND permitted AND not yet notified
    /// today AND not the same prayer as the last notification today.
    /// Marks the gate on success, before the resolver reruns.
    fn gated_notification(&mut self, prayer: Prayer, now: DateTime<Utc>) -> Option<NotificationRequest> {
        if !self.policy.allows() {
            return None;
        }
        let today = now.with_timezone(&self.tz).date_naive();
        if !self.gate.should_notify(prayer, today) {
            return None;
        }
        if self.gate.last_notified_on(today) == Some(prayer) {
            return None;
        }
        let clock = self
            .timings
            .as_ref()
            .map(|t| t.get(prayer).to_string())
            .unwrap_or_default();
        self.gate.mark_notified(prayer, today);
        Some(prayer_notification(prayer, &clock))
    }

    /// Reruns the resolver for the next target. When the new target falls
    /// on a later local calendar day than the one just reached, the day
    /// has rolled over and the gate resets.
    fn advance(&mut self, now: DateTime<Utc>) {
        let prev_day = self.next.map(|n| n.target.with_timezone(&self.tz).date_naive());
        self.next = self
            .timings
            .as_ref()
            .and_then(|timings| next_prayer(timings, now, self.tz));
        if let (Some(prev), Some(next)) = (prev_day, self.next) {
            if next.target.with_timezone(&self.tz).date_naive() > prev {
                self.gate.reset_for_new_day();
            }
        }
        self.countdown = self.next.map(|n| Countdown::new(n.target));
    }
}

#[derive(Debug)]
enum SessionCommand {
    Load(ScheduleData),
    SetNotificationsEnabled(bool),
    Stop,
}

/// What display surfaces observe: the tracked prayer and its formatted
/// countdown, republished every tick.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub next: Option<NextPrayerState>,
    pub countdown: Option<String>,
}

/// Handle to a running session actor.
///
/// The spawned task exclusively owns the [`SessionCore`]; this handle
/// only sends commands and reads snapshots. Dropping the handle aborts
/// the task, so no ticker outlives its session.
pub struct PrayerScheduleSession {
    commands: mpsc::UnboundedSender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    handle: Option<JoinHandle<()>>,
}

impl PrayerScheduleSession {
    /// Spawns the session actor with its 1 Hz ticker. Notifications go to
    /// `sink`; nothing fires until a schedule is loaded.
    pub fn spawn(policy: NotificationPolicy, sink: Box<dyn NotificationSink>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());
        let core = SessionCore::new(policy);
        let handle = tokio::spawn(run_session(core, command_rx, snapshot_tx, sink));
        Self {
            commands: command_tx,
            snapshots: snapshot_rx,
            handle: Some(handle),
        }
    }

    /// Hands a freshly fetched schedule to the actor. Any countdown in
    /// progress is torn down and replaced; the single ticker is re-armed,
    /// never duplicated.
    pub fn load(&self, schedule: ScheduleData) {
        let _ = self.commands.send(SessionCommand::Load(schedule));
    }

    pub fn set_notifications_enabled(&self, enabled: bool) {
        let _ = self.commands.send(SessionCommand::SetNotificationsEnabled(enabled));
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribes a display surface to snapshot updates.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the actor and waits for it to finish. After this returns no
    /// further tick runs and no notification is dispatched. Idempotent.
    pub async fn stop(&mut self) {
        let _ = self.commands.send(SessionCommand::Stop);
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    warn!(%err, "session task ended abnormally");
                }
            }
        }
    }
}

impl Drop for PrayerScheduleSession {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run_session(
    mut core: SessionCore,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
    mut sink: Box<dyn NotificationSink>,
) {
    let mut ticker = time::interval(TICK_PERIOD);
    // A late tick is a stale countdown frame; skip it rather than burst.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(SessionCommand::Load(schedule)) => {
                    match core.load(schedule, Utc::now()) {
                        Ok(()) => {
                            ticker.reset();
                            debug!(next = ?core.next().map(|n| n.prayer), "schedule loaded");
                        }
                        Err(err) => warn!(%err, "schedule rejected, keeping previous"),
                    }
                    let _ = snapshots.send(SessionSnapshot {
                        next: core.next(),
                        countdown: core.countdown_display(),
                    });
                }
                Some(SessionCommand::SetNotificationsEnabled(enabled)) => {
                    core.set_notifications_enabled(enabled);
                }
                Some(SessionCommand::Stop) | None => break,
            },
            _ = ticker.tick() => {
                let outcome = core.tick(Utc::now());
                if let Some(request) = outcome.notification {
                    if let Err(err) = sink.deliver(request) {
                        // The gate already recorded the attempt, so a
                        // rejecting sink cannot trigger a retry storm.
                        warn!(%err, "notification dispatch failed");
                    }
                }
                let _ = snapshots.send(SessionSnapshot {
                    next: outcome.next,
                    countdown: outcome.display,
                });
            }
        }
    }
    debug!("prayer schedule session stopped");
}
