//! Dual-context voice rendering.
//!
//! The primary context (the caller of [`RenderCoordinator::render`]) owns
//! strings 0 and 1; a worker thread owns strings 2 and 3. Each block the
//! primary applies pending note events, hands the worker a render job
//! through a capacity-1 channel, renders its own half, then waits a bounded
//! time for the worker's half and mixes it in.
//!
//! ```text
//!   Idle ──dispatch──▶ Dispatched ──own half rendered──▶ AwaitingAck
//!    ▲                                                   │       │
//!    └────────────── reply (rendered or degraded) ◀──────┘   5 ms elapsed
//!    └────────────── late reply drained ◀──────────────── TimedOut
//! ```
//!
//! A job carries the worker's event backlog and its scratch buffer by
//! value, and the reply carries them back, so nothing is shared and nothing
//! is allocated per block. While a job is in flight after a timeout, new
//! events for the worker's strings wait in a backlog for the next dispatch.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use diapason_synth::{Half, Patch, SynthEvent, VoicePartition};

use crate::Result;

/// How long the primary waits for the worker's ready token.
pub const READY_TIMEOUT: Duration = Duration::from_millis(100);
/// How long the primary waits for the worker's half of a block.
pub const RENDER_TIMEOUT: Duration = Duration::from_millis(5);

/// Block geometry and timeouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorConfig {
    /// Sample rate the voices run at.
    pub sample_rate: f32,
    /// Frames per block.
    pub block_frames: usize,
    /// Frames the worker's scratch buffer holds. Anything short of
    /// `block_frames` leaves the worker unable to render.
    pub worker_scratch_frames: usize,
    /// Startup handshake wait.
    pub ready_timeout: Duration,
    /// Per-block completion wait.
    pub render_timeout: Duration,
}

impl CoordinatorConfig {
    /// Standard timeouts with a correctly sized scratch buffer.
    pub fn new(sample_rate: f32, block_frames: usize) -> Self {
        Self {
            sample_rate,
            block_frames,
            worker_scratch_frames: block_frames,
            ready_timeout: READY_TIMEOUT,
            render_timeout: RENDER_TIMEOUT,
        }
    }
}

/// Where the current block is in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No job in flight.
    Idle,
    /// Job sent, primary rendering its own half.
    Dispatched,
    /// Primary waiting for the worker.
    AwaitingAck,
    /// Worker missed the deadline; its job is still out.
    TimedOut,
    /// No worker; the primary renders everything.
    Suspended,
}

/// Which halves made it into a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Primary half plus the worker's half.
    Both,
    /// Worker's half missing: timed out, degraded, or still busy.
    PrimaryOnly,
    /// Suspended: both halves rendered by the primary.
    Local,
}

/// Running counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Blocks rendered.
    pub blocks: u64,
    /// Worker missed the deadline.
    pub timeouts: u64,
    /// Worker answered without rendering.
    pub degraded: u64,
    /// No job could be sent because the last one was still out.
    pub skipped: u64,
    /// Replies that arrived after their deadline and were discarded.
    pub late_replies: u64,
    /// Messages that made no sense in context.
    pub unexpected: u64,
}

#[derive(Debug)]
struct RenderJob {
    frames: usize,
    events: Vec<SynthEvent>,
    patch: Option<Patch>,
    scratch: Vec<f32>,
}

#[derive(Debug)]
enum Command {
    Render(RenderJob),
    Stop,
}

#[derive(Debug)]
enum Reply {
    Ready,
    Rendered(RenderJob),
    Degraded(RenderJob),
}

struct Worker {
    commands: Sender<Command>,
    replies: Receiver<Reply>,
    handle: JoinHandle<VoicePartition>,
}

/// Primary side of the render split.
pub struct RenderCoordinator {
    config: CoordinatorConfig,
    primary: VoicePartition,
    worker: Option<Worker>,
    parked: Option<VoicePartition>,
    job: Option<RenderJob>,
    backlog: Vec<SynthEvent>,
    pending_patch: Option<Patch>,
    local: Vec<f32>,
    state: CoordinatorState,
    stats: CoordinatorStats,
}

impl std::fmt::Debug for RenderCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCoordinator")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl RenderCoordinator {
    /// Starts the worker with the secondary half and performs the ready
    /// handshake.
    pub fn spawn(config: CoordinatorConfig) -> Result<Self> {
        let mut coordinator = Self {
            config,
            primary: VoicePartition::primary(config.sample_rate),
            worker: None,
            parked: Some(VoicePartition::secondary(config.sample_rate)),
            job: Some(RenderJob {
                frames: 0,
                events: Vec::new(),
                patch: None,
                scratch: vec![0.0; config.worker_scratch_frames * 2],
            }),
            backlog: Vec::new(),
            pending_patch: None,
            local: vec![0.0; config.block_frames * 2],
            state: CoordinatorState::Suspended,
            stats: CoordinatorStats::default(),
        };
        coordinator.resume()?;
        Ok(coordinator)
    }

    /// Block geometry and timeouts.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Handshake state.
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Counters since construction.
    pub fn stats(&self) -> CoordinatorStats {
        self.stats
    }

    /// True when no worker is running.
    pub fn is_suspended(&self) -> bool {
        self.worker.is_none()
    }

    /// Strings 0 and 1.
    pub fn primary(&self) -> &VoicePartition {
        &self.primary
    }

    /// Strings 2 and 3, while suspended.
    pub fn parked(&self) -> Option<&VoicePartition> {
        self.parked.as_ref()
    }

    /// Loads a patch into both halves. The worker picks it up with its next
    /// job.
    pub fn set_patch(&mut self, patch: &Patch) {
        self.primary.set_patch(patch);
        match self.parked.as_mut() {
            Some(parked) => parked.set_patch(patch),
            None => self.pending_patch = Some(*patch),
        }
    }

    /// Renders one block of interleaved stereo into `out`.
    ///
    /// `events` are applied before rendering ("execute deltas"). At most
    /// `block_frames` frames are rendered; the rest of `out` is untouched.
    pub fn render<I>(&mut self, events: I, out: &mut [f32]) -> RenderOutcome
    where
        I: IntoIterator<Item = SynthEvent>,
    {
        let frames = (out.len() / 2).min(self.config.block_frames);
        let out = &mut out[..frames * 2];
        self.stats.blocks += 1;

        for event in events {
            if !self.primary.apply(&event) && Half::of_string(event.string) == Some(Half::Secondary)
            {
                self.backlog.push(event);
            }
        }

        if let Some(parked) = self.parked.as_mut() {
            if let Some(patch) = self.pending_patch.take() {
                parked.set_patch(&patch);
            }
            for event in self.backlog.drain(..) {
                parked.apply(&event);
            }
            self.primary.render(out);
            let local = &mut self.local[..frames * 2];
            parked.render(local);
            for (o, s) in out.iter_mut().zip(local.iter()) {
                *o += s;
            }
            return RenderOutcome::Local;
        }

        self.collect_late_reply();
        let dispatched = self.dispatch(frames);
        self.primary.render(out);

        if !dispatched {
            self.stats.skipped += 1;
            tracing::trace!(skipped = self.stats.skipped, "render job still out, primary half only");
            return RenderOutcome::PrimaryOnly;
        }

        self.state = CoordinatorState::AwaitingAck;
        self.await_reply(out)
    }

    fn dispatch(&mut self, frames: usize) -> bool {
        let Some(mut job) = self.job.take() else {
            return false;
        };
        let Some(worker) = self.worker.as_ref() else {
            self.job = Some(job);
            return false;
        };

        job.frames = frames;
        job.events.append(&mut self.backlog);
        job.patch = self.pending_patch.take();

        match worker.commands.send(Command::Render(job)) {
            Ok(()) => {
                self.state = CoordinatorState::Dispatched;
                true
            }
            Err(err) => {
                let Command::Render(job) = err.into_inner() else {
                    return false;
                };
                self.job = Some(job);
                self.worker_lost();
                false
            }
        }
    }

    fn await_reply(&mut self, out: &mut [f32]) -> RenderOutcome {
        let deadline = Instant::now() + self.config.render_timeout;
        loop {
            let Some(worker) = self.worker.as_ref() else {
                return RenderOutcome::PrimaryOnly;
            };
            let remaining = deadline.saturating_duration_since(Instant::now());
            match worker.replies.recv_timeout(remaining) {
                Ok(Reply::Rendered(job)) => {
                    let rendered = &job.scratch[..job.frames * 2];
                    for (o, s) in out.iter_mut().zip(rendered) {
                        *o += s;
                    }
                    self.finish(job);
                    return RenderOutcome::Both;
                }
                Ok(Reply::Degraded(job)) => {
                    self.stats.degraded += 1;
                    self.finish(job);
                    return RenderOutcome::PrimaryOnly;
                }
                Ok(Reply::Ready) => {
                    self.stats.unexpected += 1;
                    tracing::debug!("unexpected ready token while awaiting render reply");
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.stats.timeouts += 1;
                    self.state = CoordinatorState::TimedOut;
                    tracing::debug!(
                        timeouts = self.stats.timeouts,
                        "secondary render timed out, primary half only"
                    );
                    return RenderOutcome::PrimaryOnly;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.worker_lost();
                    return RenderOutcome::PrimaryOnly;
                }
            }
        }
    }

    fn finish(&mut self, mut job: RenderJob) {
        job.events.clear();
        self.job = Some(job);
        self.state = CoordinatorState::Idle;
    }

    /// Takes back a job whose reply missed its deadline. Its audio is stale
    /// and is dropped.
    fn collect_late_reply(&mut self) {
        if self.job.is_some() {
            return;
        }
        let Some(worker) = self.worker.as_ref() else {
            return;
        };
        let late = loop {
            match worker.replies.try_recv() {
                Ok(Reply::Rendered(job) | Reply::Degraded(job)) => break Some(job),
                Ok(Reply::Ready) => {
                    self.stats.unexpected += 1;
                    tracing::debug!("unexpected ready token from render worker");
                }
                Err(_) => break None,
            }
        };
        if let Some(job) = late {
            self.stats.late_replies += 1;
            self.finish(job);
        }
    }

    fn worker_lost(&mut self) {
        tracing::error!("render worker disconnected, rendering all strings locally");
        self.stop_worker();
    }

    /// Stops the worker and takes its voices back. The primary then renders
    /// every string until [`resume`](Self::resume).
    pub fn suspend(&mut self) {
        if self.worker.is_some() {
            self.stop_worker();
            tracing::info!("render worker suspended");
        }
    }

    fn stop_worker(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        // fails only if the worker is already gone
        let _ = worker.commands.send(Command::Stop);
        // drain until the worker hangs up so it never blocks on a full reply slot
        for reply in worker.replies.iter() {
            if let Reply::Rendered(job) | Reply::Degraded(job) = reply {
                self.finish(job);
            }
        }
        let voices = worker.handle.join().unwrap_or_else(|_| {
            tracing::error!("render worker panicked, secondary voices reset");
            VoicePartition::secondary(self.config.sample_rate)
        });
        if self.job.is_none() {
            self.job = Some(RenderJob {
                frames: 0,
                events: Vec::new(),
                patch: None,
                scratch: vec![0.0; self.config.worker_scratch_frames * 2],
            });
        }

        self.parked = Some(voices);
        self.state = CoordinatorState::Suspended;
    }

    /// Restarts the worker with the parked voices and waits for its ready
    /// token. A missing token is logged, not fatal.
    pub fn resume(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }
        let Some(voices) = self.parked.take() else {
            return Ok(());
        };

        let (commands, command_rx) = bounded(1);
        let (reply_tx, replies) = bounded(1);
        let handle = thread::Builder::new()
            .name("diapason-render".into())
            .spawn(move || worker_loop(voices, &command_rx, &reply_tx));
        let handle = match handle {
            Ok(handle) => handle,
            Err(err) => {
                self.parked = Some(VoicePartition::secondary(self.config.sample_rate));
                return Err(err.into());
            }
        };

        match replies.recv_timeout(self.config.ready_timeout) {
            Ok(Reply::Ready) => tracing::debug!("render worker ready"),
            Ok(_) => {
                self.stats.unexpected += 1;
                tracing::debug!("unexpected message during render handshake");
            }
            Err(_) => tracing::warn!(
                timeout_ms = self.config.ready_timeout.as_millis() as u64,
                "render worker did not report ready, continuing"
            ),
        }

        self.worker = Some(Worker {
            commands,
            replies,
            handle,
        });
        self.state = CoordinatorState::Idle;
        Ok(())
    }
}

impl Drop for RenderCoordinator {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

fn worker_loop(
    mut voices: VoicePartition,
    commands: &Receiver<Command>,
    replies: &Sender<Reply>,
) -> VoicePartition {
    if replies.send(Reply::Ready).is_err() {
        return voices;
    }

    // scratch is checked once, on the first job
    let mut scratch_ok: Option<bool> = None;

    while let Ok(command) = commands.recv() {
        let mut job = match command {
            Command::Render(job) => job,
            Command::Stop => break,
        };

        if let Some(patch) = job.patch.take() {
            voices.set_patch(&patch);
        }
        for event in job.events.drain(..) {
            voices.apply(&event);
        }

        let ok = *scratch_ok.get_or_insert_with(|| {
            let ok = job.scratch.len() >= job.frames * 2;
            if !ok {
                tracing::error!(
                    scratch = job.scratch.len(),
                    needed = job.frames * 2,
                    "render worker scratch too small, secondary rendering disabled"
                );
            }
            ok
        });

        let reply = if ok {
            voices.render(&mut job.scratch[..job.frames * 2]);
            Reply::Rendered(job)
        } else {
            Reply::Degraded(job)
        };
        if replies.send(reply).is_err() {
            break;
        }
    }

    voices
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: usize = 64;
    const NONE: [SynthEvent; 0] = [];

    fn coordinator() -> RenderCoordinator {
        let mut config = CoordinatorConfig::new(44100.0, BLOCK);
        // generous deadline so a loaded test machine does not time out
        config.render_timeout = Duration::from_secs(2);
        RenderCoordinator::spawn(config).unwrap()
    }

    fn energy(frames: &[f32]) -> f32 {
        frames.iter().map(|s| s * s).sum()
    }

    #[test]
    fn test_handshake_leaves_idle() {
        let c = coordinator();
        assert_eq!(c.state(), CoordinatorState::Idle);
        assert!(!c.is_suspended());
        assert_eq!(c.stats().unexpected, 0);
    }

    #[test]
    fn test_both_halves_rendered() {
        let mut c = coordinator();
        let mut out = vec![0.0; BLOCK * 2];
        let outcome = c.render([SynthEvent::note_on(3, 40)], &mut out);
        assert_eq!(outcome, RenderOutcome::Both);
        assert_eq!(c.state(), CoordinatorState::Idle);
        // only the worker's string is sounding
        assert!(!c.primary().is_active());
        assert!(energy(&out) > 0.0);
    }

    #[test]
    fn test_silence_without_events() {
        let mut c = coordinator();
        let mut out = vec![1.0; BLOCK * 2];
        c.render(NONE, &mut out);
        assert_eq!(energy(&out), 0.0);
    }

    #[test]
    fn test_degraded_worker_answers_without_rendering() {
        let mut config = CoordinatorConfig::new(44100.0, BLOCK);
        config.worker_scratch_frames = BLOCK / 2;
        config.render_timeout = Duration::from_secs(2);
        let mut c = RenderCoordinator::spawn(config).unwrap();

        let mut out = vec![0.0; BLOCK * 2];
        for _ in 0..3 {
            let outcome = c.render([SynthEvent::note_on(2, 45)], &mut out);
            assert_eq!(outcome, RenderOutcome::PrimaryOnly);
        }
        assert_eq!(c.stats().degraded, 3);
        assert_eq!(c.stats().timeouts, 0);
        assert_eq!(energy(&out), 0.0);
        assert_eq!(c.state(), CoordinatorState::Idle);
    }

    #[test]
    fn test_suspend_and_resume() {
        let mut c = coordinator();
        let mut out = vec![0.0; BLOCK * 2];
        c.render([SynthEvent::note_on(2, 45)], &mut out);

        c.suspend();
        assert!(c.is_suspended());
        assert_eq!(c.state(), CoordinatorState::Suspended);
        // the worker's voice came back still sounding
        assert_eq!(c.parked().and_then(|p| p.voice(2)).and_then(|v| v.note()), Some(45));

        out.fill(0.0);
        assert_eq!(c.render(NONE, &mut out), RenderOutcome::Local);
        assert!(energy(&out) > 0.0);

        c.resume().unwrap();
        assert!(!c.is_suspended());
        assert_eq!(c.render(NONE, &mut out), RenderOutcome::Both);
    }

    #[test]
    fn test_patch_change_keeps_worker_notes() {
        let mut c = coordinator();
        let mut out = vec![0.0; BLOCK * 2];
        c.set_patch(Patch::lookup(1));
        c.render([SynthEvent::note_on(2, 45)], &mut out);
        c.suspend();
        let parked = c.parked().unwrap();
        assert_eq!(parked.voice(2).and_then(|v| v.note()), Some(45));
    }
}
