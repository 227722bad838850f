//! Session aggregation: per-frame samples in, one summary out.

use chrono::{DateTime, NaiveDate, Utc};
use rehab_core::{Error, Result, SessionId, Timestamp};
use rehab_motion::ExerciseKind;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;

/// One processed frame of an active session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSample {
    pub reps_at_sample: u32,
    pub accuracy: u8,
    pub angle: f64,
    #[serde(rename = "timestampMs")]
    pub timestamp: Timestamp,
}

/// Final record of a stopped session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub exercise: ExerciseKind,
    pub total_reps: u32,
    pub avg_accuracy: u8,
    pub avg_angle: f64,
    pub bad_posture_percent: u8,
    pub duration_seconds: u64,
    pub started_at: DateTime<Utc>,
    /// Rehab programme day the session belongs to, starting at 1
    pub day_index: u32,
}

/// Destination for finished session summaries
pub trait HistoryStore {
    fn append(&mut self, summary: SessionSummary) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    sessions: Vec<SessionSummary>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }
}

impl HistoryStore for InMemoryHistory {
    fn append(&mut self, summary: SessionSummary) -> Result<()> {
        self.sessions.push(summary);
        Ok(())
    }
}

/// Day counter of a rehab programme, advanced once per calendar day visited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RehabProgress {
    day_index: u32,
    last_visit: Option<NaiveDate>,
}

impl Default for RehabProgress {
    fn default() -> Self {
        Self {
            day_index: 1,
            last_visit: None,
        }
    }
}

impl RehabProgress {
    pub fn day_index(&self) -> u32 {
        self.day_index
    }

    pub fn last_visit(&self) -> Option<NaiveDate> {
        self.last_visit
    }

    /// Records a visit on `date` and returns the current day index
    pub fn register_visit(&mut self, date: NaiveDate) -> u32 {
        match self.last_visit {
            Some(last) if last != date => self.day_index += 1,
            _ => {}
        }
        self.last_visit = Some(date);
        self.day_index
    }
}

#[derive(Debug)]
struct ActiveSession {
    id: SessionId,
    exercise: ExerciseKind,
    started_at: Timestamp,
}

/// Collects samples for the selected exercise and summarizes them on stop
#[derive(Debug)]
pub struct SessionAggregator<H> {
    exercise: Option<ExerciseKind>,
    active: Option<ActiveSession>,
    samples: Vec<SessionSample>,
    bad_posture_count: u32,
    bad_posture_threshold: u8,
    progress: RehabProgress,
    history: H,
}

impl<H: HistoryStore> SessionAggregator<H> {
    pub fn new(history: H, config: &SessionConfig) -> Self {
        Self {
            exercise: None,
            active: None,
            samples: Vec::new(),
            bad_posture_count: 0,
            bad_posture_threshold: config.bad_posture_threshold,
            progress: RehabProgress::default(),
            history,
        }
    }

    pub fn with_progress(mut self, progress: RehabProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Selects an exercise, discarding any collected samples
    pub fn select_exercise(&mut self, kind: ExerciseKind) {
        self.exercise = Some(kind);
        self.active = None;
        self.clear_samples();
    }

    pub fn exercise(&self) -> Option<ExerciseKind> {
        self.exercise
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self) -> Result<SessionId> {
        self.start_at(Timestamp::now())
    }

    pub fn start_at(&mut self, now: Timestamp) -> Result<SessionId> {
        let exercise = self
            .exercise
            .ok_or_else(|| Error::InvalidInput("no exercise selected".to_string()))?;

        let day = self.progress.register_visit(now.to_datetime().date_naive());
        let id = SessionId::new();
        self.clear_samples();
        self.active = Some(ActiveSession {
            id,
            exercise,
            started_at: now,
        });
        info!(session = %id.0, %exercise, day, "Session started");
        Ok(id)
    }

    pub fn record_sample(&mut self, reps: u32, accuracy: u8, angle: f64) -> bool {
        self.record_sample_at(reps, accuracy, angle, Timestamp::now())
    }

    /// Appends a sample; a no-op returning false when no session is active
    pub fn record_sample_at(&mut self, reps: u32, accuracy: u8, angle: f64, now: Timestamp) -> bool {
        if self.active.is_none() {
            debug!("Sample ignored: no active session");
            return false;
        }
        if accuracy < self.bad_posture_threshold {
            self.bad_posture_count += 1;
        }
        self.samples.push(SessionSample {
            reps_at_sample: reps,
            accuracy,
            angle: if angle.is_finite() { angle } else { 0.0 },
            timestamp: now,
        });
        true
    }

    pub fn samples(&self) -> &[SessionSample] {
        &self.samples
    }

    /// Rounded mean accuracy so far, 100 before the first sample
    pub fn running_accuracy(&self) -> u8 {
        self.mean_accuracy().unwrap_or(100)
    }

    pub fn bad_posture_count(&self) -> u32 {
        self.bad_posture_count
    }

    pub fn reps(&self) -> u32 {
        self.samples.last().map_or(0, |s| s.reps_at_sample)
    }

    pub fn stop(&mut self) -> Option<SessionSummary> {
        self.stop_at(Timestamp::now())
    }

    /// Ends the active session and hands its summary to the history store
    pub fn stop_at(&mut self, now: Timestamp) -> Option<SessionSummary> {
        let Some(session) = self.active.take() else {
            warn!("Stop requested without an active session");
            return None;
        };

        let count = self.samples.len();
        let (avg_angle, bad_posture_percent) = if count == 0 {
            (0.0, 0)
        } else {
            let angle_sum: f64 = self.samples.iter().map(|s| s.angle).sum();
            let percent = self.bad_posture_count as f64 / count as f64 * 100.0;
            ((angle_sum / count as f64).round(), percent.round() as u8)
        };

        let summary = SessionSummary {
            session_id: session.id,
            exercise: session.exercise,
            total_reps: self.reps(),
            avg_accuracy: self.mean_accuracy().unwrap_or(0),
            avg_angle,
            bad_posture_percent,
            duration_seconds: (now.millis_since(session.started_at) / 1_000) as u64,
            started_at: session.started_at.to_datetime(),
            day_index: self.progress.day_index(),
        };

        info!(
            session = %summary.session_id.0,
            reps = summary.total_reps,
            accuracy = summary.avg_accuracy,
            duration = summary.duration_seconds,
            "Session stopped"
        );
        if let Err(e) = self.history.append(summary.clone()) {
            warn!(error = %e, "Failed to store session summary");
        }
        Some(summary)
    }

    /// Discards everything, including the selected exercise
    pub fn reset(&mut self) {
        self.exercise = None;
        self.active = None;
        self.clear_samples();
    }

    pub fn progress(&self) -> &RehabProgress {
        &self.progress
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    fn clear_samples(&mut self) {
        self.samples.clear();
        self.bad_posture_count = 0;
    }

    fn mean_accuracy(&self) -> Option<u8> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: u32 = self.samples.iter().map(|s| s.accuracy as u32).sum();
        Some((sum as f64 / self.samples.len() as f64).round() as u8)
    }
}
