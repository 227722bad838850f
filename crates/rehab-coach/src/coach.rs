//! Per-frame coaching loop.
//!
//! [`CoachSession`] owns everything that lives for one exercise selection:
//! the detector state, the previous joint angle for the safety monitor, the
//! voice throttle and the session aggregator. Callers feed it frames in order.

use rehab_core::{Frame, Result, SessionId, Timestamp};
use rehab_motion::{DetectorState, ExerciseKind, Phrase, SafetyMonitor, SafetyStatus};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::CoachConfig;
use crate::locale::rep_milestone;
use crate::session::{HistoryStore, SessionAggregator, SessionSummary};
use crate::voice::{SpeechSink, VoiceThrottle};

/// Outcome of one processed frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub exercise: ExerciseKind,
    pub state: DetectorState,
    pub safety: Option<SafetyStatus>,
    /// Rounded mean accuracy of the session so far
    pub running_accuracy: u8,
}

#[derive(Debug)]
pub struct CoachSession<S, H> {
    exercise: Option<ExerciseKind>,
    state: DetectorState,
    previous_angle: f64,
    voice: VoiceThrottle<S>,
    aggregator: SessionAggregator<H>,
    last_safety_prompt: Option<(Phrase, Timestamp)>,
    safety_repeat_ms: i64,
    last_milestone: u32,
    milestone_every: u32,
}

impl<S: SpeechSink, H: HistoryStore> CoachSession<S, H> {
    pub fn new(sink: S, history: H, config: &CoachConfig) -> Self {
        Self {
            exercise: None,
            state: DetectorState::default(),
            previous_angle: 0.0,
            voice: VoiceThrottle::new(sink, &config.voice),
            aggregator: SessionAggregator::new(history, &config.session),
            last_safety_prompt: None,
            safety_repeat_ms: config.voice.cooldown_ms,
            last_milestone: 0,
            milestone_every: config.session.milestone_every.max(1),
        }
    }

    /// Switches exercise: speech is cancelled and all progress discarded
    pub fn select_exercise(&mut self, kind: ExerciseKind) {
        self.voice.stop();
        self.exercise = Some(kind);
        self.aggregator.select_exercise(kind);
        self.reset_tracking(kind);
        info!(exercise = %kind, "Exercise selected");
    }

    pub fn start(&mut self) -> Result<SessionId> {
        self.start_at(Timestamp::now())
    }

    pub fn start_at(&mut self, now: Timestamp) -> Result<SessionId> {
        let id = self.aggregator.start_at(now)?;
        if let Some(kind) = self.exercise {
            self.reset_tracking(kind);
        }
        Ok(id)
    }

    pub fn process_frame(&mut self, frame: &Frame) -> Option<FrameReport> {
        self.process_frame_at(frame, Timestamp::now())
    }

    /// Runs one frame through detection, scoring, safety and voice.
    ///
    /// Returns `None` while no session is active or when the frame kind does
    /// not match the exercise (hand frames for a body exercise and vice versa).
    pub fn process_frame_at(&mut self, frame: &Frame, now: Timestamp) -> Option<FrameReport> {
        let kind = self.exercise.filter(|_| self.aggregator.is_active())?;
        if frame.is_hands() != kind.uses_hands() {
            debug!(exercise = %kind, "Frame kind does not match exercise, skipped");
            return None;
        }

        let state = kind.detector().detect(frame, &self.state);
        self.aggregator
            .record_sample_at(state.reps, state.accuracy, state.angle, now);

        let safety = SafetyMonitor::rule(kind).map(|_| {
            let status = SafetyMonitor::evaluate(kind, state.angle, self.previous_angle);
            self.previous_angle = state.angle;
            status
        });
        if let Some(status) = &safety {
            self.speak_safety(status, now);
        }
        self.speak_milestone(state.reps, now);

        self.state = state.clone();
        Some(FrameReport {
            exercise: kind,
            state,
            safety,
            running_accuracy: self.aggregator.running_accuracy(),
        })
    }

    /// Ends the session, cancelling speech. `None` when nothing was running.
    pub fn stop(&mut self) -> Option<SessionSummary> {
        self.stop_at(Timestamp::now())
    }

    pub fn stop_at(&mut self, now: Timestamp) -> Option<SessionSummary> {
        self.voice.stop();
        self.aggregator.stop_at(now)
    }

    /// Drops the exercise selection along with all session data
    pub fn reset(&mut self) {
        self.voice.stop();
        self.exercise = None;
        self.state = DetectorState::default();
        self.previous_angle = 0.0;
        self.last_safety_prompt = None;
        self.last_milestone = 0;
        self.aggregator.reset();
    }

    pub fn exercise(&self) -> Option<ExerciseKind> {
        self.exercise
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn voice(&self) -> &VoiceThrottle<S> {
        &self.voice
    }

    pub fn voice_mut(&mut self) -> &mut VoiceThrottle<S> {
        &mut self.voice
    }

    pub fn aggregator(&self) -> &SessionAggregator<H> {
        &self.aggregator
    }

    fn reset_tracking(&mut self, kind: ExerciseKind) {
        self.state = kind.detector().initial_state();
        self.previous_angle = 0.0;
        self.last_safety_prompt = None;
        self.last_milestone = 0;
    }

    fn speak_safety(&mut self, status: &SafetyStatus, now: Timestamp) {
        let Some(voice) = status.voice else {
            return;
        };
        let repeat_due = match self.last_safety_prompt {
            Some((last, at)) => last != voice || now.millis_since(at) > self.safety_repeat_ms,
            None => true,
        };
        // Priority prompts rely on the throttle to preempt regular speech
        let free = status.priority || !self.voice.is_speaking();
        if repeat_due && free && self.voice.speak_at(voice.text(), status.priority, now) {
            self.last_safety_prompt = Some((voice, now));
        }
    }

    /// Milestones held back by the throttle are retried on later frames
    fn speak_milestone(&mut self, reps: u32, now: Timestamp) {
        if reps == 0 || reps == self.last_milestone {
            return;
        }
        let text = if reps % self.milestone_every == 0 {
            rep_milestone(reps)
        } else if reps == 1 {
            Phrase::FirstRepComplete.text().to_string()
        } else {
            return;
        };
        if self.voice.speak_at(&text, true, now) {
            self.last_milestone = reps;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemoryHistory;
    use crate::voice::testing::RecordingSink;
    use rehab_core::{BodyLandmark, BodyPose, HandPose, Landmark};
    use rehab_motion::Stage;

    type Coach = CoachSession<RecordingSink, InMemoryHistory>;

    fn coach(kind: ExerciseKind) -> Coach {
        let mut coach = CoachSession::new(RecordingSink::default(), InMemoryHistory::new(), &CoachConfig::default());
        coach.select_exercise(kind);
        coach
    }

    /// Both legs bent to `degrees` at the knee
    fn squat_frame(degrees: f64) -> Frame {
        let mut pose = BodyPose::centered();
        for (hip, knee, ankle, x) in [
            (BodyLandmark::LeftHip, BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle, 0.56),
            (BodyLandmark::RightHip, BodyLandmark::RightKnee, BodyLandmark::RightAnkle, 0.44),
        ] {
            // Thigh points straight up from the knee; the shin rotates from it
            let theta = (-90.0 + degrees).to_radians();
            pose.set(hip, Landmark::new(x, 0.60, 0.99));
            pose.set(knee, Landmark::new(x, 0.75, 0.99));
            pose.set(ankle, Landmark::new(x + 0.15 * theta.cos(), 0.75 + 0.15 * theta.sin(), 0.99));
        }
        Frame::Body(pose)
    }

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_secs(1_700_000_000 + secs)
    }

    fn spoken(coach: &Coach) -> Vec<&str> {
        coach.voice().sink().spoken.iter().map(|(t, _)| t.as_str()).collect()
    }

    #[test]
    fn test_squat_session_flow() {
        let mut coach = coach(ExerciseKind::Squat);
        coach.start_at(at(0)).unwrap();

        let down = coach.process_frame_at(&squat_frame(95.0), at(1)).unwrap();
        assert_eq!(down.state.stage, Stage::Down);
        assert_eq!(down.state.accuracy, 100);
        assert_eq!(down.safety.unwrap().message, Phrase::PerfectSquatDepth);

        let up = coach.process_frame_at(&squat_frame(170.0), at(2)).unwrap();
        assert_eq!(up.state.reps, 1);
        assert_eq!(up.state.feedback, Phrase::RepCounted);

        assert_eq!(
            spoken(&coach),
            vec!["Perfect squat depth. Hold it.", "First rep complete. Keep going."]
        );

        let summary = coach.stop_at(at(30)).unwrap();
        assert_eq!(summary.total_reps, 1);
        assert_eq!(summary.duration_seconds, 30);
        assert_eq!(coach.aggregator().history().sessions().len(), 1);
        assert!(!coach.voice().is_speaking());
    }

    #[test]
    fn test_inactive_and_mismatched_frames_ignored() {
        let mut coach = coach(ExerciseKind::Squat);
        assert!(coach.process_frame_at(&squat_frame(95.0), at(0)).is_none());

        coach.start_at(at(0)).unwrap();
        let hands = Frame::Hands(vec![HandPose::default()]);
        assert!(coach.process_frame_at(&hands, at(1)).is_none());
        assert!(coach.aggregator().samples().is_empty());

        let mut fist = self::coach(ExerciseKind::FistClench);
        fist.start_at(at(0)).unwrap();
        assert!(fist.process_frame_at(&squat_frame(95.0), at(1)).is_none());
        let report = fist.process_frame_at(&hands, at(2)).unwrap();
        assert_eq!(report.state.feedback, Phrase::ShowYourHand);
        assert!(report.safety.is_none());
    }

    #[test]
    fn test_rep_milestones() {
        let mut coach = coach(ExerciseKind::Squat);
        coach.start_at(at(0)).unwrap();
        for rep in 0..5 {
            for (i, degrees) in [95.0, 170.0].into_iter().enumerate() {
                coach.process_frame_at(&squat_frame(degrees), at(10 * rep + 5 * i as i64));
                coach.voice_mut().on_end();
            }
        }

        let spoken = spoken(&coach);
        assert!(spoken.contains(&"First rep complete. Keep going."));
        assert!(spoken.contains(&"5 reps done. Great work."));
        assert_eq!(coach.state().reps, 5);
    }

    #[test]
    fn test_danger_is_spoken_with_priority() {
        let mut coach = coach(ExerciseKind::Squat);
        coach.start_at(at(0)).unwrap();
        let report = coach.process_frame_at(&squat_frame(50.0), at(1)).unwrap();
        let safety = report.safety.unwrap();
        assert!(safety.priority);
        assert_eq!(spoken(&coach), vec!["Too deep. Come up slightly."]);
    }

    #[test]
    fn test_danger_spoken_after_priority_cooldown() {
        let mut coach = coach(ExerciseKind::Squat);
        coach.start_at(at(0)).unwrap();
        coach.process_frame_at(&squat_frame(95.0), at(0));
        coach.voice_mut().on_end();
        coach.process_frame_at(&squat_frame(170.0), at(1));
        coach.voice_mut().on_end();

        for secs in 2..=15 {
            let report = coach.process_frame_at(&squat_frame(50.0), at(secs)).unwrap();
            assert!(report.safety.unwrap().priority);
            coach.voice_mut().on_end();
            if secs == 5 {
                assert_eq!(spoken(&coach).len(), 2);
            }
        }

        assert_eq!(
            spoken(&coach),
            vec![
                "Perfect squat depth. Hold it.",
                "First rep complete. Keep going.",
                "Too deep. Come up slightly.",
            ]
        );
    }

    #[test]
    fn test_danger_interrupts_regular_prompt() {
        let mut coach = coach(ExerciseKind::Squat);
        coach.start_at(at(0)).unwrap();
        coach.process_frame_at(&squat_frame(95.0), at(0));
        assert!(coach.voice().is_speaking());
        let cancels = coach.voice().sink().cancels;

        coach.process_frame_at(&squat_frame(50.0), at(1));
        assert_eq!(coach.voice().sink().cancels, cancels + 1);
        assert_eq!(
            spoken(&coach),
            vec!["Perfect squat depth. Hold it.", "Too deep. Come up slightly."]
        );
    }

    #[test]
    fn test_held_back_milestone_is_retried() {
        let mut coach = coach(ExerciseKind::Squat);
        coach.start_at(at(0)).unwrap();
        coach.process_frame_at(&squat_frame(50.0), at(0));
        coach.voice_mut().on_end();

        // Rep lands inside the priority cooldown of the danger prompt
        let report = coach.process_frame_at(&squat_frame(170.0), at(1)).unwrap();
        assert_eq!(report.state.reps, 1);
        coach.voice_mut().on_end();
        assert!(!spoken(&coach).contains(&"First rep complete. Keep going."));

        for secs in 2..=6 {
            coach.process_frame_at(&squat_frame(170.0), at(secs));
            coach.voice_mut().on_end();
        }
        let firsts = spoken(&coach)
            .into_iter()
            .filter(|t| *t == "First rep complete. Keep going.")
            .count();
        assert_eq!(firsts, 1);
    }

    #[test]
    fn test_select_exercise_resets() {
        let mut coach = coach(ExerciseKind::Squat);
        coach.start_at(at(0)).unwrap();
        coach.process_frame_at(&squat_frame(95.0), at(1));
        assert!(coach.voice().is_speaking());

        coach.select_exercise(ExerciseKind::BicepCurl);
        assert!(!coach.voice().is_speaking());
        assert_eq!(coach.state().reps, 0);
        assert_eq!(coach.state().stage, Stage::Down);
        assert!(!coach.aggregator().is_active());
        assert!(coach.stop_at(at(5)).is_none());
    }

    #[test]
    fn test_reset_clears_selection() {
        let mut coach = coach(ExerciseKind::Squat);
        coach.start_at(at(0)).unwrap();
        coach.reset();
        assert_eq!(coach.exercise(), None);
        assert!(coach.start_at(at(1)).is_err());
    }
}
