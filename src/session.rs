use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::analysis_service::AnalysisService;
use crate::errors::SessionError;
use crate::models::{AnalysisResult, AnswerMap, MindMapRow, QuizQuestion, QuizReport, ScoreResult};
use crate::{log_session_event, mind_map, quiz_engine};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuizState {
    #[default]
    Unanswered,
    InProgress,
    Submitted,
}

/// Answers and scoring for one pass through a quiz set.
///
/// `Unanswered -> InProgress` on the first answer, `-> Submitted` on submit,
/// and `reset` returns to `Unanswered` from any state. Answers are locked
/// while submitted.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    answers: AnswerMap,
    state: QuizState,
    report: Option<QuizReport>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn report(&self) -> Option<&QuizReport> {
        self.report.as_ref()
    }

    /// Present only after a submission.
    pub fn score(&self) -> Option<ScoreResult> {
        self.report.as_ref().map(|r| r.score)
    }

    pub fn set_answer(&mut self, question_id: &str, value: &str) -> Result<(), SessionError> {
        if self.state == QuizState::Submitted {
            return Err(SessionError::QuizAlreadySubmitted);
        }
        self.answers.set(question_id, value);
        self.state = QuizState::InProgress;
        Ok(())
    }

    /// Grade the current answers. Submitting again without a reset grades the
    /// same answers and yields the same report.
    pub fn submit(&mut self, quizzes: &[QuizQuestion]) -> QuizReport {
        let report = quiz_engine::grade(quizzes, &self.answers);
        self.report = Some(report.clone());
        self.state = QuizState::Submitted;
        report
    }

    pub fn reset(&mut self) {
        self.answers.clear();
        self.report = None;
        self.state = QuizState::Unanswered;
    }
}

/// One analysis session: a validated result and the quiz taken against it.
#[derive(Debug, Clone)]
pub struct StudySession {
    pub scan_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub result: AnalysisResult,
    pub quiz: QuizSession,
}

impl StudySession {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            scan_id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            result,
            quiz: QuizSession::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSnapshot {
    pub scan_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub result: AnalysisResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSessionView {
    pub scan_id: Uuid,
    pub state: QuizState,
    pub answers: AnswerMap,
    pub answered_count: usize,
    pub total_count: usize,
    pub report: Option<QuizReport>,
}

impl QuizSessionView {
    fn from_session(session: &StudySession) -> Self {
        Self {
            scan_id: session.scan_id,
            state: session.quiz.state(),
            answers: session.quiz.answers().clone(),
            answered_count: session.quiz.answers().len(),
            total_count: session.result.quizzes.len(),
            report: session.quiz.report().cloned(),
        }
    }
}

/// Allows at most one analysis call in flight.
#[derive(Debug, Clone, Default)]
pub struct ScanGate {
    in_flight: Arc<AtomicBool>,
}

/// Held for the duration of a scan; releases the gate on drop.
#[derive(Debug)]
pub struct ScanPermit {
    in_flight: Arc<AtomicBool>,
}

impl ScanGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> Option<ScanPermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ScanPermit {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Drop for ScanPermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Process-wide state: the current study session plus the scan gate.
///
/// A failed scan never touches the current session.
pub struct Workspace {
    service: AnalysisService,
    current: RwLock<Option<StudySession>>,
    gate: ScanGate,
}

impl Workspace {
    pub fn new(service: AnalysisService) -> Self {
        Self {
            service,
            current: RwLock::new(None),
            gate: ScanGate::new(),
        }
    }

    pub fn service(&self) -> &AnalysisService {
        &self.service
    }

    pub fn is_scanning(&self) -> bool {
        self.gate.is_busy()
    }

    pub async fn scan(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<AnalysisSnapshot, SessionError> {
        let Some(_permit) = self.gate.try_begin() else {
            log_session_event!(warn, "scan", "rejected while another scan is in flight");
            return Err(SessionError::ScanInProgress);
        };

        // The lock is not held across the service call.
        let result = self.service.analyze_image(image_bytes, mime_type).await?;
        let session = StudySession::new(result);
        let snapshot = AnalysisSnapshot {
            scan_id: session.scan_id,
            analyzed_at: session.analyzed_at,
            result: session.result.clone(),
        };

        *self.current.write().await = Some(session);
        log_session_event!("scan", scan_id = snapshot.scan_id, "analysis result replaced");

        Ok(snapshot)
    }

    pub async fn current_analysis(&self) -> Result<AnalysisSnapshot, SessionError> {
        let guard = self.current.read().await;
        let session = guard.as_ref().ok_or(SessionError::NoAnalysis)?;
        Ok(AnalysisSnapshot {
            scan_id: session.scan_id,
            analyzed_at: session.analyzed_at,
            result: session.result.clone(),
        })
    }

    pub async fn mind_map_rows(&self) -> Result<Vec<MindMapRow>, SessionError> {
        let guard = self.current.read().await;
        let session = guard.as_ref().ok_or(SessionError::NoAnalysis)?;
        Ok(mind_map::rows(&session.result.mind_map)?)
    }

    pub async fn quiz_view(&self) -> Result<QuizSessionView, SessionError> {
        let guard = self.current.read().await;
        let session = guard.as_ref().ok_or(SessionError::NoAnalysis)?;
        Ok(QuizSessionView::from_session(session))
    }

    pub async fn set_answer(
        &self,
        question_id: &str,
        value: &str,
    ) -> Result<QuizSessionView, SessionError> {
        let mut guard = self.current.write().await;
        let session = guard.as_mut().ok_or(SessionError::NoAnalysis)?;

        if session.result.question(question_id).is_none() {
            return Err(SessionError::UnknownQuestion(question_id.to_string()));
        }
        session.quiz.set_answer(question_id, value)?;

        Ok(QuizSessionView::from_session(session))
    }

    pub async fn submit(&self) -> Result<QuizReport, SessionError> {
        let mut guard = self.current.write().await;
        let session = guard.as_mut().ok_or(SessionError::NoAnalysis)?;

        let report = session.quiz.submit(&session.result.quizzes);
        log_session_event!("submit", scan_id = session.scan_id, state = session.quiz.state());

        Ok(report)
    }

    pub async fn reset(&self) -> Result<QuizSessionView, SessionError> {
        let mut guard = self.current.write().await;
        let session = guard.as_mut().ok_or(SessionError::NoAnalysis)?;

        session.quiz.reset();
        log_session_event!("reset", scan_id = session.scan_id, state = session.quiz.state());

        Ok(QuizSessionView::from_session(session))
    }
}
