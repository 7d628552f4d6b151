//! Exam session state machine.
//!
//! ```text
//! Pending ──start──▶ Loading ──ok──▶ InProgress(i, Selecting ⇄ Checked) ──advance@last──▶ Complete
//!                       └──err──▶ Failed
//! ```
//!
//! `Loading` can be entered once per session. Each question cycles through
//! select → check → advance; a result is recorded exactly once per question,
//! and the handoff record is written exactly once, when the last question is
//! advanced past.

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::{GenerationError, SessionError};
use crate::generator::QuestionGenerator;
use crate::model::{
    Question, SessionBundle, SimulationMode, SimulationResult, Subject, OPTION_COUNT,
};
use crate::profile::Profile;
use crate::store::HandoffStore;

/// Parameters chosen in the setup flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamRequest {
    pub subject: Subject,
    pub count: u32,
    pub mode: SimulationMode,
}

impl ExamRequest {
    pub const DEFAULT_COUNT: u32 = 5;
    /// Question counts offered by the setup flow.
    pub const ALLOWED_COUNTS: [u32; 3] = [3, 5, 10];

    pub fn new(subject: Subject, count: u32, mode: SimulationMode) -> Self {
        Self {
            subject,
            count,
            mode,
        }
    }

    /// Build a request from loosely typed entry parameters.
    ///
    /// A missing subject is a configuration error: callers should send the
    /// learner back to setup rather than show a message. Count defaults to 5
    /// and mode to standard.
    pub fn from_params(
        subject: Option<&str>,
        count: Option<&str>,
        mode: Option<&str>,
    ) -> Result<Self, SessionError> {
        let subject = match subject.map(str::trim) {
            None | Some("") => return Err(SessionError::MissingSubject),
            Some(raw) => raw
                .parse::<Subject>()
                .map_err(|reason| SessionError::InvalidParameter {
                    name: "subject",
                    reason,
                })?,
        };

        let count = match count {
            None => Self::DEFAULT_COUNT,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => {
                    return Err(SessionError::InvalidParameter {
                        name: "count",
                        reason: "must be positive".into(),
                    })
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(SessionError::InvalidParameter {
                        name: "count",
                        reason: e.to_string(),
                    })
                }
            },
        };

        let mode = match mode {
            None => SimulationMode::default(),
            Some(raw) => raw
                .parse::<SimulationMode>()
                .map_err(|reason| SessionError::InvalidParameter {
                    name: "mode",
                    reason,
                })?,
        };

        Ok(Self::new(subject, count, mode))
    }
}

/// Sub-state of the question currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionPhase {
    /// Choosing; the tentative choice may still change.
    Selecting { selected: Option<usize> },
    /// Answer checked; correctness and explanation are revealed.
    Checked { selected: usize },
}

/// State of a running exam.
#[derive(Debug, Clone)]
pub struct ExamProgress {
    questions: Vec<Question>,
    results: Vec<SimulationResult>,
    current_index: usize,
    phase: QuestionPhase,
    started_at: Instant,
}

impl ExamProgress {
    fn new(questions: Vec<Question>, now: Instant) -> Self {
        Self {
            questions,
            results: Vec::new(),
            current_index: 0,
            phase: QuestionPhase::Selecting { selected: None },
            started_at: now,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn results(&self) -> &[SimulationResult] {
        &self.results
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn phase(&self) -> QuestionPhase {
        self.phase
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }
}

#[derive(Debug, Clone)]
pub enum SessionState {
    /// Created; generation not requested yet.
    Pending,
    /// Generation request in flight.
    Loading,
    InProgress(ExamProgress),
    /// Finished; the bundle was handed off.
    Complete(SessionBundle),
    /// Generation failed; holds the learner-facing message.
    Failed { message: String },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Pending => "pending",
            SessionState::Loading => "loading",
            SessionState::InProgress(_) => "in_progress",
            SessionState::Complete(_) => "complete",
            SessionState::Failed { .. } => "failed",
        }
    }
}

/// Outcome of [`ExamSession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the question at `index`.
    Next { index: usize },
    /// The last question was passed; the handoff record was written.
    Completed,
}

fn in_progress(state: &mut SessionState) -> Result<&mut ExamProgress, SessionError> {
    match state {
        SessionState::InProgress(progress) => Ok(progress),
        SessionState::Complete(_) | SessionState::Failed { .. } => Err(SessionError::Finished),
        SessionState::Pending | SessionState::Loading => Err(SessionError::NotInProgress),
    }
}

/// One run of generated questions, from load to completion.
pub struct ExamSession {
    id: Uuid,
    request: ExamRequest,
    state: SessionState,
    handoff: HandoffStore,
    clock: Arc<dyn Clock>,
}

impl ExamSession {
    pub fn new(request: ExamRequest, handoff: HandoffStore) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            state: SessionState::Pending,
            handoff,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &ExamRequest {
        &self.request
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Generate the questions and enter the exam.
    ///
    /// Uses the profile's proficiency for the requested subject. On failure
    /// the session is left in `Failed` and the error is returned.
    pub async fn start(
        &mut self,
        generator: &QuestionGenerator,
        profile: &Profile,
    ) -> Result<(), SessionError> {
        self.begin_loading()?;
        let proficiency = profile.proficiency(self.request.subject);
        tracing::info!(
            session = %self.id,
            subject = ?self.request.subject,
            count = self.request.count,
            ?proficiency,
            mode = %self.request.mode,
            "generating questions"
        );
        let outcome = generator
            .generate(
                self.request.subject,
                self.request.count,
                proficiency,
                self.request.mode,
            )
            .await;
        self.finish_loading(outcome)
    }

    /// `Pending → Loading`. Fails if loading was ever entered before.
    ///
    /// Split from [`start`](Self::start) for callers that run the generation
    /// request elsewhere and feed the outcome back with
    /// [`finish_loading`](Self::finish_loading).
    pub fn begin_loading(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Pending => {
                self.state = SessionState::Loading;
                Ok(())
            }
            _ => Err(SessionError::AlreadyStarted),
        }
    }

    /// `Loading → InProgress` on success, `Loading → Failed` otherwise.
    pub fn finish_loading(
        &mut self,
        outcome: Result<Vec<Question>, GenerationError>,
    ) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Loading) {
            return Err(SessionError::NotLoading);
        }

        let outcome = outcome.and_then(|questions| {
            if questions.is_empty() {
                Err(GenerationError::NoQuestions)
            } else {
                Ok(questions)
            }
        });

        match outcome {
            Ok(questions) => {
                tracing::info!(session = %self.id, questions = questions.len(), "exam started");
                self.state = SessionState::InProgress(ExamProgress::new(questions, self.clock.now()));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(session = %self.id, "question generation failed: {e}");
                self.state = SessionState::Failed {
                    message: e.user_message().to_string(),
                };
                Err(e.into())
            }
        }
    }

    /// Record a tentative choice for the current question.
    pub fn select_option(&mut self, option: usize) -> Result<(), SessionError> {
        let progress = in_progress(&mut self.state)?;
        if option >= OPTION_COUNT {
            return Err(SessionError::OptionOutOfRange(option));
        }
        match &mut progress.phase {
            QuestionPhase::Selecting { selected } => {
                *selected = Some(option);
                Ok(())
            }
            QuestionPhase::Checked { .. } => Err(SessionError::AlreadyChecked),
        }
    }

    /// Check the selected option and record the result.
    pub fn check_answer(&mut self) -> Result<SimulationResult, SessionError> {
        let now = self.clock.now();
        let progress = in_progress(&mut self.state)?;
        let selected = match progress.phase {
            QuestionPhase::Selecting {
                selected: Some(selected),
            } => selected,
            QuestionPhase::Selecting { selected: None } => return Err(SessionError::NoSelection),
            QuestionPhase::Checked { .. } => return Err(SessionError::AlreadyChecked),
        };

        let question = progress.current_question();
        let result = SimulationResult {
            question_id: question.id.clone(),
            selected_option_index: selected,
            is_correct: question.is_correct(selected),
            time_taken_seconds: now.saturating_duration_since(progress.started_at).as_secs_f64(),
        };
        progress.results.push(result.clone());
        progress.phase = QuestionPhase::Checked { selected };

        tracing::debug!(
            session = %self.id,
            index = progress.current_index,
            correct = result.is_correct,
            "answer checked"
        );
        Ok(result)
    }

    /// Move past a checked question, completing the session after the last.
    ///
    /// If writing the handoff record fails the session stays on the checked
    /// last question, so the call can be retried.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        let now = self.clock.now();
        let progress = in_progress(&mut self.state)?;
        if !matches!(progress.phase, QuestionPhase::Checked { .. }) {
            return Err(SessionError::NotChecked);
        }

        if !progress.is_last() {
            progress.current_index += 1;
            progress.phase = QuestionPhase::Selecting { selected: None };
            progress.started_at = now;
            return Ok(Advance::Next {
                index: progress.current_index,
            });
        }

        let bundle = SessionBundle {
            questions: progress.questions.clone(),
            results: progress.results.clone(),
        };
        self.handoff.save(&bundle)?;
        tracing::info!(session = %self.id, answered = bundle.results.len(), "exam complete");
        self.state = SessionState::Complete(bundle);
        Ok(Advance::Completed)
    }

    pub fn progress_state(&self) -> Option<&ExamProgress> {
        match &self.state {
            SessionState::InProgress(progress) => Some(progress),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.progress_state().map(ExamProgress::current_question)
    }

    /// `(index, total)` of the question on screen.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.progress_state()
            .map(|p| (p.current_index, p.questions.len()))
    }

    pub fn selected(&self) -> Option<usize> {
        match self.progress_state()?.phase {
            QuestionPhase::Selecting { selected } => selected,
            QuestionPhase::Checked { selected } => Some(selected),
        }
    }

    pub fn is_checked(&self) -> bool {
        self.progress_state()
            .is_some_and(|p| matches!(p.phase, QuestionPhase::Checked { .. }))
    }

    pub fn results(&self) -> &[SimulationResult] {
        match &self.state {
            SessionState::InProgress(progress) => &progress.results,
            SessionState::Complete(bundle) => &bundle.results,
            _ => &[],
        }
    }

    pub fn last_result(&self) -> Option<&SimulationResult> {
        self.results().last()
    }

    /// Fraction of questions answered, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        match &self.state {
            SessionState::InProgress(p) => p.results.len() as f64 / p.questions.len() as f64,
            SessionState::Complete(_) => 1.0,
            _ => 0.0,
        }
    }

    pub fn bundle(&self) -> Option<&SessionBundle> {
        match &self.state {
            SessionState::Complete(bundle) => Some(bundle),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, SessionState::Complete(_))
    }

    pub fn failure_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed { message } => Some(message.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::clock::ManualClock;
    use crate::error::{ProviderError, StorageError, GENERATION_FAILED_MESSAGE};
    use crate::model::Proficiency;
    use crate::statistics::{summarize, Feedback};
    use crate::store::{KeyValueStore, MemoryStore, HANDOFF_KEY};
    use crate::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage};

    /// Answers every request with questions whose correct indices follow
    /// `answers`, or with a network error when `answers` is `None`.
    struct ScriptedProvider {
        answers: Option<Vec<i64>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn answering(answers: &[i64]) -> Arc<Self> {
            Arc::new(Self {
                answers: Some(answers.to_vec()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                answers: None,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            request: &GenerateRequest,
        ) -> Result<GenerateResponse, ProviderError> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            let answers = self
                .answers
                .as_ref()
                .ok_or_else(|| ProviderError::NetworkError("unreachable".into()))?;
            let items: Vec<_> = answers
                .iter()
                .enumerate()
                .map(|(i, correct)| {
                    json!({
                        "topic": format!("Tópico {i}"),
                        "statement": format!("Enunciado {i}"),
                        "options": ["A", "B", "C", "D", "E"],
                        "correctIndex": correct,
                        "explanation": "Porque sim."
                    })
                })
                .collect();
            Ok(GenerateResponse {
                content: serde_json::to_string(&items).unwrap(),
                model: request.model.clone(),
                token_usage: TokenUsage::default(),
                latency_ms: 0,
            })
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    /// Memory store that counts writes and can be told to fail them.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
        fail_writes: std::sync::atomic::AtomicBool,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    struct Fixture {
        store: Arc<CountingStore>,
        clock: Arc<ManualClock>,
        provider: Arc<ScriptedProvider>,
    }

    impl Fixture {
        fn new(provider: Arc<ScriptedProvider>) -> Self {
            Self {
                store: Arc::new(CountingStore::default()),
                clock: Arc::new(ManualClock::new()),
                provider,
            }
        }

        fn session(&self, request: ExamRequest) -> ExamSession {
            ExamSession::new(request, HandoffStore::new(self.store.clone()))
                .with_clock(self.clock.clone())
        }

        fn generator(&self) -> QuestionGenerator {
            QuestionGenerator::new(self.provider.clone(), "test-model")
        }

        async fn started(&self, request: ExamRequest, profile: &Profile) -> ExamSession {
            let mut session = self.session(request);
            session.start(&self.generator(), profile).await.unwrap();
            session
        }
    }

    fn math(count: u32) -> ExamRequest {
        ExamRequest::new(Subject::Math, count, SimulationMode::Standard)
    }

    fn answer(session: &mut ExamSession, option: usize) -> SimulationResult {
        session.select_option(option).unwrap();
        let result = session.check_answer().unwrap();
        session.advance().unwrap();
        result
    }

    #[tokio::test]
    async fn low_math_scenario_two_of_three() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[0, 1, 2]));
        let mut profile = Profile::default();
        profile.proficiencies[Subject::Math] = Proficiency::Low;

        let mut session = fixture.started(math(3), &profile).await;
        let prompt = fixture.provider.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("Gere 3 questões"));
        assert!(prompt.contains("fácil a médio"));
        assert!(prompt.contains("didática e sucinta"));

        assert!(answer(&mut session, 0).is_correct);
        assert!(answer(&mut session, 1).is_correct);
        assert!(!answer(&mut session, 4).is_correct);
        assert!(session.is_complete());

        let bundle = session.bundle().unwrap();
        assert_eq!(bundle.results.len(), bundle.questions.len());
        for (question, result) in bundle.questions.iter().zip(&bundle.results) {
            assert_eq!(question.id, result.question_id);
        }

        let summary = summarize(bundle).unwrap();
        assert_eq!(summary.correct_count, 2);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.percentage, 67);
        assert_eq!(summary.feedback, Feedback::Good);
    }

    #[tokio::test]
    async fn uses_profile_proficiency_for_subject() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[0]));
        let mut profile = Profile::default();
        profile.proficiencies[Subject::Nature] = Proficiency::High;
        let request = ExamRequest::new(Subject::Nature, 1, SimulationMode::Practice);
        fixture.started(request, &profile).await;

        let prompt = fixture.provider.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("raciocínio complexo"));
        assert!(prompt.contains("EXTREMAMENTE DETALHADA"));
    }

    #[tokio::test]
    async fn loading_cannot_be_entered_twice() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[0, 0]));
        let profile = Profile::default();
        let mut session = fixture.started(math(2), &profile).await;

        let err = session
            .start(&fixture.generator(), &profile)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::AlreadyStarted));
        assert_eq!(fixture.provider.prompts.lock().unwrap().len(), 1);
        assert_eq!(session.position(), Some((0, 2)));

        // A request abandoned mid-flight still leaves the session in Loading
        let mut abandoned = fixture.session(math(2));
        abandoned.begin_loading().unwrap();
        assert!(matches!(
            abandoned.begin_loading(),
            Err(SessionError::AlreadyStarted)
        ));
        assert!(matches!(
            abandoned.start(&fixture.generator(), &profile).await,
            Err(SessionError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn generation_failure_is_terminal() {
        let fixture = Fixture::new(ScriptedProvider::failing());
        let mut session = fixture.session(math(3));

        let err = session
            .start(&fixture.generator(), &Profile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Generation(_)));
        assert_eq!(session.failure_message(), Some(GENERATION_FAILED_MESSAGE));
        assert!(matches!(session.select_option(0), Err(SessionError::Finished)));
        assert!(matches!(session.check_answer(), Err(SessionError::Finished)));
        assert!(matches!(session.advance(), Err(SessionError::Finished)));
        assert_eq!(fixture.store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_batch_fails_the_session() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[]));
        let mut session = fixture.session(math(3));
        let err = session
            .start(&fixture.generator(), &Profile::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Generation(GenerationError::NoQuestions)
        ));
        assert_eq!(session.state().name(), "failed");
    }

    #[tokio::test]
    async fn operations_before_start_are_rejected() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[0]));
        let mut session = fixture.session(math(1));
        assert!(matches!(
            session.select_option(0),
            Err(SessionError::NotInProgress)
        ));
        assert!(matches!(
            session.finish_loading(Ok(vec![])),
            Err(SessionError::NotLoading)
        ));
        assert_eq!(session.progress(), 0.0);
    }

    #[tokio::test]
    async fn check_without_selection_is_rejected() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[1]));
        let mut session = fixture.started(math(1), &Profile::default()).await;

        assert!(matches!(session.check_answer(), Err(SessionError::NoSelection)));
        assert!(session.results().is_empty());
        assert!(!session.is_checked());
    }

    #[tokio::test]
    async fn second_check_does_not_record_twice() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[1, 1]));
        let mut session = fixture.started(math(2), &Profile::default()).await;

        session.select_option(1).unwrap();
        session.check_answer().unwrap();
        assert!(matches!(
            session.check_answer(),
            Err(SessionError::AlreadyChecked)
        ));
        assert_eq!(session.results().len(), 1);
    }

    #[tokio::test]
    async fn selection_is_frozen_after_check() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[1]));
        let mut session = fixture.started(math(1), &Profile::default()).await;

        session.select_option(3).unwrap();
        session.select_option(2).unwrap();
        assert_eq!(session.selected(), Some(2));
        let result = session.check_answer().unwrap();
        assert_eq!(result.selected_option_index, 2);

        assert!(matches!(
            session.select_option(1),
            Err(SessionError::AlreadyChecked)
        ));
        assert_eq!(session.selected(), Some(2));
    }

    #[tokio::test]
    async fn option_must_exist() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[1]));
        let mut session = fixture.started(math(1), &Profile::default()).await;
        assert!(matches!(
            session.select_option(OPTION_COUNT),
            Err(SessionError::OptionOutOfRange(5))
        ));
        assert_eq!(session.selected(), None);
    }

    #[tokio::test]
    async fn advance_requires_check() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[0, 0]));
        let mut session = fixture.started(math(2), &Profile::default()).await;

        assert!(matches!(session.advance(), Err(SessionError::NotChecked)));
        session.select_option(0).unwrap();
        assert!(matches!(session.advance(), Err(SessionError::NotChecked)));
        assert_eq!(session.position(), Some((0, 2)));
        assert!(session.results().is_empty());

        session.check_answer().unwrap();
        assert_eq!(session.advance().unwrap(), Advance::Next { index: 1 });
        assert_eq!(session.selected(), None);
        assert!(!session.is_checked());
    }

    #[tokio::test]
    async fn completion_writes_one_handoff_record() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[0, 1, 2, 3, 4]));
        let mut session = fixture.started(math(5), &Profile::default()).await;

        for i in 0..4 {
            answer(&mut session, i);
            assert_eq!(fixture.store.writes.load(Ordering::SeqCst), 0);
        }
        session.select_option(4).unwrap();
        session.check_answer().unwrap();
        assert_eq!(session.advance().unwrap(), Advance::Completed);
        assert_eq!(fixture.store.writes.load(Ordering::SeqCst), 1);

        assert!(matches!(session.advance(), Err(SessionError::Finished)));
        assert!(matches!(session.select_option(0), Err(SessionError::Finished)));
        assert_eq!(fixture.store.writes.load(Ordering::SeqCst), 1);

        let stored = HandoffStore::new(fixture.store.clone()).load().unwrap();
        assert_eq!(Some(&stored), session.bundle());
        assert!(fixture.store.get(HANDOFF_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn failed_handoff_can_be_retried() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[0]));
        let mut session = fixture.started(math(1), &Profile::default()).await;
        session.select_option(0).unwrap();
        session.check_answer().unwrap();

        fixture.store.fail_writes.store(true, Ordering::SeqCst);
        assert!(matches!(session.advance(), Err(SessionError::Storage(_))));
        assert!(session.is_checked());
        assert_eq!(session.results().len(), 1);

        fixture.store.fail_writes.store(false, Ordering::SeqCst);
        assert_eq!(session.advance().unwrap(), Advance::Completed);
        assert_eq!(session.results().len(), 1);
    }

    #[tokio::test]
    async fn time_taken_is_measured_per_question() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[0, 0]));
        let mut session = fixture.started(math(2), &Profile::default()).await;

        fixture.clock.advance(Duration::from_millis(12_500));
        session.select_option(0).unwrap();
        let first = session.check_answer().unwrap();
        assert!((first.time_taken_seconds - 12.5).abs() < 1e-9);

        // Time spent reading the explanation does not count
        fixture.clock.advance(Duration::from_secs(30));
        session.advance().unwrap();
        fixture.clock.advance(Duration::from_secs(4));
        session.select_option(0).unwrap();
        let second = session.check_answer().unwrap();
        assert!((second.time_taken_seconds - 4.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn progress_counts_answered_questions() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[0, 0, 0, 0]));
        let mut session = fixture.started(math(4), &Profile::default()).await;
        assert_eq!(session.progress(), 0.0);

        session.select_option(0).unwrap();
        session.check_answer().unwrap();
        assert_eq!(session.progress(), 0.25);
        session.advance().unwrap();
        assert_eq!(session.progress(), 0.25);

        for _ in 1..4 {
            answer(&mut session, 0);
        }
        assert_eq!(session.progress(), 1.0);
    }

    #[tokio::test]
    async fn new_session_starts_clean() {
        let fixture = Fixture::new(ScriptedProvider::answering(&[0, 0, 0]));
        let profile = Profile::default();
        let mut first = fixture.started(math(3), &profile).await;
        for _ in 0..3 {
            answer(&mut first, 0);
        }
        assert!(first.is_complete());

        let second = fixture.started(math(3), &profile).await;
        assert_ne!(second.id(), first.id());
        assert!(second.results().is_empty());
        assert_eq!(second.position(), Some((0, 3)));
        assert!(!second.is_complete());
        let first_ids: Vec<_> = first.bundle().unwrap().questions.iter().map(|q| &q.id).collect();
        assert!(second
            .progress_state()
            .unwrap()
            .questions()
            .iter()
            .all(|q| !first_ids.contains(&&q.id)));
    }

    #[test]
    fn request_from_params() {
        let request = ExamRequest::from_params(Some("math"), None, None).unwrap();
        assert_eq!(request, math(ExamRequest::DEFAULT_COUNT));

        let request =
            ExamRequest::from_params(Some("Nat"), Some("10"), Some("practice")).unwrap();
        assert_eq!(
            request,
            ExamRequest::new(Subject::Nature, 10, SimulationMode::Practice)
        );
    }

    #[test]
    fn missing_subject_is_configuration_error() {
        assert!(matches!(
            ExamRequest::from_params(None, Some("5"), None),
            Err(SessionError::MissingSubject)
        ));
        assert!(matches!(
            ExamRequest::from_params(Some("  "), None, None),
            Err(SessionError::MissingSubject)
        ));
    }

    #[test]
    fn invalid_params_are_rejected() {
        assert!(matches!(
            ExamRequest::from_params(Some("chemistry"), None, None),
            Err(SessionError::InvalidParameter { name: "subject", .. })
        ));
        assert!(matches!(
            ExamRequest::from_params(Some("math"), Some("0"), None),
            Err(SessionError::InvalidParameter { name: "count", .. })
        ));
        assert!(matches!(
            ExamRequest::from_params(Some("math"), Some("five"), None),
            Err(SessionError::InvalidParameter { name: "count", .. })
        ));
        assert!(matches!(
            ExamRequest::from_params(Some("math"), None, Some("timed")),
            Err(SessionError::InvalidParameter { name: "mode", .. })
        ));
    }
}
