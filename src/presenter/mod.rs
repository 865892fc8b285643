//! Result lookup presenter.
//!
//! Validates the lookup form, issues at most one request at a time per
//! presenter, and turns responses into a [`ResultView`]. Responses that
//! arrive after the presenter was reset are dropped.

mod form;

pub use form::{FormError, LookupForm};

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError, LookupOutcome, LookupQuery, PublishedExam};
use crate::scoring::StudentExamResult;

pub const NOT_FOUND_MESSAGE: &str =
    "Result not found. Please check your Roll Number and Date of Birth.";

/// Where the presenter gets exams and results from
pub trait ResultSource {
    fn published_exams(
        &self,
    ) -> impl Future<Output = Result<Vec<PublishedExam>, ApiError>> + Send;

    fn lookup(
        &self,
        query: &LookupQuery,
    ) -> impl Future<Output = Result<LookupOutcome, ApiError>> + Send;
}

impl ResultSource for ApiClient {
    fn published_exams(
        &self,
    ) -> impl Future<Output = Result<Vec<PublishedExam>, ApiError>> + Send {
        self.list_published_exams()
    }

    fn lookup(
        &self,
        query: &LookupQuery,
    ) -> impl Future<Output = Result<LookupOutcome, ApiError>> + Send {
        self.lookup_result(query)
    }
}

/// What the result panel currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultView {
    #[default]
    Idle,
    Loading,
    Found(Box<StudentExamResult>),
    NotFound,
    Failed(String),
    Invalid(String),
}

impl ResultView {
    /// Message to show instead of a result, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            ResultView::NotFound => Some(NOT_FOUND_MESSAGE),
            ResultView::Failed(msg) | ResultView::Invalid(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&StudentExamResult> {
        match self {
            ResultView::Found(result) => Some(result),
            _ => None,
        }
    }
}

/// What happened to a submit
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStatus {
    /// Local validation failed; nothing was sent
    Rejected(FormError),
    /// A lookup is already in flight; nothing was sent
    Busy,
    /// The response was rendered into the view
    Applied,
    /// The response arrived after a newer request or a reset and was dropped
    Superseded,
}

#[derive(Debug, Default)]
struct PresenterState {
    view: ResultView,
    in_flight: bool,
    sequence: u64,
}

/// Holds the in-flight slot for one submit. Dropping the submit future
/// before its response lands frees the slot so the form is usable again.
struct InFlight<'a> {
    state: &'a Mutex<PresenterState>,
    ticket: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.in_flight && state.sequence == self.ticket {
            debug!(ticket = self.ticket, "lookup cancelled before a response arrived");
            state.in_flight = false;
            state.view = ResultView::Idle;
        }
    }
}

pub struct ResultPresenter<S> {
    source: S,
    state: Mutex<PresenterState>,
}

impl<S: ResultSource> ResultPresenter<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(PresenterState::default()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, PresenterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn view(&self) -> ResultView {
        self.lock().view.clone()
    }

    /// False while a lookup is in flight (the submit button is disabled)
    pub fn can_submit(&self) -> bool {
        !self.lock().in_flight
    }

    /// Exams to offer in the exam picker
    pub async fn published_exams(&self) -> Result<Vec<PublishedExam>, ApiError> {
        self.source.published_exams().await
    }

    /// Clear the view. Any lookup still in flight will be dropped when it
    /// completes, and a new submit is allowed immediately.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.sequence += 1;
        state.in_flight = false;
        state.view = ResultView::Idle;
    }

    /// Validate the form and, if valid, look the result up.
    ///
    /// Failures are terminal for this submit; nothing is retried.
    pub async fn submit(&self, form: &LookupForm) -> SubmitStatus {
        let (ticket, query) = {
            let mut state = self.lock();
            if state.in_flight {
                return SubmitStatus::Busy;
            }
            match form.validate() {
                Ok(query) => {
                    state.sequence += 1;
                    state.in_flight = true;
                    state.view = ResultView::Loading;
                    (state.sequence, query)
                }
                Err(err) => {
                    state.view = ResultView::Invalid(err.to_string());
                    return SubmitStatus::Rejected(err);
                }
            }
        };
        let _slot = InFlight {
            state: &self.state,
            ticket,
        };

        let outcome = self.source.lookup(&query).await;

        // Released before `_slot`, which then finds nothing left to undo
        let mut state = self.lock();
        if state.sequence != ticket {
            debug!(ticket, latest = state.sequence, "dropping stale lookup response");
            return SubmitStatus::Superseded;
        }
        state.in_flight = false;
        state.view = match outcome {
            Ok(LookupOutcome::Found(result)) => ResultView::Found(result),
            Ok(LookupOutcome::NotFound) => ResultView::NotFound,
            Err(err) => {
                warn!(error = %err, exam_id = query.exam_id, "result lookup failed");
                ResultView::Failed(err.user_message())
            }
        };
        SubmitStatus::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn result(student_id: u64, percentage: f64) -> StudentExamResult {
        StudentExamResult {
            student_id,
            admission_no: format!("A-{}", student_id),
            roll_no: None,
            exam_roll_number: Some("R045".to_string()),
            first_name: "Asha".to_string(),
            last_name: None,
            subjects: vec![],
            total_marks_obtained: percentage,
            total_max_marks: 100.0,
            percentage,
            grade: None,
            grade_point: None,
            is_pass: true,
            rank: None,
        }
    }

    /// Answers by roll number: "R045" found, "SLOW" found after the gate opens,
    /// "DOWN" server error, anything else not found.
    struct FakeSource {
        calls: AtomicUsize,
        gate: Arc<Notify>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                gate: Arc::new(Notify::new()),
            }
        }
    }

    impl ResultSource for FakeSource {
        fn published_exams(
            &self,
        ) -> impl Future<Output = Result<Vec<PublishedExam>, ApiError>> + Send {
            async { Ok(vec![]) }
        }

        fn lookup(
            &self,
            query: &LookupQuery,
        ) -> impl Future<Output = Result<LookupOutcome, ApiError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let roll = query.roll_number.clone();
            let gate = self.gate.clone();
            async move {
                match roll.as_str() {
                    "R045" => Ok(LookupOutcome::Found(Box::new(result(5, 72.0)))),
                    "SLOW" => {
                        gate.notified().await;
                        Ok(LookupOutcome::Found(Box::new(result(9, 10.0))))
                    }
                    "DOWN" => Err(ApiError::Server {
                        status: 503,
                        message: Some("Results are being published".to_string()),
                    }),
                    "MUTE" => Err(ApiError::Server {
                        status: 500,
                        message: None,
                    }),
                    _ => Ok(LookupOutcome::NotFound),
                }
            }
        }
    }

    fn form(roll: &str) -> LookupForm {
        LookupForm::new(Some(1), roll, "2010-05-12")
    }

    #[tokio::test]
    async fn test_found() {
        let presenter = ResultPresenter::new(FakeSource::new());
        assert_eq!(presenter.submit(&form("R045")).await, SubmitStatus::Applied);
        let view = presenter.view();
        assert_eq!(view.result().unwrap().percentage, 72.0);
        assert!(view.message().is_none());
        assert!(presenter.can_submit());
    }

    #[tokio::test]
    async fn test_not_found_is_not_an_error() {
        let presenter = ResultPresenter::new(FakeSource::new());
        assert_eq!(presenter.submit(&form("NOPE")).await, SubmitStatus::Applied);
        assert_eq!(presenter.view(), ResultView::NotFound);
        assert_eq!(presenter.view().message(), Some(NOT_FOUND_MESSAGE));
    }

    #[tokio::test]
    async fn test_server_error_prefers_server_message() {
        let presenter = ResultPresenter::new(FakeSource::new());
        presenter.submit(&form("DOWN")).await;
        assert_eq!(
            presenter.view(),
            ResultView::Failed("Results are being published".to_string())
        );

        presenter.submit(&form("MUTE")).await;
        assert_eq!(
            presenter.view().message(),
            Some(crate::api::error::GENERIC_FAILURE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_empty_dob_sends_nothing() {
        let presenter = ResultPresenter::new(FakeSource::new());
        let status = presenter
            .submit(&LookupForm::new(Some(1), "R045", ""))
            .await;
        assert_eq!(status, SubmitStatus::Rejected(FormError::MissingCredentials));
        assert_eq!(presenter.source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            presenter.view().message(),
            Some("Please enter both Roll Number and Date of Birth.")
        );
    }

    #[tokio::test]
    async fn test_busy_while_in_flight() {
        let presenter = ResultPresenter::new(FakeSource::new());
        let gate = presenter.source.gate.clone();

        let slow_form = form("SLOW");
        let slow = presenter.submit(&slow_form);
        let second = async {
            tokio::task::yield_now().await;
            assert!(!presenter.can_submit());
            assert_eq!(presenter.view(), ResultView::Loading);
            let status = presenter.submit(&form("R045")).await;
            gate.notify_one();
            status
        };

        let (slow_status, second_status) = tokio::join!(slow, second);
        assert_eq!(second_status, SubmitStatus::Busy);
        assert_eq!(slow_status, SubmitStatus::Applied);
        assert_eq!(presenter.view().result().unwrap().student_id, 9);
        assert_eq!(presenter.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_response_dropped_after_reset() {
        let presenter = ResultPresenter::new(FakeSource::new());
        let gate = presenter.source.gate.clone();

        let slow_form = form("SLOW");
        let slow = presenter.submit(&slow_form);
        let newer = async {
            tokio::task::yield_now().await;
            presenter.reset();
            let status = presenter.submit(&form("R045")).await;
            gate.notify_one();
            status
        };

        let (slow_status, newer_status) = tokio::join!(slow, newer);
        assert_eq!(newer_status, SubmitStatus::Applied);
        assert_eq!(slow_status, SubmitStatus::Superseded);
        // The newer result stays on screen
        assert_eq!(presenter.view().result().unwrap().student_id, 5);
        assert!(presenter.can_submit());
    }

    #[tokio::test]
    async fn test_abandoned_submit_frees_the_form() {
        let presenter = ResultPresenter::new(FakeSource::new());
        let slow_form = form("SLOW");

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), presenter.submit(&slow_form)).await;
        assert!(abandoned.is_err());
        assert!(presenter.can_submit());
        assert_eq!(presenter.view(), ResultView::Idle);

        assert_eq!(presenter.submit(&form("R045")).await, SubmitStatus::Applied);
        assert_eq!(presenter.view().result().unwrap().student_id, 5);
        assert_eq!(presenter.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reset_clears_view() {
        let presenter = ResultPresenter::new(FakeSource::new());
        presenter.submit(&form("R045")).await;
        presenter.reset();
        assert_eq!(presenter.view(), ResultView::Idle);
    }
}
