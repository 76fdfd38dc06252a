//! The analysis session: a small state machine driving the user-visible
//! lifecycle (idle → analyzing → completed/error).
//!
//! All transitions go through named methods — [`begin`], [`resolve`],
//! [`fail`], [`reset`] — so the transition table lives in exactly one
//! place; there are no ad hoc flags for views to mutate. The session owns
//! the single result/error slot: one writer, any number of readers.
//!
//! ## Tickets and cancellation
//!
//! [`begin`] hands out a [`Ticket`] stamped with the session generation.
//! `resolve` and `fail` apply only when the ticket is still current, so an
//! in-flight request that outlives a [`reset`] resolves into a no-op
//! instead of mutating state it no longer owns. The same guard covers the
//! advisory status messages: a timer firing after completion cannot
//! overwrite the terminal state's display.
//!
//! [`begin`]: AnalysisSession::begin
//! [`resolve`]: AnalysisSession::resolve
//! [`fail`]: AnalysisSession::fail
//! [`reset`]: AnalysisSession::reset

use crate::error::GENERIC_FAILURE_MESSAGE;
use crate::output::AnalysisResult;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Advisory messages shown while a document analysis is in flight.
///
/// Purely presentational: skipping or reordering them never affects
/// correctness, and the ticket guard stops them at the first terminal
/// transition.
pub static DOCUMENT_STATUS_SCHEDULE: [(u64, &str); 3] = [
    (0, "Reading document structure..."),
    (2_000, "Synthesizing key insights..."),
    (5_000, "Generating concept map..."),
];

/// Advisory message shown while a text analysis is in flight.
pub static TEXT_STATUS_SCHEDULE: [(u64, &str); 1] = [(0, "Analyzing text content...")];

/// User-visible lifecycle of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisStatus {
    #[default]
    Idle,
    Analyzing,
    Completed,
    Error,
}

/// Proof that a request was admitted by [`AnalysisSession::begin`].
///
/// Carries the generation it was issued under; stale tickets are ignored
/// by every transition method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

/// A submission was rejected because one is already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("an analysis is already in progress")]
pub struct SubmitRejected;

/// The state machine owning the current analysis lifecycle.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    status: AnalysisStatus,
    result: Option<AnalysisResult>,
    error_message: Option<String>,
    status_message: Option<String>,
    generation: u64,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> AnalysisStatus {
        self.status
    }

    /// The stored result; `Some` exactly when status is `Completed`.
    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// The surfaced error message; `Some` exactly when status is `Error`.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The current advisory status line, if one applies.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Idle → Analyzing. Admits exactly one request: a second submission
    /// while analyzing (or before a reset) is rejected, never queued.
    pub fn begin(&mut self) -> Result<Ticket, SubmitRejected> {
        if self.status != AnalysisStatus::Idle {
            return Err(SubmitRejected);
        }
        self.generation += 1;
        self.status = AnalysisStatus::Analyzing;
        self.error_message = None;
        self.status_message = None;
        debug!("Session: Idle -> Analyzing (generation {})", self.generation);
        Ok(Ticket {
            generation: self.generation,
        })
    }

    /// Analyzing → Completed. No-op (returns `false`) for a stale ticket or
    /// outside `Analyzing`.
    pub fn resolve(&mut self, ticket: Ticket, result: AnalysisResult) -> bool {
        if !self.admits(ticket) {
            return false;
        }
        self.status = AnalysisStatus::Completed;
        self.result = Some(result);
        self.status_message = None;
        debug!("Session: Analyzing -> Completed");
        true
    }

    /// Analyzing → Error. The surfaced message defaults to
    /// "Something went wrong." when none is provided. No-op for a stale
    /// ticket or outside `Analyzing`.
    pub fn fail(&mut self, ticket: Ticket, message: Option<String>) -> bool {
        if !self.admits(ticket) {
            return false;
        }
        self.status = AnalysisStatus::Error;
        self.error_message = Some(message.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()));
        self.status_message = None;
        debug!("Session: Analyzing -> Error");
        true
    }

    /// Any state → Idle. Clears result and error unconditionally and bumps
    /// the generation, so anything still in flight becomes a no-op.
    /// Idempotent.
    pub fn reset(&mut self) {
        self.status = AnalysisStatus::Idle;
        self.result = None;
        self.error_message = None;
        self.status_message = None;
        self.generation += 1;
        debug!("Session: reset -> Idle (generation {})", self.generation);
    }

    /// Update the advisory status line. Guarded like the terminal
    /// transitions: stale timers cannot overwrite anything.
    pub fn set_status_message(&mut self, ticket: Ticket, message: impl Into<String>) -> bool {
        if !self.admits(ticket) {
            return false;
        }
        self.status_message = Some(message.into());
        true
    }

    fn admits(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation && self.status == AnalysisStatus::Analyzing
    }
}

/// Walk a status-message schedule against a shared session.
///
/// Stops at the first guarded update that reports the ticket stale, which
/// happens as soon as the session leaves `Analyzing`.
pub async fn drive_status_messages(
    session: Arc<Mutex<AnalysisSession>>,
    ticket: Ticket,
    schedule: &[(u64, &str)],
) {
    let start = tokio::time::Instant::now();
    for &(delay_ms, message) in schedule {
        tokio::time::sleep_until(start + Duration::from_millis(delay_ms)).await;
        let applied = match session.lock() {
            Ok(mut s) => s.set_status_message(ticket, message),
            Err(_) => return,
        };
        if !applied {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DistillError;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            title: "T".into(),
            summary: "S".into(),
            key_points: vec!["k".into()],
            diagram_source: "graph TD\nA-->B".into(),
            original_language: "English".into(),
            translation: Some("t".into()),
        }
    }

    #[test]
    fn happy_path_reaches_completed() {
        let mut session = AnalysisSession::new();
        let ticket = session.begin().unwrap();
        assert_eq!(session.status(), AnalysisStatus::Analyzing);

        assert!(session.resolve(ticket, sample_result()));
        assert_eq!(session.status(), AnalysisStatus::Completed);
        assert_eq!(session.result().unwrap().title, "T");
        assert!(session.status_message().is_none());
    }

    #[test]
    fn second_submission_while_analyzing_is_rejected() {
        let mut session = AnalysisSession::new();
        let _ticket = session.begin().unwrap();
        assert_eq!(session.begin(), Err(SubmitRejected));
    }

    #[test]
    fn submission_from_terminal_states_is_rejected_until_reset() {
        let mut session = AnalysisSession::new();
        let ticket = session.begin().unwrap();
        session.fail(ticket, None);
        assert_eq!(session.begin(), Err(SubmitRejected));

        session.reset();
        assert!(session.begin().is_ok());
    }

    #[test]
    fn failure_surfaces_user_safe_message() {
        let mut session = AnalysisSession::new();
        let ticket = session.begin().unwrap();
        let err = DistillError::NoResponse;
        assert!(session.fail(ticket, Some(err.user_message())));
        assert_eq!(session.status(), AnalysisStatus::Error);
        assert_eq!(
            session.error_message(),
            Some("Failed to analyze content. Please try again.")
        );
    }

    #[test]
    fn failure_without_message_uses_generic_default() {
        let mut session = AnalysisSession::new();
        let ticket = session.begin().unwrap();
        session.fail(ticket, None);
        assert_eq!(session.error_message(), Some("Something went wrong."));
    }

    #[test]
    fn reset_is_idempotent_from_every_state() {
        let mut session = AnalysisSession::new();

        // From Completed
        let ticket = session.begin().unwrap();
        session.resolve(ticket, sample_result());
        session.reset();
        session.reset();
        assert_eq!(session.status(), AnalysisStatus::Idle);
        assert!(session.result().is_none());
        assert!(session.error_message().is_none());

        // From Analyzing
        let _ticket = session.begin().unwrap();
        session.reset();
        assert_eq!(session.status(), AnalysisStatus::Idle);

        // From Idle
        session.reset();
        assert_eq!(session.status(), AnalysisStatus::Idle);
    }

    #[test]
    fn canceled_request_resolution_is_a_no_op() {
        let mut session = AnalysisSession::new();
        let ticket = session.begin().unwrap();
        session.reset();

        // The in-flight request finally resolves; nothing may change.
        assert!(!session.resolve(ticket, sample_result()));
        assert!(!session.fail(ticket, Some("late".into())));
        assert_eq!(session.status(), AnalysisStatus::Idle);
        assert!(session.result().is_none());
    }

    #[test]
    fn stale_ticket_from_previous_run_is_ignored() {
        let mut session = AnalysisSession::new();
        let old = session.begin().unwrap();
        session.reset();
        let fresh = session.begin().unwrap();

        assert!(!session.resolve(old, sample_result()));
        assert_eq!(session.status(), AnalysisStatus::Analyzing);
        assert!(session.resolve(fresh, sample_result()));
    }

    #[test]
    fn stale_status_message_cannot_overwrite_terminal_state() {
        let mut session = AnalysisSession::new();
        let ticket = session.begin().unwrap();
        assert!(session.set_status_message(ticket, "Reading document structure..."));

        session.resolve(ticket, sample_result());
        // A timer scheduled before completion fires late.
        assert!(!session.set_status_message(ticket, "Generating concept map..."));
        assert!(session.status_message().is_none());
    }

    #[tokio::test]
    async fn status_schedule_stops_after_completion() {
        let session = Arc::new(Mutex::new(AnalysisSession::new()));
        let ticket = session.lock().unwrap().begin().unwrap();

        let schedule: &[(u64, &str)] = &[(0, "first"), (5, "second"), (10, "third")];
        let driver = tokio::spawn({
            let session = Arc::clone(&session);
            async move { drive_status_messages(session, ticket, schedule).await }
        });

        // Let the first message land, then complete the analysis.
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(session.lock().unwrap().status_message(), Some("first"));
        session.lock().unwrap().resolve(ticket, sample_result());

        driver.await.unwrap();
        assert!(session.lock().unwrap().status_message().is_none());
        assert_eq!(session.lock().unwrap().status(), AnalysisStatus::Completed);
    }
}
