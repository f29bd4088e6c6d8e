//! Solve client: sends the rendered canvas to a recognition service.
//!
//! Requests carry the PNG data URL, optional free text, and the variables
//! assigned by earlier answers. Requests run on a worker thread; the session
//! stays `Loading` until the result is collected. Failures are reported once
//! as a generic message and never retried.

use crate::typeset::MathTypesetter;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc::{self, TryRecvError};
use thiserror::Error;

/// Message shown for any failed solve.
pub const SOLVE_FAILED_MESSAGE: &str = "Could not solve the drawing. Please try again.";

/// Solve errors.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("Nothing to solve: the canvas image is empty")]
    EmptyImage,
    #[error("Request failed: {0}")]
    Http(String),
    #[error("Solve service returned status {0}")]
    Status(u16),
    #[error("Failed to decode solve response: {0}")]
    Decode(String),
    #[error("Solver stopped without a result")]
    Disconnected,
}

/// Body posted to the solve endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    /// `data:image/png;base64,...`
    pub image: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub dict_of_vars: BTreeMap<String, String>,
}

/// One recognised expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveAnswer {
    pub expr: String,
    #[serde(deserialize_with = "string_or_number")]
    pub result: String,
    /// When set, `expr` is a variable name bound to `result`.
    #[serde(default)]
    pub assign: bool,
}

impl SolveAnswer {
    pub fn new(expr: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            result: result.into(),
            assign: false,
        }
    }

    pub fn to_latex(&self) -> String {
        format!("{} = {}", self.expr, self.result)
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Response envelope from the service.
#[derive(Debug, Clone, Deserialize)]
pub struct SolveResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Vec<SolveAnswer>,
}

/// A recognition backend. Called from a worker thread.
pub trait Solver: Send + Sync {
    fn solve(&self, request: &SolveRequest) -> Result<Vec<SolveAnswer>, SolveError>;
}

/// Offline backend returning fixed answers.
#[derive(Debug, Clone)]
pub struct SimulatedSolver {
    pub answers: Vec<SolveAnswer>,
}

impl Default for SimulatedSolver {
    fn default() -> Self {
        Self {
            answers: vec![SolveAnswer::new("2 + 2", "4")],
        }
    }
}

impl Solver for SimulatedSolver {
    fn solve(&self, request: &SolveRequest) -> Result<Vec<SolveAnswer>, SolveError> {
        if request.image.is_empty() {
            return Err(SolveError::EmptyImage);
        }
        Ok(self.answers.clone())
    }
}

#[cfg(feature = "http")]
pub use http::HttpSolver;

#[cfg(feature = "http")]
mod http {
    use super::{SolveAnswer, SolveError, SolveRequest, SolveResponse, Solver};
    use std::time::Duration;

    const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Posts requests to a solve endpoint as JSON.
    pub struct HttpSolver {
        client: reqwest::blocking::Client,
        endpoint: String,
    }

    impl HttpSolver {
        pub fn new(endpoint: impl Into<String>) -> Result<Self, SolveError> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .map_err(|e| SolveError::Http(e.to_string()))?;
            Ok(Self {
                client,
                endpoint: endpoint.into(),
            })
        }
    }

    impl Solver for HttpSolver {
        fn solve(&self, request: &SolveRequest) -> Result<Vec<SolveAnswer>, SolveError> {
            if request.image.is_empty() {
                return Err(SolveError::EmptyImage);
            }
            let response = self
                .client
                .post(&self.endpoint)
                .json(request)
                .send()
                .map_err(|e| SolveError::Http(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(SolveError::Status(status.as_u16()));
            }
            let body: SolveResponse = response.json().map_err(|e| SolveError::Decode(e.to_string()))?;
            log::debug!("Solve service: {}", body.message);
            Ok(body.data)
        }
    }
}

/// Where the solve action is.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SolveState {
    #[default]
    Idle,
    Loading,
    Solved(Vec<SolveAnswer>),
    Failed(String),
}

impl SolveState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SolveState::Loading)
    }
}

type SolveResult = Result<Vec<SolveAnswer>, SolveError>;

/// Solve state plus the variables accumulated across solves.
#[derive(Debug, Default)]
pub struct SolveSession {
    state: SolveState,
    vars: BTreeMap<String, String>,
    pending: Option<mpsc::Receiver<SolveResult>>,
}

impl SolveSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SolveState {
        &self.state
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// A request is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn request(&self, image: impl Into<String>, question: impl Into<String>) -> SolveRequest {
        SolveRequest {
            image: image.into(),
            question: question.into(),
            dict_of_vars: self.vars.clone(),
        }
    }

    /// Send a request on a worker thread and enter `Loading`. Ignored while
    /// another request is in flight.
    pub fn start(&mut self, solver: Arc<dyn Solver>, image: impl Into<String>, question: impl Into<String>) -> &SolveState {
        if self.is_pending() {
            log::debug!("Solve already in flight");
            return &self.state;
        }
        let request = self.request(image, question);
        log::info!("Solving canvas ({} known variables)", request.dict_of_vars.len());
        let (sender, receiver) = mpsc::channel();
        std::thread::spawn(move || {
            // The session may have been reset meanwhile.
            let _ = sender.send(solver.solve(&request));
        });
        self.pending = Some(receiver);
        self.state = SolveState::Loading;
        &self.state
    }

    /// Collect the result if it has arrived, without blocking.
    pub fn poll(&mut self) -> &SolveState {
        let result = match self.pending.as_ref().map(mpsc::Receiver::try_recv) {
            Some(Ok(result)) => result,
            Some(Err(TryRecvError::Disconnected)) => Err(SolveError::Disconnected),
            Some(Err(TryRecvError::Empty)) | None => return &self.state,
        };
        self.finish(result);
        &self.state
    }

    /// Block until the request in flight resolves.
    pub fn wait(&mut self) -> &SolveState {
        if let Some(receiver) = self.pending.take() {
            let result = receiver.recv().unwrap_or(Err(SolveError::Disconnected));
            self.finish(result);
        }
        &self.state
    }

    /// Run one solve to completion.
    pub fn solve(&mut self, solver: Arc<dyn Solver>, image: impl Into<String>, question: impl Into<String>) -> &SolveState {
        self.start(solver, image, question);
        self.wait()
    }

    fn finish(&mut self, result: SolveResult) {
        self.pending = None;
        self.state = match result {
            Ok(answers) => {
                for answer in answers.iter().filter(|a| a.assign) {
                    self.vars.insert(answer.expr.clone(), answer.result.clone());
                }
                log::info!("Solve returned {} answers", answers.len());
                SolveState::Solved(answers)
            }
            Err(err) => {
                log::warn!("Solve failed: {err}");
                SolveState::Failed(SOLVE_FAILED_MESSAGE.to_string())
            }
        };
    }

    /// Typeset the latest answers for display.
    pub fn render_answers(&self, typesetter: &dyn MathTypesetter) -> Vec<String> {
        match &self.state {
            SolveState::Solved(answers) => answers.iter().map(|a| typesetter.render(&a.to_latex())).collect(),
            _ => Vec::new(),
        }
    }

    /// Forget answers and variables. A request in flight is abandoned.
    pub fn reset(&mut self) {
        self.pending = None;
        self.state = SolveState::Idle;
        self.vars.clear();
    }
}
