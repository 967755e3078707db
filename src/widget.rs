//! The component a page integration talks to.
//!
//! One widget owns the provider registry, the API settings and the input
//! state. Each call to [`Widget::process_input`] is one submission: resolve
//! the URL, fetch, rescan the form, assign, and report.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use thiserror::Error;

use crate::{
    feedback,
    form::{FieldNames, TrackForm},
    provider::{
        ProviderRegistry, ResourceKind,
        fetch::{FetchError, Transport},
    },
    reconcile::{self, FillCounts, ReconcileError},
};

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("a submission is already in progress")]
    Busy,

    #[error("URL is empty")]
    EmptyInput,

    #[error("URL type is not currently supported: {0}")]
    UnsupportedUrl(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl WidgetError {
    /// Message shown to the user for this failure.
    ///
    /// Input problems get a specific message; anything that went wrong
    /// after the URL was accepted gets the generic notification.
    pub fn user_message(&self) -> &'static str {
        match self {
            WidgetError::Busy => "Please wait for the current request to finish",
            WidgetError::EmptyInput => feedback::EMPTY_URL,
            WidgetError::UnsupportedUrl(_) => feedback::UNSUPPORTED_URL,
            WidgetError::Fetch(_) | WidgetError::Reconcile(_) => feedback::ERROR_NOTIFICATION,
        }
    }
}

/// Whether the URL input and submit button accept a submission.
#[derive(Debug, Default)]
pub struct InputState {
    disabled: AtomicBool,
}

/// Keeps the input disabled while alive.
pub struct InputGuard<'a> {
    state: &'a InputState,
}

impl InputState {
    pub fn disable(&self) -> Result<InputGuard<'_>, WidgetError> {
        if self.disabled.swap(true, Ordering::AcqRel) {
            return Err(WidgetError::Busy);
        }
        Ok(InputGuard { state: self })
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled.load(Ordering::Acquire)
    }
}

impl Drop for InputGuard<'_> {
    fn drop(&mut self) {
        self.state.disabled.store(false, Ordering::Release);
    }
}

/// Outcome of one accepted submission
#[derive(Debug, Clone)]
pub struct FillReport {
    pub provider: &'static str,
    pub kind: ResourceKind,
    pub total: usize,
    pub counts: FillCounts,
    pub message: String,
}

pub struct Widget {
    registry: ProviderRegistry,
    transport: Box<dyn Transport>,
    api_base: String,
    names: FieldNames,
    input: InputState,
    feedback: Mutex<String>,
}

impl Widget {
    pub fn new(
        registry: ProviderRegistry,
        transport: Box<dyn Transport>,
        api_base: &str,
        names: FieldNames,
    ) -> Self {
        Self {
            registry,
            transport,
            api_base: api_base.to_string(),
            names,
            input: InputState::default(),
            feedback: Mutex::new(String::new()),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn is_input_enabled(&self) -> bool {
        self.input.is_enabled()
    }

    /// Current feedback text
    pub fn feedback(&self) -> String {
        self.feedback.lock().map(|f| f.clone()).unwrap_or_default()
    }

    fn report_feedback(&self, message: &str) {
        if let Ok(mut feedback) = self.feedback.lock() {
            *feedback = message.to_string();
        }
    }

    /// Runs one submission of `url` against `form`.
    ///
    /// The form is only touched once the fetch has succeeded, so a failed
    /// fetch leaves it as it was.
    pub fn process_input(&self, url: &str, form: &mut TrackForm) -> Result<FillReport, WidgetError> {
        let _guard = self.input.disable()?;
        self.report_feedback("");

        let result = self.submit(url.trim(), form);
        match &result {
            Ok(report) => self.report_feedback(&report.message),
            Err(err @ (WidgetError::EmptyInput | WidgetError::UnsupportedUrl(_))) => {
                self.report_feedback(err.user_message());
            }
            Err(err) => {
                log::warn!("submission of {url} failed: {err}");
                self.report_feedback("");
            }
        }
        result
    }

    fn submit(&self, url: &str, form: &mut TrackForm) -> Result<FillReport, WidgetError> {
        if url.is_empty() {
            return Err(WidgetError::EmptyInput);
        }
        let handle = self
            .registry
            .resolve(url)
            .ok_or_else(|| WidgetError::UnsupportedUrl(url.to_string()))?;

        self.report_feedback(&feedback::processing(handle.provider, handle.kind));
        log::info!(
            "fetching {} {} from {}",
            handle.provider,
            handle.kind,
            handle.api_url(&self.api_base)
        );
        let tracks = handle.fetch(self.transport.as_ref(), &self.api_base)?;

        if tracks.is_empty() {
            return Ok(FillReport {
                provider: handle.provider,
                kind: handle.kind,
                total: 0,
                counts: FillCounts::default(),
                message: feedback::NO_TRACKS_FOUND.to_string(),
            });
        }

        let counts = reconcile::reconcile(form, &self.names, &tracks)?;
        let message = feedback::summarize(&counts, tracks.len());
        log::info!("{message}");

        Ok(FillReport {
            provider: handle.provider,
            kind: handle.kind,
            total: tracks.len(),
            counts,
            message,
        })
    }
}
