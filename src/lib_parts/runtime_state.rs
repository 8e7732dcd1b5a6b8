use super::*;
use std::collections::VecDeque;

/// Load-time settings for a [`Harness`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessOptions {
    /// Run the form navigator when the document finishes parsing.
    pub navigation: bool,
    pub trace: bool,
    pub trace_events: bool,
    pub trace_navigation: bool,
    pub trace_stderr: bool,
    pub trace_log_limit: usize,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            navigation: true,
            trace: false,
            trace_events: true,
            trace_navigation: true,
            trace_stderr: true,
            trace_log_limit: 10_000,
        }
    }
}

impl HarnessOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.trace_log_limit == 0 {
            return Err(Error::InvalidConfig(
                "trace_log_limit requires at least 1 entry".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) navigation: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) log_limit: usize,
    pub(crate) to_stderr: bool,
}

impl TraceState {
    pub(crate) fn from_options(options: &HarnessOptions) -> Self {
        Self {
            enabled: options.trace,
            events: options.trace_events,
            navigation: options.trace_navigation,
            logs: VecDeque::new(),
            log_limit: options.trace_log_limit,
            to_stderr: options.trace_stderr,
        }
    }

    pub(crate) fn push(&mut self, line: String) {
        if !self.enabled {
            return;
        }
        if self.to_stderr {
            eprintln!("{line}");
        }
        if self.logs.len() >= self.log_limit {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }

    pub(crate) fn set_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidConfig(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.log_limit = max_entries;
        while self.logs.len() > self.log_limit {
            self.logs.pop_front();
        }
        Ok(())
    }
}

/// A form submission that was not cancelled by a `submit` listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Label of the submitted form (`#id`, or the tag name without an id).
    pub form: String,
    /// Label of the submit control that triggered the submission, if any.
    pub submitter: Option<String>,
    /// Name/value pairs of the successful controls, in tree order.
    pub entries: Vec<(String, String)>,
}
