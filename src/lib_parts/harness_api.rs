use super::*;

pub(crate) const ACTION_STACK_SIZE: usize = 32 * 1024 * 1024;

/// A loaded page: its DOM, listeners, focus state and submission log.
#[derive(Debug)]
pub struct Harness {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) navigator: Option<FormNavigator>,
    pub(crate) active_element: Option<NodeId>,
    pub(crate) submissions: Vec<Submission>,
    pub(crate) event_log: Vec<String>,
    pub(crate) trace_state: TraceState,
}

impl Harness {
    /// Parses `html` and runs the form navigator once parsing has finished.
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_options(html, HarnessOptions::default())
    }

    /// Parses `html` as a plain page: Enter keeps its browser defaults.
    pub fn from_html_without_navigation(html: &str) -> Result<Self> {
        Self::from_html_with_options(
            html,
            HarnessOptions {
                navigation: false,
                ..HarnessOptions::default()
            },
        )
    }

    pub fn from_html_with_options(html: &str, options: HarnessOptions) -> Result<Self> {
        options.validate()?;
        let dom = stacker::grow(ACTION_STACK_SIZE, || parse_html(html))?;
        let mut harness = Self {
            dom,
            listeners: ListenerStore::default(),
            navigator: None,
            active_element: None,
            submissions: Vec::new(),
            event_log: Vec::new(),
            trace_state: TraceState::from_options(&options),
        };

        if options.navigation {
            stacker::grow(ACTION_STACK_SIZE, || harness.dom_content_loaded());
        }

        Ok(harness)
    }

    // Runs exactly once per page, right after parsing.
    fn dom_content_loaded(&mut self) {
        let navigator = FormNavigator::initialize(&self.dom);
        for (field, form, index) in navigator.bindings() {
            self.listeners.add(
                field,
                "keydown",
                Listener {
                    capture: false,
                    handler: ListenerHandler::AdvanceOnEnter { form, index },
                },
            );
        }

        if self.trace_state.enabled && self.trace_state.navigation {
            for sequence in navigator.forms() {
                let fields = sequence
                    .fields()
                    .iter()
                    .map(|field| self.trace_node_label(*field))
                    .collect::<Vec<_>>()
                    .join(",");
                let line = format!(
                    "[nav] form={} fields={}",
                    self.trace_node_label(sequence.form()),
                    if fields.is_empty() { "none" } else { fields.as_str() }
                );
                self.trace_nav_line(line);
            }
        }

        self.navigator = Some(navigator);
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// The navigator built at load time; `None` for pages loaded without it.
    pub fn navigator(&self) -> Option<&FormNavigator> {
        self.navigator.as_ref()
    }

    /// Labels of the fields Enter walks through in the form at `selector`.
    pub fn field_sequence(&self, selector: &str) -> Result<Vec<String>> {
        let form = self.select_one(selector)?;
        if !self.dom.is_tag(form, "form") {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "form".into(),
                actual: self.dom.tag_name(form).unwrap_or("non-element").to_string(),
            });
        }
        Ok(self
            .navigator
            .as_ref()
            .and_then(|navigator| navigator.sequence_for_form(form))
            .map(|sequence| {
                sequence
                    .fields()
                    .iter()
                    .map(|field| self.trace_node_label(*field))
                    .collect()
            })
            .unwrap_or_default())
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace_state.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace_state.logs.drain(..).collect()
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_state.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_state.events = enabled;
    }

    pub fn set_trace_navigation(&mut self, enabled: bool) {
        self.trace_state.navigation = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        self.trace_state.set_log_limit(max_entries)
    }

    /// Records every `event` reaching the element at `selector` in the event
    /// log as `event:target` (plus `:key` for keyboard events).
    pub fn listen(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.listeners.add(
            target,
            event,
            Listener {
                capture: false,
                handler: ListenerHandler::Record,
            },
        );
        Ok(())
    }

    /// Cancels the default action of every `event` reaching `selector`.
    pub fn prevent_default(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.listeners.add(
            target,
            event,
            Listener {
                capture: false,
                handler: ListenerHandler::PreventDefault,
            },
        );
        Ok(())
    }

    pub fn event_log(&self) -> &[String] {
        &self.event_log
    }

    pub fn take_event_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.event_log)
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn take_submissions(&mut self) -> Vec<Submission> {
        std::mem::take(&mut self.submissions)
    }

    /// Label of the focused element, if any.
    pub fn active_element(&self) -> Option<String> {
        self.active_element
            .map(|node| self.trace_node_label(node))
    }

    pub fn assert_focused(&self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.active_element != Some(target) {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("focus on {}", self.trace_node_label(target)),
                actual: format!(
                    "focus on {}",
                    self.active_element().unwrap_or_else(|| "none".into())
                ),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_no_focus(&self) -> Result<()> {
        if let Some(active) = self.active_element {
            return Err(Error::AssertionFailed {
                selector: "document.activeElement".into(),
                expected: "no focused element".into(),
                actual: format!("focus on {}", self.trace_node_label(active)),
                dom_snippet: self.node_snippet(active),
            });
        }
        Ok(())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.checked(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub(crate) fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    pub(crate) fn event_node_label(&self, node: NodeId) -> String {
        if let Some(id) = self.dom.attr(node, "id") {
            if !id.is_empty() {
                return id;
            }
        }
        self.dom
            .tag_name(node)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("node-{}", node.0))
    }

    pub(crate) fn trace_node_label(&self, node: NodeId) -> String {
        if let Some(id) = self.dom.attr(node, "id") {
            if !id.is_empty() {
                return format!("#{id}");
            }
        }
        self.dom
            .tag_name(node)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| {
                if node == self.dom.root {
                    "document".into()
                } else {
                    format!("node-{}", node.0)
                }
            })
    }

    pub(crate) fn trace_event_line(&mut self, line: String) {
        if self.trace_state.enabled && self.trace_state.events {
            self.trace_state.push(line);
        }
    }

    pub(crate) fn trace_nav_line(&mut self, line: String) {
        if self.trace_state.enabled && self.trace_state.navigation {
            self.trace_state.push(line);
        }
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        self.trace_state.push(line);
    }
}
