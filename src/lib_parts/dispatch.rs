use super::*;

impl Harness {
    pub(crate) fn dispatch_event(&mut self, mut event: EventState) -> Result<EventState> {
        let target = event.target;

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.dom.parent(node);
        }
        path.reverse();

        // Capture phase.
        for node in &path[..path.len() - 1] {
            event.current_target = *node;
            self.invoke_listeners(*node, &mut event, true)?;
        }

        // Target phase: capture listeners first.
        event.current_target = target;
        self.invoke_listeners(target, &mut event, true)?;
        self.invoke_listeners(target, &mut event, false)?;

        // Bubble phase.
        for node in path[..path.len() - 1].iter().rev() {
            event.current_target = *node;
            self.invoke_listeners(*node, &mut event, false)?;
        }

        event.current_target = target;
        self.trace_event_done(&event);
        Ok(event)
    }

    fn invoke_listeners(
        &mut self,
        node_id: NodeId,
        event: &mut EventState,
        capture: bool,
    ) -> Result<()> {
        let listeners = self.listeners.get(node_id, &event.event_type, capture);
        for listener in listeners {
            if self.trace_state.enabled && self.trace_state.events {
                let phase = if capture { "capture" } else { "bubble" };
                let target_label = self.trace_node_label(event.target);
                let current_label = self.trace_node_label(event.current_target);
                self.trace_event_line(format!(
                    "[event] {} target={} current={} phase={} default_prevented={}",
                    event.event_type, target_label, current_label, phase, event.default_prevented
                ));
            }
            self.run_listener(&listener.handler, event)?;
        }
        Ok(())
    }

    fn run_listener(&mut self, handler: &ListenerHandler, event: &mut EventState) -> Result<()> {
        match handler {
            ListenerHandler::AdvanceOnEnter { form, index } => {
                let Some(key) = event.key.as_deref() else {
                    return Ok(());
                };
                let outcome = self
                    .navigator
                    .as_ref()
                    .map(|navigator| navigator.handle_keydown(*form, *index, key))
                    .unwrap_or(EnterOutcome::Ignored);
                if outcome.prevents_default() {
                    event.default_prevented = true;
                }
                match outcome {
                    EnterOutcome::Advance(next) => {
                        let line = format!(
                            "[nav] enter target={} next={}",
                            self.trace_node_label(event.current_target),
                            self.trace_node_label(next)
                        );
                        self.trace_nav_line(line);
                        self.focus_node(next)?;
                    }
                    EnterOutcome::Suppressed => {
                        let line = format!(
                            "[nav] enter target={} next=none",
                            self.trace_node_label(event.current_target)
                        );
                        self.trace_nav_line(line);
                    }
                    EnterOutcome::Ignored => {}
                }
            }
            ListenerHandler::Record => {
                let mut line = format!(
                    "{}:{}",
                    event.event_type,
                    self.event_node_label(event.target)
                );
                if let Some(key) = &event.key {
                    line.push(':');
                    line.push_str(key);
                }
                self.event_log.push(line);
            }
            ListenerHandler::PreventDefault => {
                event.default_prevented = true;
            }
        }
        Ok(())
    }

    fn trace_event_done(&mut self, event: &EventState) {
        if !(self.trace_state.enabled && self.trace_state.events) {
            return;
        }
        let key_desc = event
            .key
            .as_deref()
            .map(|key| format!(" key={key}"))
            .unwrap_or_default();
        let line = format!(
            "[event] done {} target={}{} default_prevented={}",
            event.event_type,
            self.trace_node_label(event.target),
            key_desc,
            event.default_prevented
        );
        self.trace_event_line(line);
    }

    /// Elements that accept focus: enabled form controls, links with an
    /// `href`, and anything carrying `tabindex`.
    pub(crate) fn is_focusable(&self, node: NodeId) -> bool {
        let Some(element) = self.dom.element(node) else {
            return false;
        };
        if is_form_control(&self.dom, node) {
            return !is_effectively_disabled(&self.dom, node)
                && input_type(&self.dom, node).as_deref() != Some("hidden");
        }
        (element.is_tag("a") && element.has_attr("href")) || element.has_attr("tabindex")
    }

    pub(crate) fn focus_node(&mut self, node: NodeId) -> Result<()> {
        if !self.is_focusable(node) {
            return Ok(());
        }

        if self.active_element == Some(node) {
            return Ok(());
        }

        if let Some(current) = self.active_element {
            self.blur_node(current)?;
        }

        self.active_element = Some(node);
        let line = format!("[focus] {}", self.trace_node_label(node));
        self.trace_event_line(line);
        self.dispatch_event(EventState::new("focusin", node))?;
        self.dispatch_event(EventState::new("focus", node))?;
        Ok(())
    }

    pub(crate) fn blur_node(&mut self, node: NodeId) -> Result<()> {
        if self.active_element != Some(node) {
            return Ok(());
        }

        self.dispatch_event(EventState::new("focusout", node))?;
        self.dispatch_event(EventState::new("blur", node))?;
        self.active_element = None;
        let line = format!("[focus] blur {}", self.trace_node_label(node));
        self.trace_event_line(line);
        Ok(())
    }
}
