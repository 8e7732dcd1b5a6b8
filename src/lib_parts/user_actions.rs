use super::*;
use super::harness_api::ACTION_STACK_SIZE;

impl Harness {
    pub fn focus(&mut self, selector: &str) -> Result<()> {
        stacker::grow(ACTION_STACK_SIZE, || {
            let target = self.select_one(selector)?;
            self.focus_node(target)
        })
    }

    pub fn blur(&mut self, selector: &str) -> Result<()> {
        stacker::grow(ACTION_STACK_SIZE, || {
            let target = self.select_one(selector)?;
            self.blur_node(target)
        })
    }

    /// Presses and releases `key` on the element at `selector`.
    ///
    /// The element is focused first. `keydown` goes to it; unless a listener
    /// cancels it the key's default action runs, and `keyup` then goes to
    /// whichever element holds focus at release.
    pub fn press_key(&mut self, selector: &str, key: &str) -> Result<()> {
        stacker::grow(ACTION_STACK_SIZE, || {
            let target = self.select_one(selector)?;
            self.press_key_node(target, key)
        })
    }

    pub fn press_enter(&mut self, selector: &str) -> Result<()> {
        self.press_key(selector, ENTER_KEY)
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        stacker::grow(ACTION_STACK_SIZE, || {
            let target = self.select_one(selector)?;
            if is_effectively_disabled(&self.dom, target) || self.dom.readonly(target) {
                return Ok(());
            }

            let tag = self
                .dom
                .tag_name(target)
                .ok_or_else(|| Error::TypeMismatch {
                    selector: selector.to_string(),
                    expected: "input or textarea".into(),
                    actual: "non-element".into(),
                })?
                .to_ascii_lowercase();

            if tag != "input" && tag != "textarea" {
                return Err(Error::TypeMismatch {
                    selector: selector.to_string(),
                    expected: "input or textarea".into(),
                    actual: tag,
                });
            }

            self.dom.set_value(target, text);
            self.dispatch_event(EventState::new("input", target))?;
            Ok(())
        })
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        stacker::grow(ACTION_STACK_SIZE, || {
            let target = self.select_one(selector)?;
            if is_effectively_disabled(&self.dom, target) {
                return Ok(());
            }
            if !is_checkbox_input(&self.dom, target) && !is_radio_input(&self.dom, target) {
                return Err(Error::TypeMismatch {
                    selector: selector.to_string(),
                    expected: "input[type=checkbox|radio]".into(),
                    actual: self.describe_control(target),
                });
            }

            if self.dom.checked(target) != checked {
                if checked && is_radio_input(&self.dom, target) {
                    self.uncheck_other_radios_in_group(target);
                }
                self.dom.set_checked(target, checked);
                self.dispatch_event(EventState::new("input", target))?;
                self.dispatch_event(EventState::new("change", target))?;
            }
            Ok(())
        })
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        stacker::grow(ACTION_STACK_SIZE, || {
            let target = self.select_one(selector)?;
            self.click_node(target)
        })
    }

    /// Requests submission of the form at `selector`, or of the form that
    /// owns the element at `selector`.
    pub fn submit(&mut self, selector: &str) -> Result<()> {
        stacker::grow(ACTION_STACK_SIZE, || {
            let target = self.select_one(selector)?;
            match self.resolve_form_for_submit(target) {
                Some(form) => self.request_form_submit(form, None),
                None => Ok(()),
            }
        })
    }

    /// Sets or clears the `disabled` attribute of the element at `selector`.
    ///
    /// Field sequences built at load time are left as they are.
    pub fn set_disabled(&mut self, selector: &str, disabled: bool) -> Result<()> {
        stacker::grow(ACTION_STACK_SIZE, || {
            let target = self.select_one(selector)?;
            self.dom.set_disabled(target, disabled);
            if disabled && self.active_element == Some(target) {
                self.blur_node(target)?;
            }
            Ok(())
        })
    }

    pub(crate) fn press_key_node(&mut self, target: NodeId, key: &str) -> Result<()> {
        if is_effectively_disabled(&self.dom, target) {
            return Ok(());
        }

        self.focus_node(target)?;
        let keydown = self.dispatch_event(EventState::keyboard("keydown", target, key))?;
        if !keydown.default_prevented {
            self.run_key_default(target, key)?;
        }
        let release_target = self.active_element.unwrap_or(target);
        self.dispatch_event(EventState::keyboard("keyup", release_target, key))?;
        Ok(())
    }

    fn run_key_default(&mut self, target: NodeId, key: &str) -> Result<()> {
        if key == ENTER_KEY {
            if is_button_like(&self.dom, target) {
                return self.click_node(target);
            }
            if self.dom.is_tag(target, "textarea") {
                return self.insert_text(target, "\n");
            }
            if triggers_implicit_submission(&self.dom, target) {
                if let Some(form) = self.form_owner(target) {
                    return self.implicit_submit(form);
                }
            }
            return Ok(());
        }

        if key.chars().count() == 1 && is_text_entry(&self.dom, target) {
            return self.insert_text(target, key);
        }
        Ok(())
    }

    fn insert_text(&mut self, target: NodeId, text: &str) -> Result<()> {
        if self.dom.readonly(target) {
            return Ok(());
        }
        let mut value = self.dom.value(target);
        value.push_str(text);
        self.dom.set_value(target, &value);
        self.dispatch_event(EventState::new("input", target))?;
        Ok(())
    }

    // Enter in a field clicks the form's default button, or submits directly
    // when the form has no submit button and at most one blocking field.
    fn implicit_submit(&mut self, form: NodeId) -> Result<()> {
        let controls = self.form_controls(form);

        if let Some(default_button) = controls
            .iter()
            .copied()
            .find(|control| is_submit_control(&self.dom, *control))
        {
            if !is_effectively_disabled(&self.dom, default_button) {
                self.click_node(default_button)?;
            }
            return Ok(());
        }

        let blocking = controls
            .iter()
            .filter(|control| blocks_implicit_submission(&self.dom, **control))
            .count();
        if blocking <= 1 {
            self.request_form_submit(form, None)?;
        }
        Ok(())
    }

    pub(crate) fn click_node(&mut self, target: NodeId) -> Result<()> {
        if is_effectively_disabled(&self.dom, target) {
            return Ok(());
        }

        let click = self.dispatch_event(EventState::new("click", target))?;
        if click.default_prevented {
            return Ok(());
        }

        if is_checkbox_input(&self.dom, target) {
            let current = self.dom.checked(target);
            self.dom.set_checked(target, !current);
            self.dispatch_event(EventState::new("input", target))?;
            self.dispatch_event(EventState::new("change", target))?;
        }

        if is_radio_input(&self.dom, target) && !self.dom.checked(target) {
            self.uncheck_other_radios_in_group(target);
            self.dom.set_checked(target, true);
            self.dispatch_event(EventState::new("input", target))?;
            self.dispatch_event(EventState::new("change", target))?;
        }

        if is_submit_control(&self.dom, target) {
            if let Some(form) = self.form_owner(target) {
                self.request_form_submit(form, Some(target))?;
            }
        }

        Ok(())
    }

    fn request_form_submit(&mut self, form: NodeId, submitter: Option<NodeId>) -> Result<()> {
        let outcome = self.dispatch_event(EventState::new("submit", form))?;
        if outcome.default_prevented {
            let line = format!("[submit] cancelled form={}", self.trace_node_label(form));
            self.trace_line(line);
            return Ok(());
        }

        let submission = Submission {
            form: self.trace_node_label(form),
            submitter: submitter.map(|node| self.trace_node_label(node)),
            entries: self.form_data_entries(form, submitter),
        };
        self.trace_line(format!(
            "[submit] form={} submitter={} entries={}",
            submission.form,
            submission.submitter.as_deref().unwrap_or("none"),
            submission.entries.len()
        ));
        self.submissions.push(submission);
        Ok(())
    }

    fn form_data_entries(&self, form: NodeId, submitter: Option<NodeId>) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for control in self.form_controls(form) {
            if !self.is_successful_control(control, submitter) {
                continue;
            }
            let name = self.dom.attr(control, "name").unwrap_or_default();
            let mut value = self.dom.value(control);
            if value.is_empty()
                && (is_checkbox_input(&self.dom, control) || is_radio_input(&self.dom, control))
            {
                value = "on".into();
            }
            out.push((name, value));
        }
        out
    }

    fn is_successful_control(&self, control: NodeId, submitter: Option<NodeId>) -> bool {
        if is_effectively_disabled(&self.dom, control) {
            return false;
        }
        if self.dom.attr(control, "name").unwrap_or_default().is_empty() {
            return false;
        }
        if is_button_like(&self.dom, control) {
            return submitter == Some(control);
        }
        if let Some(kind) = input_type(&self.dom, control) {
            if kind == "file" {
                return false;
            }
            if kind == "checkbox" || kind == "radio" {
                return self.dom.checked(control);
            }
        }
        true
    }

    fn form_controls(&self, form: NodeId) -> Vec<NodeId> {
        let mut descendants = Vec::new();
        self.dom.collect_elements_descendants_dfs(form, &mut descendants);
        descendants
            .into_iter()
            .filter(|node| is_form_control(&self.dom, *node))
            .collect()
    }

    fn uncheck_other_radios_in_group(&mut self, target: NodeId) {
        let target_name = self.dom.attr(target, "name").unwrap_or_default();
        if target_name.is_empty() {
            return;
        }
        let target_form = self.form_owner(target);

        for node in self.dom.all_element_nodes() {
            if node == target || !is_radio_input(&self.dom, node) {
                continue;
            }
            if self.dom.attr(node, "name").unwrap_or_default() != target_name {
                continue;
            }
            if self.form_owner(node) != target_form {
                continue;
            }
            self.dom.set_checked(node, false);
        }
    }

    fn form_owner(&self, node: NodeId) -> Option<NodeId> {
        self.dom.find_ancestor_by_tag(node, "form")
    }

    fn resolve_form_for_submit(&self, target: NodeId) -> Option<NodeId> {
        if self.dom.is_tag(target, "form") {
            return Some(target);
        }
        self.form_owner(target)
    }

    fn describe_control(&self, node: NodeId) -> String {
        match input_type(&self.dom, node) {
            Some(kind) => format!("input[type={kind}]"),
            None => self
                .dom
                .tag_name(node)
                .unwrap_or("non-element")
                .to_ascii_lowercase(),
        }
    }
}
