use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorPseudoClass {
    FirstChild,
    LastChild,
    Checked,
    Disabled,
    Enabled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<SelectorAttrCondition>,
    pseudo_classes: Vec<SelectorPseudoClass>,
}

impl SelectorStep {
    pub(crate) fn id_only(&self) -> Option<&str> {
        if self.tag.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorCombinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // Relation to the part on the left; `None` for the first part.
    pub(crate) combinator: Option<SelectorCombinator>,
}

pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    let unsupported = || Error::UnsupportedSelector(selector.to_string());
    let mut groups = Vec::new();
    for tokens in tokenize_selector(selector).ok_or_else(unsupported)? {
        groups.push(parse_selector_chain(&tokens).ok_or_else(unsupported)?);
    }
    Ok(groups)
}

/// Splits a selector list into one token list per group. Tokens are compound
/// selectors or `>`.
fn tokenize_selector(selector: &str) -> Option<Vec<Vec<String>>> {
    let mut groups = vec![Vec::new()];
    let mut current = String::new();
    let mut in_brackets = false;
    let mut quote = None;

    for ch in selector.chars() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '\'' | '"' if in_brackets => {
                quote = Some(ch);
                current.push(ch);
            }
            ']' if in_brackets => {
                in_brackets = false;
                current.push(ch);
            }
            _ if in_brackets => current.push(ch),
            '[' => {
                in_brackets = true;
                current.push(ch);
            }
            ']' | '+' | '~' => return None,
            ',' => {
                push_compound(&mut current, groups.last_mut()?);
                groups.push(Vec::new());
            }
            '>' => {
                let tokens = groups.last_mut()?;
                push_compound(&mut current, tokens);
                tokens.push(">".into());
            }
            ch if ch.is_ascii_whitespace() => push_compound(&mut current, groups.last_mut()?),
            _ => current.push(ch),
        }
    }

    if in_brackets || quote.is_some() {
        return None;
    }
    push_compound(&mut current, groups.last_mut()?);
    Some(groups)
}

fn push_compound(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

fn parse_selector_chain(tokens: &[String]) -> Option<Vec<SelectorPart>> {
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut child = false;

    for token in tokens {
        if token == ">" {
            if child || parts.is_empty() {
                return None;
            }
            child = true;
            continue;
        }
        let combinator = match (parts.is_empty(), child) {
            (true, _) => None,
            (false, true) => Some(SelectorCombinator::Child),
            (false, false) => Some(SelectorCombinator::Descendant),
        };
        child = false;
        parts.push(SelectorPart {
            step: parse_selector_step(token)?,
            combinator,
        });
    }

    (!parts.is_empty() && !child).then_some(parts)
}

/// A compound selector: an optional type or `*`, then any mix of `#id`,
/// `.class`, `[attr]` and `:pseudo`.
fn parse_selector_step(part: &str) -> Option<SelectorStep> {
    let bytes = part.as_bytes();
    let mut step = SelectorStep::default();
    let mut i = 0usize;

    if bytes.first() == Some(&b'*') {
        i = 1;
    } else if let Some((tag, next)) = parse_selector_ident(part, 0) {
        step.tag = Some(tag.to_ascii_lowercase());
        i = next;
    }

    while i < bytes.len() {
        i = match bytes[i] {
            b'#' => {
                let (id, next) = parse_selector_ident(part, i + 1)?;
                if step.id.replace(id).is_some() {
                    return None;
                }
                next
            }
            b'.' => {
                let (class_name, next) = parse_selector_ident(part, i + 1)?;
                step.classes.push(class_name);
                next
            }
            b'[' => {
                let (attr, next) = parse_selector_attr_condition(part, i)?;
                step.attrs.push(attr);
                next
            }
            b':' => {
                let (pseudo, next) = parse_selector_pseudo(part, i + 1)?;
                step.pseudo_classes.push(pseudo);
                next
            }
            _ => return None,
        };
    }

    Some(step)
}

fn parse_selector_pseudo(part: &str, start: usize) -> Option<(SelectorPseudoClass, usize)> {
    let (name, next) = parse_selector_ident(part, start)?;
    let pseudo = match name.as_str() {
        "first-child" => SelectorPseudoClass::FirstChild,
        "last-child" => SelectorPseudoClass::LastChild,
        "checked" => SelectorPseudoClass::Checked,
        "disabled" => SelectorPseudoClass::Disabled,
        "enabled" => SelectorPseudoClass::Enabled,
        _ => return None,
    };
    Some((pseudo, next))
}

fn parse_selector_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let len = src
        .get(start..)?
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
        .count();
    if len == 0 {
        return None;
    }
    Some((src[start..start + len].to_string(), start + len))
}

/// `[key]` or `[key=value]`, with `value` optionally quoted.
fn parse_selector_attr_condition(
    src: &str,
    open_bracket: usize,
) -> Option<(SelectorAttrCondition, usize)> {
    let mut quote = None;
    let close = src
        .bytes()
        .enumerate()
        .skip(open_bracket + 1)
        .find_map(|(i, b)| {
            match quote {
                Some(open) if b == open => quote = None,
                Some(_) => {}
                None if b == b'\'' || b == b'"' => quote = Some(b),
                None if b == b']' => return Some(i),
                None => {}
            }
            None
        })?;

    let body = src.get(open_bracket + 1..close)?.trim();
    let (key, value) = match body.split_once('=') {
        Some((key, value)) => (key.trim(), Some(value.trim())),
        None => (body, None),
    };
    if key.is_empty() {
        return None;
    }
    let key = key.to_ascii_lowercase();
    let cond = match value {
        Some(value) => {
            let unquoted = ['"', '\'']
                .into_iter()
                .find_map(|q| value.strip_prefix(q)?.strip_suffix(q))
                .unwrap_or(value);
            SelectorAttrCondition::Eq {
                key,
                value: unquoted.to_string(),
            }
        }
        None => SelectorAttrCondition::Exists { key },
    };
    Some((cond, close + 1))
}

impl Dom {
    pub(crate) fn matches_selector_chain(&self, node_id: NodeId, steps: &[SelectorPart]) -> bool {
        let Some(last) = steps.last() else {
            return false;
        };
        if !self.matches_step(node_id, &last.step) {
            return false;
        }

        // Right to left; each part is matched against the nearest qualifying
        // ancestor of the element matched by the part after it.
        let mut current = node_id;
        for pair in steps.windows(2).rev() {
            let (left, right) = (&pair[0].step, &pair[1]);
            let mut cursor = self.parent(current);
            current = loop {
                let Some(parent) = cursor else {
                    return false;
                };
                if self.matches_step(parent, left) {
                    break parent;
                }
                if right.combinator == Some(SelectorCombinator::Child) {
                    return false;
                }
                cursor = self.parent(parent);
            };
        }

        true
    }

    fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.is_tag(tag) {
                return false;
            }
        }

        if let Some(id) = &step.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }

        for class_name in &step.classes {
            let has_class = element
                .attr("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name));
            if !has_class {
                return false;
            }
        }

        for cond in &step.attrs {
            let matched = match cond {
                SelectorAttrCondition::Exists { key } => element.has_attr(key),
                SelectorAttrCondition::Eq { key, value } => element.attr(key) == Some(value.as_str()),
            };
            if !matched {
                return false;
            }
        }

        step.pseudo_classes.iter().all(|pseudo| match pseudo {
            SelectorPseudoClass::FirstChild => self.is_first_element_child(node_id),
            SelectorPseudoClass::LastChild => self.is_last_element_child(node_id),
            SelectorPseudoClass::Checked => {
                (is_checkbox_input(self, node_id) || is_radio_input(self, node_id))
                    && element.checked
            }
            SelectorPseudoClass::Disabled => {
                is_form_control(self, node_id) && is_effectively_disabled(self, node_id)
            }
            SelectorPseudoClass::Enabled => {
                is_form_control(self, node_id) && !is_effectively_disabled(self, node_id)
            }
        })
    }
}
