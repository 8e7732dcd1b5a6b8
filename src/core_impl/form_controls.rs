use super::*;

/// The `type` property of an `<input>`: the lowercased attribute when it
/// names a known input type, `text` otherwise.
pub(crate) fn input_type(dom: &Dom, node_id: NodeId) -> Option<String> {
    let element = dom.element(node_id)?;
    if !element.is_tag("input") {
        return None;
    }
    let raw = element.attr("type").unwrap_or_default().to_ascii_lowercase();
    Some(match raw.as_str() {
        "button" | "checkbox" | "color" | "date" | "datetime-local" | "email" | "file"
        | "hidden" | "image" | "month" | "number" | "password" | "radio" | "range"
        | "reset" | "search" | "submit" | "tel" | "text" | "time" | "url" | "week" => raw,
        _ => "text".into(),
    })
}

/// Lowercased `type` attribute as the element would report it: the input
/// type for inputs, `submit` by default for buttons, the tag name otherwise.
pub(crate) fn control_kind(dom: &Dom, node_id: NodeId) -> String {
    let Some(element) = dom.element(node_id) else {
        return String::new();
    };
    if element.is_tag("input") {
        return input_type(dom, node_id).unwrap_or_else(|| "text".into());
    }
    if element.is_tag("button") {
        return match element.attr("type").map(str::to_ascii_lowercase) {
            Some(kind) if kind == "button" || kind == "reset" => kind,
            _ => "submit".into(),
        };
    }
    if element.is_tag("select") {
        return if element.has_attr("multiple") {
            "select-multiple".into()
        } else {
            "select-one".into()
        };
    }
    element.tag_name.to_ascii_lowercase()
}

pub(crate) fn is_form_control(dom: &Dom, node_id: NodeId) -> bool {
    let Some(element) = dom.element(node_id) else {
        return false;
    };

    element.is_tag("input")
        || element.is_tag("select")
        || element.is_tag("textarea")
        || element.is_tag("button")
}

/// `input`, `select` and `textarea`: the elements scanned for navigation.
pub(crate) fn is_interactive_field(dom: &Dom, node_id: NodeId) -> bool {
    let Some(element) = dom.element(node_id) else {
        return false;
    };
    element.is_tag("input") || element.is_tag("select") || element.is_tag("textarea")
}

pub(crate) fn is_checkbox_input(dom: &Dom, node_id: NodeId) -> bool {
    input_type(dom, node_id).is_some_and(|kind| kind == "checkbox")
}

pub(crate) fn is_radio_input(dom: &Dom, node_id: NodeId) -> bool {
    input_type(dom, node_id).is_some_and(|kind| kind == "radio")
}

pub(crate) fn is_submit_control(dom: &Dom, node_id: NodeId) -> bool {
    let Some(element) = dom.element(node_id) else {
        return false;
    };

    if element.is_tag("button") {
        return control_kind(dom, node_id) == "submit";
    }

    matches!(
        input_type(dom, node_id).as_deref(),
        Some("submit") | Some("image")
    )
}

/// Elements whose Enter key default is activation rather than submission.
pub(crate) fn is_button_like(dom: &Dom, node_id: NodeId) -> bool {
    if dom.is_tag(node_id, "button") {
        return true;
    }
    matches!(
        input_type(dom, node_id).as_deref(),
        Some("submit") | Some("button") | Some("reset") | Some("image")
    )
}

/// Inputs that accept typed characters.
pub(crate) fn is_text_entry(dom: &Dom, node_id: NodeId) -> bool {
    if dom.is_tag(node_id, "textarea") {
        return true;
    }
    input_type(dom, node_id).is_some_and(|kind| {
        matches!(
            kind.as_str(),
            "text" | "search" | "url" | "tel" | "email" | "password" | "number"
        )
    })
}

/// Fields that prevent implicit submission when a form has more than one of
/// them and no submit button.
pub(crate) fn blocks_implicit_submission(dom: &Dom, node_id: NodeId) -> bool {
    input_type(dom, node_id).is_some_and(|kind| {
        matches!(
            kind.as_str(),
            "text"
                | "search"
                | "url"
                | "tel"
                | "email"
                | "password"
                | "date"
                | "month"
                | "week"
                | "time"
                | "datetime-local"
                | "number"
        )
    })
}

/// Inputs on which Enter triggers implicit submission of the owning form.
pub(crate) fn triggers_implicit_submission(dom: &Dom, node_id: NodeId) -> bool {
    input_type(dom, node_id).is_some_and(|kind| {
        !matches!(
            kind.as_str(),
            "submit" | "button" | "reset" | "image" | "hidden" | "file"
        )
    })
}

pub(crate) fn is_effectively_disabled(dom: &Dom, node_id: NodeId) -> bool {
    if dom.disabled(node_id) {
        return true;
    }
    if !is_form_control(dom, node_id) {
        return false;
    }

    let mut cursor = dom.parent(node_id);
    while let Some(parent) = cursor {
        if dom.is_tag(parent, "fieldset") && dom.disabled(parent) {
            return true;
        }
        cursor = dom.parent(parent);
    }

    false
}
