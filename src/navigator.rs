//! Enter-key navigation between the fields of a form.
//!
//! [`FormNavigator::initialize`] scans every `<form>` once, right after the
//! document has been parsed, and records for each form the ordered list of
//! fields that Enter moves through. The list is a snapshot: fields added,
//! removed, enabled or disabled afterwards do not change it.

use super::*;

/// Key value that triggers navigation.
pub const ENTER_KEY: &str = "Enter";

/// Identity of a form: its position among all forms in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormKey(pub(crate) usize);

impl FormKey {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The ordered, eligible fields of one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSequence {
    key: FormKey,
    form: NodeId,
    fields: Vec<NodeId>,
}

impl FieldSequence {
    pub fn key(&self) -> FormKey {
        self.key
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn fields(&self) -> &[NodeId] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, field: NodeId) -> Option<usize> {
        self.fields.iter().position(|candidate| *candidate == field)
    }

    /// The field after `index`, or `None` when `index` is the last one.
    pub fn next_after(&self, index: usize) -> Option<NodeId> {
        self.fields.get(index.checked_add(1)?).copied()
    }
}

/// What an Enter-aware listener does with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    /// Not Enter; the event continues untouched.
    Ignored,
    /// Default action suppressed and focus moves to the given field.
    Advance(NodeId),
    /// Default action suppressed; there is no next field.
    Suppressed,
}

impl EnterOutcome {
    pub fn prevents_default(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormNavigator {
    sequences: Vec<FieldSequence>,
}

impl FormNavigator {
    /// Builds the field sequence of every form in `dom`.
    pub fn initialize(dom: &Dom) -> Self {
        let sequences = dom
            .all_element_nodes()
            .into_iter()
            .filter(|node| dom.is_tag(*node, "form"))
            .enumerate()
            .map(|(index, form)| FieldSequence {
                key: FormKey(index),
                form,
                fields: Self::collect_fields(dom, form),
            })
            .collect();
        Self { sequences }
    }

    /// Eligible fields are `input`, `select` and `textarea` elements whose
    /// type is neither `submit` nor `button` and that are not disabled
    /// themselves.
    pub fn is_eligible(dom: &Dom, node: NodeId) -> bool {
        if !is_interactive_field(dom, node) {
            return false;
        }
        let kind = control_kind(dom, node);
        kind != "submit" && kind != "button" && !dom.disabled(node)
    }

    fn collect_fields(dom: &Dom, form: NodeId) -> Vec<NodeId> {
        let mut descendants = Vec::new();
        dom.collect_elements_descendants_dfs(form, &mut descendants);
        descendants
            .into_iter()
            .filter(|node| Self::is_eligible(dom, *node))
            .collect()
    }

    pub fn forms(&self) -> &[FieldSequence] {
        &self.sequences
    }

    pub fn sequence(&self, key: FormKey) -> Option<&FieldSequence> {
        self.sequences.get(key.0)
    }

    pub fn sequence_for_form(&self, form: NodeId) -> Option<&FieldSequence> {
        self.sequences.iter().find(|sequence| sequence.form == form)
    }

    /// Form and index of `field`, if it was eligible at initialization.
    pub fn locate(&self, field: NodeId) -> Option<(FormKey, usize)> {
        self.sequences.iter().find_map(|sequence| {
            sequence
                .position(field)
                .map(|index| (sequence.key, index))
        })
    }

    pub fn next_field(&self, key: FormKey, index: usize) -> Option<NodeId> {
        self.sequence(key)?.next_after(index)
    }

    /// Decision for a key-down on the field at `index` of form `key`.
    pub fn handle_keydown(&self, key: FormKey, index: usize, pressed: &str) -> EnterOutcome {
        if pressed != ENTER_KEY {
            return EnterOutcome::Ignored;
        }
        match self.next_field(key, index) {
            Some(next) => EnterOutcome::Advance(next),
            None => EnterOutcome::Suppressed,
        }
    }

    /// Every `(field, form, index)` triple that gets a key-down listener.
    pub(crate) fn bindings(&self) -> impl Iterator<Item = (NodeId, FormKey, usize)> + '_ {
        self.sequences.iter().flat_map(|sequence| {
            sequence
                .fields
                .iter()
                .enumerate()
                .map(move |(index, field)| (*field, sequence.key, index))
        })
    }
}
