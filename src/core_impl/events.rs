use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ListenerHandler {
    /// Enter-key navigation for the field at `index` of form `form`.
    AdvanceOnEnter { form: FormKey, index: usize },
    /// Appends a line to the harness event log.
    Record,
    PreventDefault,
}

#[derive(Debug, Clone)]
pub(crate) struct Listener {
    pub(crate) capture: bool,
    pub(crate) handler: ListenerHandler,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    /// Registers `listener` unless an identical one is already present, the
    /// same way `addEventListener` ignores duplicate registrations.
    pub(crate) fn add(&mut self, node_id: NodeId, event: &str, listener: Listener) -> bool {
        let listeners = self
            .map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default();
        if listeners
            .iter()
            .any(|existing| existing.capture == listener.capture && existing.handler == listener.handler)
        {
            return false;
        }
        listeners.push(listener);
        true
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str, capture: bool) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.capture == capture)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn count(&self, node_id: NodeId, event: &str) -> usize {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) key: Option<String>,
    pub(crate) default_prevented: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            key: None,
            default_prevented: false,
        }
    }

    pub(crate) fn keyboard(event_type: &str, target: NodeId, key: &str) -> Self {
        let mut event = Self::new(event_type, target);
        event.key = Some(key.to_string());
        event
    }
}
