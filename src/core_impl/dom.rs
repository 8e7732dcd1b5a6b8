use super::*;

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    // Source order; the first occurrence of a duplicated name wins.
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) disabled: bool,
    pub(crate) readonly: bool,
}

impl Element {
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(key, _)| key == name)
    }

    pub(crate) fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }
}

/// An arena-backed document tree.
///
/// Nodes are never freed while the document is alive, so a [`NodeId`] handed
/// out by a query stays valid for the lifetime of the `Dom`.
#[derive(Debug, Clone)]
pub struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    /// Parses an HTML document.
    pub fn parse(html: &str) -> Result<Self> {
        parse_html(html)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all(selector)?;
        Ok(all.into_iter().next())
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        if groups.len() == 1 && groups[0].len() == 1 {
            if let Some(id) = groups[0][0].step.id_only() {
                return Ok(self.by_id(id).into_iter().collect());
            }
        }

        Ok(self.match_groups(self.all_element_nodes(), &groups))
    }

    /// Descendants of `scope` (excluding `scope` itself) matching `selector`.
    pub fn query_selector_all_from(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;
        let mut ids = Vec::new();
        self.collect_elements_descendants_dfs(scope, &mut ids);
        Ok(self.match_groups(ids, &groups))
    }

    pub fn matches(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        if self.element(node_id).is_none() {
            return Ok(false);
        }
        let groups = parse_selector_groups(selector)?;
        Ok(groups
            .iter()
            .any(|steps| self.matches_selector_chain(node_id, steps)))
    }

    pub fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attr(&name.to_ascii_lowercase()))
            .map(ToOwned::to_owned)
    }

    pub fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.disabled).unwrap_or(false)
    }

    pub fn dump_node(&self, node_id: NodeId) -> String {
        enum Step {
            Open(NodeId),
            Close(NodeId),
        }

        let mut out = String::new();
        let mut stack = vec![Step::Open(node_id)];
        while let Some(step) = stack.pop() {
            let node_id = match step {
                Step::Open(node_id) => node_id,
                Step::Close(node_id) => {
                    if let Some(element) = self.element(node_id) {
                        out.push_str("</");
                        out.push_str(&element.tag_name);
                        out.push('>');
                    }
                    continue;
                }
            };
            let node = &self.nodes[node_id.0];
            match &node.node_type {
                NodeType::Document => {}
                NodeType::Text(text) => {
                    out.push_str(text);
                    continue;
                }
                NodeType::Element(element) => {
                    out.push('<');
                    out.push_str(&element.tag_name);
                    for (k, v) in &element.attrs {
                        out.push(' ');
                        out.push_str(k);
                        out.push_str("=\"");
                        out.push_str(v);
                        out.push('"');
                    }
                    out.push('>');
                    if is_void_tag(&element.tag_name) {
                        continue;
                    }
                    stack.push(Step::Close(node_id));
                }
            }
            stack.extend(node.children.iter().rev().map(|child| Step::Open(*child)));
        }
        out
    }

    pub(crate) fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        let mut element = Element {
            tag_name,
            attrs,
            value: String::new(),
            checked: false,
            disabled: false,
            readonly: false,
        };
        element.value = element.attr("value").unwrap_or_default().to_string();
        element.checked = element.has_attr("checked");
        element.disabled = element.has_attr("disabled");
        element.readonly = element.has_attr("readonly");
        let id_attr = element.attr("id").map(ToOwned::to_owned);

        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = id_attr {
            // getElementById returns the first match in tree order.
            if !id_attr.is_empty() {
                self.id_index.entry(id_attr).or_insert(id);
            }
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn is_tag(&self, node_id: NodeId, tag: &str) -> bool {
        self.element(node_id).is_some_and(|e| e.is_tag(tag))
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0).and_then(|node| node.parent)
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node_id];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current.0];
            if let NodeType::Text(text) = &node.node_type {
                out.push_str(text);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    pub(crate) fn value(&self, node_id: NodeId) -> String {
        self.element(node_id)
            .map(|e| e.value.clone())
            .unwrap_or_default()
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) {
        if let Some(element) = self.element_mut(node_id) {
            element.value = value.to_string();
        }
    }

    pub(crate) fn checked(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.checked).unwrap_or(false)
    }

    pub(crate) fn set_checked(&mut self, node_id: NodeId, checked: bool) {
        if let Some(element) = self.element_mut(node_id) {
            element.checked = checked;
        }
    }

    pub(crate) fn readonly(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.readonly).unwrap_or(false)
    }

    /// Toggles the `disabled` attribute and the matching element state.
    pub(crate) fn set_disabled(&mut self, node_id: NodeId, disabled: bool) {
        let Some(element) = self.element_mut(node_id) else {
            return;
        };
        element.disabled = disabled;
        let present = element.has_attr("disabled");
        if disabled && !present {
            element.attrs.push(("disabled".into(), String::new()));
        } else if !disabled && present {
            element.attrs.retain(|(key, _)| key != "disabled");
        }
    }

    pub(crate) fn initialize_form_control_values(&mut self) {
        for node in self.all_element_nodes() {
            if self.is_tag(node, "textarea") {
                // A leading newline right after <textarea> is not part of the value.
                let text = self.text_content(node);
                let text = text
                    .strip_prefix("\r\n")
                    .or_else(|| text.strip_prefix('\n'))
                    .unwrap_or(&text)
                    .to_string();
                if let Some(element) = self.element_mut(node) {
                    element.value = text;
                }
                continue;
            }

            if self.is_tag(node, "select") {
                let value = self.select_value_from_options(node);
                if let Some(element) = self.element_mut(node) {
                    element.value = value;
                }
            }
        }
    }

    fn select_value_from_options(&self, select_node: NodeId) -> String {
        let mut options = Vec::new();
        self.collect_elements_descendants_dfs(select_node, &mut options);
        options.retain(|node| self.is_tag(*node, "option"));

        let selected = options
            .iter()
            .copied()
            .find(|node| self.element(*node).is_some_and(|e| e.has_attr("selected")))
            .or_else(|| options.first().copied());

        selected
            .map(|option| self.option_effective_value(option))
            .unwrap_or_default()
    }

    fn option_effective_value(&self, option_node: NodeId) -> String {
        self.attr(option_node, "value")
            .unwrap_or_else(|| self.text_content(option_node).trim().to_string())
    }

    /// Pre-order walk without recursion, so arbitrarily deep documents
    /// cannot exhaust the caller's stack.
    pub(crate) fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        let mut stack = vec![node_id];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current.0];
            if matches!(node.node_type, NodeType::Element(_)) {
                out.push(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }
    }

    pub(crate) fn collect_elements_descendants_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    pub(crate) fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    pub(crate) fn find_ancestor_by_tag(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if self.is_tag(current, tag) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    pub(crate) fn element_children(&self, node_id: NodeId) -> Vec<NodeId> {
        self.nodes[node_id.0]
            .children
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    pub(crate) fn is_first_element_child(&self, node_id: NodeId) -> bool {
        self.parent(node_id)
            .and_then(|parent| self.element_children(parent).first().copied())
            == Some(node_id)
    }

    pub(crate) fn is_last_element_child(&self, node_id: NodeId) -> bool {
        self.parent(node_id)
            .and_then(|parent| self.element_children(parent).last().copied())
            == Some(node_id)
    }

    fn match_groups(&self, candidates: Vec<NodeId>, groups: &[Vec<SelectorPart>]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for candidate in candidates {
            if groups
                .iter()
                .any(|steps| self.matches_selector_chain(candidate, steps))
                && seen.insert(candidate)
            {
                matched.push(candidate);
            }
        }
        matched
    }
}
