//! A small namespace-aware element tree on top of `quick_xml::NsReader`.
//!
//! Paths are `/`-separated steps. A step is either `prefix:Name` (the prefix is
//! looked up in [`crate::utils::namespaces`]), a bare `Name` which matches the
//! local name in any namespace, or `*`.

use crate::utils::error::{Result, WcsError};
use crate::utils::namespaces;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<Attribute>,
    text: Option<String>,
    children: Vec<Element>,
}

enum Step<'a> {
    Any,
    Local(&'a str),
    Qualified(Option<&'static str>, &'a str),
}

impl<'a> Step<'a> {
    fn parse(raw: &'a str) -> Self {
        if raw == "*" {
            return Step::Any;
        }
        match raw.split_once(':') {
            Some((prefix, local)) => Step::Qualified(namespaces::lookup(prefix), local),
            None => Step::Local(raw),
        }
    }

    fn matches(&self, element: &Element) -> bool {
        match self {
            Step::Any => true,
            Step::Local(local) => element.name == *local,
            // 未知前綴不匹配任何元素
            Step::Qualified(None, _) => false,
            Step::Qualified(Some(uri), local) => {
                element.name == *local && element.namespace.as_deref() == Some(*uri)
            }
        }
    }
}

fn namespace_uri(resolved: ResolveResult) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

impl Element {
    /// Parses a complete document and returns its root element.
    pub fn parse(xml: &str) -> Result<Element> {
        let mut reader = NsReader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (namespace, event) = {
                let (resolved, event) = reader.read_resolved_event()?;
                (namespace_uri(resolved), event)
            };

            match event {
                Event::Start(start) => {
                    stack.push(Self::open(&reader, namespace, &start)?);
                }
                Event::Empty(start) => {
                    let element = Self::open(&reader, namespace, &start)?;
                    Self::attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        Self::attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(WcsError::InvalidDocument {
                reason: format!("{} unclosed element(s) at end of input", stack.len()),
            });
        }

        root.ok_or_else(|| WcsError::InvalidDocument {
            reason: "document has no root element".to_string(),
        })
    }

    fn open(
        reader: &NsReader<&[u8]>,
        namespace: Option<String>,
        start: &BytesStart<'_>,
    ) -> Result<Element> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let (resolved, local) = reader.resolve_attribute(attr.key);
            attributes.push(Attribute {
                namespace: namespace_uri(resolved),
                name: String::from_utf8_lossy(local.as_ref()).into_owned(),
                value: attr.unescape_value()?.into_owned(),
            });
        }

        Ok(Element {
            namespace,
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            text: None,
            children: Vec::new(),
        })
    }

    fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => {
                if root.is_none() {
                    *root = Some(element);
                }
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Clark notation: `{uri}local`, or just `local` when unqualified.
    pub fn tag(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{}}}{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Trimmed text content; `None` when the element carries no text.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim)
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Unqualified attribute lookup.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn attribute_ns(&self, uri: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.as_deref() == Some(uri) && a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn findall(&self, path: &str) -> Vec<&Element> {
        let mut current: Vec<&Element> = vec![self];
        for raw in path.split('/').filter(|s| !s.is_empty()) {
            let step = Step::parse(raw);
            current = current
                .into_iter()
                .flat_map(|e| e.children.iter())
                .filter(|child| step.matches(child))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    pub fn find(&self, path: &str) -> Option<&Element> {
        self.findall(path).into_iter().next()
    }

    /// Text of the first match, `None` when either the node or its text is missing.
    pub fn find_text(&self, path: &str) -> Option<String> {
        self.find(path).and_then(|e| e.text()).map(str::to_string)
    }

    /// Texts of every match that carries text.
    pub fn findall_text(&self, path: &str) -> Vec<String> {
        self.findall(path)
            .into_iter()
            .filter_map(|e| e.text())
            .map(str::to_string)
            .collect()
    }

    /// Pre-order walk, the element itself first.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(element) = pending.pop() {
            out.push(element);
            pending.extend(element.children.iter().rev());
        }
        out
    }
}
