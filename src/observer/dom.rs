//! Minimal element tree the observer agent works against.
//!
//! This is the shape of a document node as the selector engine and click
//! capture see it: tag, id, classes, text, and a parent chain. Hosts embed
//! the agent by mirroring their real document into these nodes.

use std::sync::{Arc, Mutex, Weak};

struct ElementInner {
    tag_name: String,
    id: Option<String>,
    classes: Vec<String>,
    text: String,
    value: Option<String>,
    placeholder: Option<String>,
    parent: Mutex<Weak<ElementInner>>,
    children: Mutex<Vec<Element>>,
}

/// Handle to one node. Clones share the node; identity is pointer identity,
/// like DOM node references.
#[derive(Clone)]
pub struct Element {
    inner: Arc<ElementInner>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ElementInner {
                tag_name: tag_name.into(),
                id: None,
                classes: Vec::new(),
                text: String::new(),
                value: None,
                placeholder: None,
                parent: Mutex::new(Weak::new()),
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.rebuild(|inner| inner.id = Some(id.into()))
    }

    pub fn with_classes<I, S>(self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rebuild(|inner| inner.classes = classes.into_iter().map(Into::into).collect())
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.rebuild(|inner| inner.text = text.into())
    }

    pub fn with_value(self, value: impl Into<String>) -> Self {
        self.rebuild(|inner| inner.value = Some(value.into()))
    }

    pub fn with_placeholder(self, placeholder: impl Into<String>) -> Self {
        self.rebuild(|inner| inner.placeholder = Some(placeholder.into()))
    }

    // Builder methods only make sense before the node is wired into a tree,
    // so recreating the Arc there is safe.
    fn rebuild(self, apply: impl FnOnce(&mut BuilderFields)) -> Self {
        let mut fields = BuilderFields {
            tag_name: self.inner.tag_name.clone(),
            id: self.inner.id.clone(),
            classes: self.inner.classes.clone(),
            text: self.inner.text.clone(),
            value: self.inner.value.clone(),
            placeholder: self.inner.placeholder.clone(),
        };
        apply(&mut fields);
        Self {
            inner: Arc::new(ElementInner {
                tag_name: fields.tag_name,
                id: fields.id,
                classes: fields.classes,
                text: fields.text,
                value: fields.value,
                placeholder: fields.placeholder,
                parent: Mutex::new(Weak::new()),
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn append(&self, child: &Element) {
        *child.inner.parent.lock().unwrap() = Arc::downgrade(&self.inner);
        self.inner.children.lock().unwrap().push(child.clone());
    }

    pub fn parent(&self) -> Option<Element> {
        self.inner
            .parent
            .lock()
            .unwrap()
            .upgrade()
            .map(|inner| Element { inner })
    }

    /// Position among the parent's children, `None` for detached nodes.
    pub fn child_index(&self) -> Option<usize> {
        let parent = self.parent()?;
        let children = parent.inner.children.lock().unwrap();
        children.iter().position(|child| child.same_node(self))
    }

    pub fn same_node(&self, other: &Element) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn tag_name(&self) -> &str {
        &self.inner.tag_name
    }

    pub fn id(&self) -> Option<&str> {
        self.inner.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.inner.classes
    }

    fn is_input_like(&self) -> bool {
        matches!(
            self.inner.tag_name.to_ascii_lowercase().as_str(),
            "input" | "textarea"
        )
    }

    /// Full text content, own text plus descendants in tree order.
    pub fn text_content(&self) -> String {
        let mut out = self.inner.text.clone();
        for child in self.inner.children.lock().unwrap().iter() {
            out.push_str(&child.text_content());
        }
        out
    }

    /// Human-readable caption for a captured step: the control value (or
    /// placeholder) for input-like elements, otherwise trimmed text content
    /// capped at `limit` characters.
    pub fn display_text(&self, limit: usize) -> String {
        if self.is_input_like() {
            return self
                .inner
                .value
                .clone()
                .filter(|value| !value.is_empty())
                .or_else(|| self.inner.placeholder.clone())
                .unwrap_or_default();
        }

        self.text_content().trim().chars().take(limit).collect()
    }
}

struct BuilderFields {
    tag_name: String,
    id: Option<String>,
    classes: Vec<String>,
    text: String,
    value: Option<String>,
    placeholder: Option<String>,
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("tag_name", &self.inner.tag_name)
            .field("id", &self.inner.id)
            .field("classes", &self.inner.classes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_index_tracks_insertion_order() {
        let parent = Element::new("ul");
        let first = Element::new("li");
        let second = Element::new("li");
        parent.append(&first);
        parent.append(&second);

        assert_eq!(first.child_index(), Some(0));
        assert_eq!(second.child_index(), Some(1));
        assert!(Element::new("li").child_index().is_none());
    }

    #[test]
    fn display_text_prefers_input_value_then_placeholder() {
        let filled = Element::new("input").with_value("hello").with_placeholder("type here");
        assert_eq!(filled.display_text(50), "hello");

        let empty = Element::new("input").with_value("").with_placeholder("type here");
        assert_eq!(empty.display_text(50), "type here");

        let bare = Element::new("textarea");
        assert_eq!(bare.display_text(50), "");
    }

    #[test]
    fn display_text_trims_and_caps_content() {
        let button = Element::new("button").with_text("  Submit order now  ");
        assert_eq!(button.display_text(6), "Submit");

        let div = Element::new("div");
        let span = Element::new("span").with_text("nested text");
        div.append(&span);
        assert_eq!(div.display_text(50), "nested text");
    }
}
