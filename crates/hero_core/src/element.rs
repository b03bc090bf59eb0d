//! Headless element tree
//!
//! A DOM-like arena: elements carry a tag, class tokens, attributes, optional
//! text and a presentation [`Style`]. An element is *attached* when its
//! parent chain reaches the document root. Animation engines only ever write
//! style; structure is owned by whoever builds the tree.
//!
//! Every style write bumps the element's revision and the tree-wide mutation
//! counter, which lets hosts (and tests) detect writes that happen after a
//! subtree was torn down.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::error::{Result, TreeError};
use crate::style::{Property, PropertyMap, Style};

new_key_type! {
    /// Handle to an element in an [`ElementTree`]
    pub struct ElementId;
}

/// Tree shared between the host and both animation engines
///
/// Scheduling is single-threaded and cooperative, so interior mutability is
/// a `RefCell` rather than a lock.
pub type SharedTree = Rc<RefCell<ElementTree>>;

/// A single element
#[derive(Clone, Debug)]
pub struct Element {
    tag: String,
    classes: SmallVec<[String; 2]>,
    attributes: IndexMap<String, String>,
    text: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    style: Style,
    revision: u64,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: SmallVec::new(),
            attributes: IndexMap::new(),
            text: None,
            parent: None,
            children: Vec::new(),
            style: Style::default(),
            revision: 0,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Number of style writes this element has received
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Arena of elements rooted at a document node
#[derive(Debug)]
pub struct ElementTree {
    nodes: SlotMap<ElementId, Element>,
    document: ElementId,
    mutations: u64,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let document = nodes.insert(Element::new("#document"));
        Self {
            nodes,
            document,
            mutations: 0,
        }
    }

    /// Wrap the tree for sharing with animation engines
    pub fn into_shared(self) -> SharedTree {
        Rc::new(RefCell::new(self))
    }

    /// The document root (always attached)
    pub fn document(&self) -> ElementId {
        self.document
    }

    /// Number of elements, including the document root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Create a detached element
    pub fn create(&mut self, tag: &str) -> ElementId {
        self.nodes.insert(Element::new(tag))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id)
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.nodes.get_mut(id).ok_or(TreeError::UnknownElement(id))
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes
            .get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// Append `child` as the last child of `parent`, moving it if needed
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        if !self.contains(parent) {
            return Err(TreeError::UnknownElement(parent));
        }
        if !self.contains(child) {
            return Err(TreeError::UnknownElement(child));
        }
        if child == self.document {
            return Err(TreeError::DocumentRoot);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }

        self.unlink(child);
        self.element_mut(child)?.parent = Some(parent);
        self.element_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Attach an element under the document root
    pub fn attach(&mut self, id: ElementId) -> Result<()> {
        let document = self.document;
        self.append_child(document, id)
    }

    /// Detach an element (and its subtree) from its parent
    pub fn detach(&mut self, id: ElementId) -> Result<()> {
        if id == self.document {
            return Err(TreeError::DocumentRoot);
        }
        if !self.contains(id) {
            return Err(TreeError::UnknownElement(id));
        }
        self.unlink(id);
        Ok(())
    }

    /// Remove an element and its whole subtree, returning how many elements
    /// were removed
    pub fn remove(&mut self, id: ElementId) -> Result<usize> {
        if id == self.document {
            return Err(TreeError::DocumentRoot);
        }
        if !self.contains(id) {
            return Err(TreeError::UnknownElement(id));
        }
        self.unlink(id);

        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in &doomed {
            self.nodes.remove(*node);
        }
        tracing::trace!("removed {} elements rooted at {:?}", doomed.len(), id);
        Ok(doomed.len())
    }

    fn unlink(&mut self, id: ElementId) {
        if let Some(parent) = self.nodes.get_mut(id).and_then(|e| e.parent.take()) {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
    }

    fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Whether the element's parent chain reaches the document root
    pub fn is_attached(&self, id: ElementId) -> bool {
        self.contains(id) && self.is_ancestor_or_self(self.document, id)
    }

    /// All descendants of `id` in document (pre-)order, excluding `id`
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Descendants of `root` carrying `class`, in document order
    ///
    /// The root itself is never matched, the same way a scoped selector only
    /// looks inside its container.
    pub fn query_class(&self, root: ElementId, class: &str) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.nodes.get(*id).is_some_and(|e| e.has_class(class)))
            .collect()
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    pub fn add_class(&mut self, id: ElementId, class: &str) -> Result<()> {
        let element = self.element_mut(id)?;
        if !element.has_class(class) {
            element.classes.push(class.to_string());
        }
        Ok(())
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) -> Result<()> {
        self.element_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.nodes.get(id).is_some_and(|e| e.has_class(class))
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<()> {
        self.element_mut(id)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn set_text(&mut self, id: ElementId, text: &str) -> Result<()> {
        self.element_mut(id)?.text = Some(text.to_string());
        Ok(())
    }

    // =========================================================================
    // Style
    // =========================================================================

    pub fn style(&self, id: ElementId) -> Option<Style> {
        self.nodes.get(id).map(|e| e.style)
    }

    pub fn property(&self, id: ElementId, property: Property) -> Option<f32> {
        self.nodes.get(id).map(|e| e.style.get(property))
    }

    /// Write a single style property
    ///
    /// Returns `false` if the element no longer exists.
    pub fn set_property(&mut self, id: ElementId, property: Property, value: f32) -> bool {
        match self.nodes.get_mut(id) {
            Some(element) => {
                element.style.set(property, value);
                element.revision += 1;
                self.mutations += 1;
                true
            }
            None => false,
        }
    }

    /// Write every property in `values`
    pub fn apply(&mut self, id: ElementId, values: &PropertyMap) -> bool {
        if !self.contains(id) {
            return false;
        }
        for (property, value) in values.iter() {
            self.set_property(id, property, value);
        }
        true
    }

    /// Style write count of one element
    pub fn revision(&self, id: ElementId) -> Option<u64> {
        self.nodes.get(id).map(|e| e.revision)
    }

    /// Total style writes across the whole tree
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// Opacity as composited through all ancestors
    pub fn effective_opacity(&self, id: ElementId) -> f32 {
        let mut opacity = 1.0;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.nodes.get(current) {
                Some(e) => {
                    opacity *= e.style.opacity;
                    cursor = e.parent;
                }
                None => break,
            }
        }
        opacity
    }
}
