//! Host-agnostic mount surface.
//!
//! A widget draws into a retained node tree; the host (or an adapter)
//! reads snapshots out and projects them onto its real scene graph.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// One node of the retained tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceNode {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<SurfaceNode>,
}

impl SurfaceNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn find_child(&self, tag: &str) -> Option<&SurfaceNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn find_child_mut(&mut self, tag: &str) -> Option<&mut SurfaceNode> {
        self.children.iter_mut().find(|c| c.tag == tag)
    }

    /// Depth-first lookup by tag
    pub fn find(&self, tag: &str) -> Option<&SurfaceNode> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(tag))
    }
}

/// Cloneable handle to one mounted root node
#[derive(Debug, Clone)]
pub struct Surface {
    root: Rc<RefCell<SurfaceNode>>,
}

impl Surface {
    /// Create a standalone surface, as used by headless hosts and tests
    pub fn detached() -> Self {
        Self::with_root("surface")
    }

    pub fn with_root(tag: impl Into<String>) -> Self {
        Self {
            root: Rc::new(RefCell::new(SurfaceNode::new(tag))),
        }
    }

    /// Run a closure with mutable access to the root node
    pub fn update<R>(&self, f: impl FnOnce(&mut SurfaceNode) -> R) -> R {
        f(&mut self.root.borrow_mut())
    }

    /// Run a closure with shared access to the root node
    pub fn inspect<R>(&self, f: impl FnOnce(&SurfaceNode) -> R) -> R {
        f(&self.root.borrow())
    }

    /// Clone the current tree for host consumption
    pub fn snapshot(&self) -> SurfaceNode {
        self.root.borrow().clone()
    }

    pub fn set_attr(&self, key: impl Into<String>, value: impl Into<String>) {
        self.root.borrow_mut().set_attr(key, value);
    }

    pub fn remove_attr(&self, key: &str) {
        self.root.borrow_mut().attrs.remove(key);
    }

    pub fn attr(&self, key: &str) -> Option<String> {
        self.root.borrow().attrs.get(key).cloned()
    }

    pub fn clear_children(&self) {
        self.root.borrow_mut().children.clear();
    }

    /// Whether two handles point at the same mounted root
    pub fn same_as(&self, other: &Surface) -> bool {
        Rc::ptr_eq(&self.root, &other.root)
    }
}

/// Where a widget mounts: a surface handle, or a name resolved against
/// the runtime's surface registry at construction
#[derive(Clone)]
pub enum Target {
    Surface(Surface),
    Named(String),
}

impl From<Surface> for Target {
    fn from(surface: Surface) -> Self {
        Target::Surface(surface)
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::Named(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Target::Named(name)
    }
}
