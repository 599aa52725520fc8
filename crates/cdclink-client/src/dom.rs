//! UI-state snapshot parsing and tree queries.
//!
//! The developer-mode endpoint returns a point-in-time dump of the
//! firmware's window tree. In the source JSON every node is nested one
//! level deep as a single-key `{"TypeName": {...attributes...}}`
//! wrapper; parsing normalizes that quirk into a flat [`DomNode`] shape
//! so traversal code never special-cases it.
//!
//! The parsed tree is immutable. All queries are pure functions over
//! the snapshot and may run from any number of readers concurrently.

use serde_json::{Map, Value};
use thiserror::Error;

/// Hard budget on node visits in a single traversal.
///
/// A safety valve against malformed input, not a performance knob: the
/// structure is a tree by construction, so an honest snapshot never
/// gets near it.
pub const TRAVERSAL_LIMIT: usize = 1000;

const ATTR_CHILDREN: &str = "Children";
const ATTR_CHILDREN_COUNT: &str = "ChildrenCount";

/// Attributes every node must carry.
const REQUIRED_ATTRS: [&str; 4] = ["Active", "Focus", "ItemType", "Visible"];

/// Snapshot parse and traversal errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// A node is not a JSON object.
    #[error("snapshot node is not an object")]
    NotAnObject,

    /// A node is an empty object.
    #[error("snapshot node is an empty object")]
    EmptyNode,

    /// A node lacks one of the attributes the walk depends on.
    #[error("node {type_name:?} is missing required attribute {attribute:?}")]
    MissingAttribute {
        /// Type tag of the offending node.
        type_name: String,
        /// Name of the absent attribute.
        attribute: &'static str,
    },

    /// A node's declared child count disagrees with its child list.
    #[error("node {type_name:?} declares {declared} children but carries {actual}")]
    ChildCountMismatch {
        /// Type tag of the offending node.
        type_name: String,
        /// Count declared in the attributes.
        declared: usize,
        /// Children actually present.
        actual: usize,
    },

    /// The traversal budget ran out.
    #[error("traversal budget of {limit} node visits exhausted")]
    TraversalLimitExceeded {
        /// The budget that was exhausted.
        limit: usize,
    },
}

/// One node of the parsed snapshot tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DomNode {
    type_name: String,
    attributes: Map<String, Value>,
    children: Vec<DomNode>,
}

impl DomNode {
    /// Parse a snapshot node (and its subtree) from the wire JSON.
    ///
    /// A node is either a `{typeName: innerPayload}` single-key wrapper
    /// or a direct attribute map; the wrapper level is unwrapped here.
    /// Parsing fails on any node missing a required attribute or whose
    /// declared child count disagrees with its child list; a walk over
    /// such a tree would be corrupt.
    pub fn from_value(value: &Value) -> Result<DomNode, DomError> {
        let object = value.as_object().ok_or(DomError::NotAnObject)?;
        if object.is_empty() {
            return Err(DomError::EmptyNode);
        }

        let (type_name, payload) = match singleton_wrapper(object) {
            Some((name, inner)) => (name.to_string(), inner),
            None => (String::new(), object),
        };

        for attribute in REQUIRED_ATTRS {
            if !payload.contains_key(attribute) {
                return Err(DomError::MissingAttribute {
                    type_name: type_name.clone(),
                    attribute,
                });
            }
        }
        let declared = payload
            .get(ATTR_CHILDREN_COUNT)
            .and_then(Value::as_u64)
            .ok_or_else(|| DomError::MissingAttribute {
                type_name: type_name.clone(),
                attribute: ATTR_CHILDREN_COUNT,
            })? as usize;

        let mut children = Vec::with_capacity(declared);
        if let Some(values) = payload.get(ATTR_CHILDREN).and_then(Value::as_array) {
            for value in values {
                children.push(DomNode::from_value(value)?);
            }
        }
        if children.len() != declared {
            return Err(DomError::ChildCountMismatch {
                type_name,
                declared,
                actual: children.len(),
            });
        }

        let attributes = payload
            .iter()
            .filter(|(key, _)| key.as_str() != ATTR_CHILDREN)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(DomNode {
            type_name,
            attributes,
            children,
        })
    }

    /// Type tag of this node.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// All attributes of this node (the structural child list excluded).
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Look up one attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Direct children, in document order.
    pub fn children(&self) -> &[DomNode] {
        &self.children
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the node is marked active.
    pub fn active(&self) -> bool {
        self.flag("Active")
    }

    /// Whether the node holds focus.
    pub fn focus(&self) -> bool {
        self.flag("Focus")
    }

    /// Whether the node is visible.
    pub fn visible(&self) -> bool {
        self.flag("Visible")
    }

    /// The node's item type discriminator.
    pub fn item_type(&self) -> i64 {
        self.attribute("ItemType").and_then(Value::as_i64).unwrap_or(0)
    }

    // The firmware encodes flags as booleans or 0/1 integers depending
    // on revision.
    fn flag(&self, name: &str) -> bool {
        match self.attribute(name) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(number)) => number.as_i64().unwrap_or(0) != 0,
            _ => false,
        }
    }

    /// Collect every node (pre-order, depth first) satisfying the
    /// predicate. The root is visited first, so a matching root is
    /// included.
    ///
    /// The walk carries an explicit work list and a visit budget of
    /// [`TRAVERSAL_LIMIT`] nodes; exceeding it fails with
    /// [`DomError::TraversalLimitExceeded`].
    pub fn find_all<P>(&self, predicate: P) -> Result<Vec<&DomNode>, DomError>
    where
        P: Fn(&DomNode) -> bool,
    {
        let mut budget = TRAVERSAL_LIMIT;
        let mut found = Vec::new();
        let mut work = vec![self];
        while let Some(node) = work.pop() {
            budget -= 1;
            if budget == 0 {
                return Err(DomError::TraversalLimitExceeded {
                    limit: TRAVERSAL_LIMIT,
                });
            }
            if predicate(node) {
                found.push(node);
            }
            // Reverse push keeps document order on the stack.
            for child in node.children.iter().rev() {
                work.push(child);
            }
        }
        Ok(found)
    }

    /// Whether this node or any descendant has `attribute == value`.
    pub fn contains_recursively(&self, attribute: &str, value: &Value) -> bool {
        if self.attribute(attribute) == Some(value) {
            return true;
        }
        self.children
            .iter()
            .any(|child| child.contains_recursively(attribute, value))
    }

    /// Conjunction of [`DomNode::contains_recursively`] over the pairs.
    pub fn contains_all_recursively(&self, pairs: &[(&str, Value)]) -> bool {
        pairs
            .iter()
            .all(|(attribute, value)| self.contains_recursively(attribute, value))
    }

    /// Whether at least one direct child satisfies
    /// [`DomNode::contains_all_recursively`].
    pub fn has_child_that_contains_all(&self, pairs: &[(&str, Value)]) -> bool {
        self.children
            .iter()
            .any(|child| child.contains_all_recursively(pairs))
    }

    /// 0-based position among direct children of the first child
    /// satisfying [`DomNode::contains_all_recursively`], if any.
    ///
    /// List-style UI navigation addresses entries by this ordinal.
    pub fn index_of_child_that_contains_all(&self, pairs: &[(&str, Value)]) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.contains_all_recursively(pairs))
    }

    /// Find the node whose *direct* child carries the type tag
    /// `child_type_name`. Matches on the tag only, not on attributes.
    pub fn find_parent_of(&self, child_type_name: &str) -> Option<&DomNode> {
        for child in &self.children {
            if child.type_name == child_type_name {
                return Some(self);
            }
            if let Some(found) = child.find_parent_of(child_type_name) {
                return Some(found);
            }
        }
        None
    }

    /// First *direct* child (not descendant) whose subtree satisfies
    /// [`DomNode::contains_recursively`].
    pub fn find_child_that_contains(&self, attribute: &str, value: &Value) -> Option<&DomNode> {
        self.children
            .iter()
            .find(|child| child.contains_recursively(attribute, value))
    }

    /// Depth-first search for the first node carrying `attribute`,
    /// preferring the node itself over its descendants. Returns the
    /// attribute's value.
    pub fn find_first_attribute_depth_first(&self, attribute: &str) -> Option<&Value> {
        if let Some(value) = self.attribute(attribute) {
            return Some(value);
        }
        self.children
            .iter()
            .find_map(|child| child.find_first_attribute_depth_first(attribute))
    }
}

/// Detect the source format's needless nesting: a single-key object
/// whose value is itself an object is a `{typeName: payload}` wrapper.
fn singleton_wrapper(object: &Map<String, Value>) -> Option<(&str, &Map<String, Value>)> {
    if object.len() != 1 {
        return None;
    }
    let (name, inner) = object.iter().next()?;
    inner.as_object().map(|payload| (name.as_str(), payload))
}
