use std::cell::RefCell;
use std::rc::Rc;

/// A named port on exactly one [`Component`](crate::Component).
///
/// A `Node` carries a set of outward connections to ports on direct sub-components; per the
/// design, connections only ever cross exactly one level of hierarchy, so every entry in
/// `connections` points at a node owned by one of this node's owning component's direct children.
pub struct Node {
    /// The port name this `Node` represents, local to its owning `Component`.
    name: String,

    /// Outward edges to ports on direct sub-components. Populated only by
    /// [`Component::connect`](crate::Component::connect); never mutated afterwards.
    connections: RefCell<Vec<Rc<Node>>>,
}

impl Node {
    /// Creates a new, unconnected `Node` with the given port name.
    pub fn new(name: impl Into<String>) -> Rc<Node> {
        Rc::new(Node {
            name: name.into(),
            connections: RefCell::new(Vec::new()),
        })
    }

    /// The port name this node represents.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records an outward connection from this node to `other`. Called only by
    /// [`Component::connect`](crate::Component::connect).
    pub(crate) fn add_connection(&self, other: &Rc<Node>) {
        self.connections.borrow_mut().push(other.clone());
    }

    /// The nodes this node connects outward to (empty unless this node is a parent's own port
    /// that has been wired to a child's port).
    pub fn connections(&self) -> Vec<Rc<Node>> {
        self.connections.borrow().clone()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({})", self.name)
    }
}
