use crate::{AtomicDevice, CircuitError, Component, Node};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Wraps `Rc<Node>` so it can be used as a hash map / set key by pointer identity, matching the
/// Python original's use of the `Node` object itself (identity-hashed) as a dict key.
#[derive(Clone)]
struct NodeKey(Rc<Node>);

impl PartialEq for NodeKey {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for NodeKey {}
impl std::hash::Hash for NodeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

/// The flat view of a circuit, derived once from its root [`Component`].
///
/// Holds every reachable `Node`, every atomic device (in traversal order — this order is the
/// device id used throughout diagnostics and stamping), the raw connection list, and the
/// coalesced-group partition.
pub struct Netlist<'a> {
    nodes: Vec<Rc<Node>>,
    atomic_devices: Vec<&'a dyn AtomicDevice>,
    connections: Vec<(Rc<Node>, Rc<Node>)>,
    adjacency: HashMap<NodeKey, Vec<Rc<Node>>>,
    groups: Vec<Vec<Rc<Node>>>,
    group_of: HashMap<NodeKey, usize>,
}

impl<'a> Netlist<'a> {
    /// Builds a `Netlist` from the root of a component tree.
    pub fn build(root: &'a dyn Component) -> Result<Netlist<'a>, CircuitError> {
        let mut netlist = Netlist {
            nodes: Vec::new(),
            atomic_devices: Vec::new(),
            connections: Vec::new(),
            adjacency: HashMap::new(),
            groups: Vec::new(),
            group_of: HashMap::new(),
        };

        netlist.resolve_component(root)?;

        for node in &netlist.nodes {
            if netlist.adjacency.get(&NodeKey(node.clone())).is_none() {
                return Err(CircuitError::UnconnectedNode(node.name().to_string()));
            }
        }

        netlist.coalesce();
        Ok(netlist)
    }

    fn resolve_component(&mut self, component: &'a dyn Component) -> Result<(), CircuitError> {
        for node in component.ports().values() {
            self.nodes.push(node.clone());
        }

        if let Some(atomic) = component.as_atomic() {
            self.atomic_devices.push(atomic);
        } else {
            let sub_components = component.sub_components();
            if sub_components.is_empty() {
                return Err(CircuitError::NoSubComponents(
                    component.component_name().to_string(),
                ));
            }
            for sub_component in sub_components.values() {
                self.resolve_component(*sub_component)?;
            }
        }

        for node in component.ports().values() {
            for other in node.connections() {
                if !self.nodes.iter().any(|n| Rc::ptr_eq(n, &other)) {
                    return Err(CircuitError::UnreachableConnectionTarget(
                        other.name().to_string(),
                    ));
                }
                self.connections.push((node.clone(), other.clone()));
                self.adjacency
                    .entry(NodeKey(node.clone()))
                    .or_default()
                    .push(other.clone());
                self.adjacency
                    .entry(NodeKey(other.clone()))
                    .or_default()
                    .push(node.clone());
            }
        }

        Ok(())
    }

    fn coalesce(&mut self) {
        let mut seen: HashMap<NodeKey, ()> = HashMap::new();

        for start in self.nodes.clone() {
            if seen.contains_key(&NodeKey(start.clone())) {
                continue;
            }

            let mut group = Vec::new();
            seen.insert(NodeKey(start.clone()), ());
            let mut queue = VecDeque::from([start]);

            while let Some(top) = queue.pop_front() {
                group.push(top.clone());
                if let Some(neighbours) = self.adjacency.get(&NodeKey(top.clone())) {
                    for neighbour in neighbours.clone() {
                        if seen.contains_key(&NodeKey(neighbour.clone())) {
                            continue;
                        }
                        seen.insert(NodeKey(neighbour.clone()), ());
                        queue.push_back(neighbour);
                    }
                }
            }

            let group_id = self.groups.len();
            for node in &group {
                self.group_of.insert(NodeKey(node.clone()), group_id);
            }
            self.groups.push(group);
        }
    }

    /// All nodes reachable from the root, in traversal order.
    pub fn nodes(&self) -> &[Rc<Node>] {
        &self.nodes
    }

    /// All atomic devices, in traversal (device-id) order.
    pub fn atomic_devices(&self) -> &[&'a dyn AtomicDevice] {
        &self.atomic_devices
    }

    /// The number of coalesced groups.
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// The members of coalesced group `id`.
    pub fn group_members(&self, id: usize) -> &[Rc<Node>] {
        &self.groups[id]
    }

    /// The dense coalesced-group id a node belongs to.
    pub fn group_id(&self, node: &Rc<Node>) -> usize {
        *self
            .group_of
            .get(&NodeKey(node.clone()))
            .expect("node not part of this netlist")
    }

    /// Human-readable listing of nodes (traversal order) and coalesced groups with their members.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        out.push_str(" == Nodes == \n");
        for (i, node) in self.nodes.iter().enumerate() {
            out.push_str(&format!("   {i:3}: {}\n", node.name()));
        }

        out.push_str("\n == Coalesced == \n");
        for (group_num, group) in self.groups.iter().enumerate() {
            if let Some((first, rest)) = group.split_first() {
                out.push_str(&format!("  {group_num:3} - {}\n", first.name()));
                for node in rest {
                    out.push_str(&format!("        {}\n", node.name()));
                }
            } else {
                out.push_str(&format!("  {group_num:3} - [empty]\n"));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    /// A minimal atomic device exposing two ports, used to exercise `Netlist` in isolation from
    /// any concrete device implementation.
    struct Leaf {
        p1: Rc<Node>,
        p2: Rc<Node>,
    }

    impl Leaf {
        fn new() -> Self {
            Self {
                p1: Node::new("p1"),
                p2: Node::new("p2"),
            }
        }
    }

    impl Component for Leaf {
        fn component_name(&self) -> &'static str {
            "Leaf"
        }
        fn role(&self) -> &str {
            "leaf"
        }
        fn ports(&self) -> IndexMap<String, Rc<Node>> {
            let mut m = IndexMap::new();
            m.insert("p1".to_string(), self.p1.clone());
            m.insert("p2".to_string(), self.p2.clone());
            m
        }
        fn sub_components(&self) -> IndexMap<String, &dyn Component> {
            IndexMap::new()
        }
        fn as_atomic(&self) -> Option<&dyn AtomicDevice> {
            Some(self)
        }
    }

    impl AtomicDevice for Leaf {
        fn ngspice_line(&self, _id: usize, _port_mapping: &IndexMap<String, String>) -> String {
            unimplemented!("not exercised by netlist tests")
        }
        fn make_sim_device(&self, _netlist: &Netlist) -> Box<dyn crate::SimulatedDevice> {
            unimplemented!("not exercised by netlist tests")
        }
    }

    /// A composite wiring two `Leaf`s together through its own two ports.
    struct Pair {
        leaf_0: Leaf,
        leaf_1: Leaf,
        a: Rc<Node>,
        b: Rc<Node>,
    }

    impl Pair {
        fn new() -> Self {
            Self {
                leaf_0: Leaf::new(),
                leaf_1: Leaf::new(),
                a: Node::new("a"),
                b: Node::new("b"),
            }
        }
    }

    impl Component for Pair {
        fn component_name(&self) -> &'static str {
            "Pair"
        }
        fn role(&self) -> &str {
            "pair"
        }
        fn ports(&self) -> IndexMap<String, Rc<Node>> {
            let mut m = IndexMap::new();
            m.insert("a".to_string(), self.a.clone());
            m.insert("b".to_string(), self.b.clone());
            m
        }
        fn sub_components(&self) -> IndexMap<String, &dyn Component> {
            let mut m: IndexMap<String, &dyn Component> = IndexMap::new();
            m.insert("leaf_0".to_string(), &self.leaf_0);
            m.insert("leaf_1".to_string(), &self.leaf_1);
            m
        }
    }

    #[test]
    fn unconnected_node_is_a_build_error() {
        let pair = Pair::new();
        let err = Netlist::build(&pair).unwrap_err();
        assert!(matches!(err, CircuitError::UnconnectedNode(_)));
    }

    fn wire_pair(pair: &Pair) {
        pair.connect("a", &pair.leaf_0.p1).unwrap();
        pair.connect("b", &pair.leaf_1.p2).unwrap();
        pair.leaf_0.p1.add_connection(&pair.leaf_1.p1);
        pair.leaf_0.p2.add_connection(&pair.leaf_1.p2);
    }

    #[test]
    fn connected_nodes_coalesce_into_one_group() {
        let pair = Pair::new();
        wire_pair(&pair);

        let netlist = Netlist::build(&pair).unwrap();
        assert_eq!(netlist.nodes().len(), 6);
        assert_eq!(netlist.atomic_devices().len(), 2);
        // a <-> leaf_0.p1 <-> leaf_1.p1 is one group; b <-> leaf_1.p2 <-> leaf_0.p2 is the other.
        assert_eq!(netlist.num_groups(), 2);
    }

    #[test]
    fn dump_lists_nodes_and_groups() {
        let pair = Pair::new();
        wire_pair(&pair);
        let netlist = Netlist::build(&pair).unwrap();
        let dump = netlist.dump();
        assert!(dump.contains("== Nodes =="));
        assert!(dump.contains("== Coalesced =="));
    }
}
