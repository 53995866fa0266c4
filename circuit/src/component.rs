use crate::{CircuitError, Netlist, Node, SimulatedDevice};
use indexmap::IndexMap;
use std::rc::Rc;

/// Represents a generic, possibly-composite component in the circuit tree.
///
/// A `Component` is two ordered collections: its own `ports()` (always present) and, for
/// composites, its `sub_components()` (empty for atomic devices). The [`component-derive`] crate
/// generates this trait's implementation from field attributes; see its docs for the attribute
/// vocabulary.
pub trait Component {
    /// The stable kind name of this component, e.g. `"Resistor"` or `"NandGate"`.
    fn component_name(&self) -> &'static str;

    /// The instance label unique within this component's parent.
    fn role(&self) -> &str;

    /// This component's own ports, keyed by port name, insertion order preserved.
    fn ports(&self) -> IndexMap<String, Rc<Node>>;

    /// This component's direct sub-components, keyed by field name. Empty for atomic devices.
    fn sub_components(&self) -> IndexMap<String, &dyn Component>;

    /// Downcasts to [`AtomicDevice`] if this component is a leaf device. Composite components use
    /// the default `None`.
    fn as_atomic(&self) -> Option<&dyn AtomicDevice> {
        None
    }

    /// Wires `own_port_name` (a port of `self`) to `child_node` (a port of one of `self`'s direct
    /// sub-components).
    ///
    /// Preconditions enforced: `own_port_name` must name a port of `self`; `child_node` must
    /// belong to a direct sub-component of `self`; `child_node`'s name must not start with `_`
    /// (by convention, ports so named are internal to their defining component and may not be
    /// connected to from outside it).
    fn connect(&self, own_port_name: &str, child_node: &Rc<Node>) -> Result<(), CircuitError> {
        let ports = self.ports();
        let own_node = ports
            .get(own_port_name)
            .ok_or_else(|| CircuitError::UnknownOwnPort {
                component: self.component_name().to_string(),
                port: own_port_name.to_string(),
            })?;

        if child_node.name().starts_with('_') {
            return Err(CircuitError::InternalPort {
                component: self.component_name().to_string(),
                port: child_node.name().to_string(),
            });
        }

        let belongs_to_direct_child = self
            .sub_components()
            .values()
            .any(|child| child.ports().values().any(|n| Rc::ptr_eq(n, child_node)));
        if !belongs_to_direct_child {
            return Err(CircuitError::NodeNotADirectChildPort {
                component: self.component_name().to_string(),
                port: child_node.name().to_string(),
            });
        }

        own_node.add_connection(child_node);
        Ok(())
    }
}

/// A leaf [`Component`]: a single atomic electrical element with no sub-components.
pub trait AtomicDevice: Component {
    /// Emits a single line in an external simulator's (ngspice) syntax, given a device id and a
    /// mapping from this device's port names to the net names the caller assigned them.
    fn ngspice_line(&self, id: usize, port_mapping: &IndexMap<String, String>) -> String;

    /// Binds this device's ports to coalesced-group ids from `netlist`, producing the stepping
    /// object the [`crate::Simulation`] will drive.
    fn make_sim_device(&self, netlist: &Netlist) -> Box<dyn SimulatedDevice>;
}
