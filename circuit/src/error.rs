use thiserror::Error;

/// Programmer errors raised while building or validating a circuit.
///
/// The simulator treats its inputs as trusted hand-authored components: these are the
/// only recoverable errors in the build/netlist path, surfaced as `Result` rather than a panic so
/// callers (primarily tests) can assert on malformed circuits. Once a `Netlist` and `Simulation`
/// are running, further violations are programmer-error assertions per policy, not
/// `CircuitError`s.
#[derive(Debug, Error)]
pub enum CircuitError {
    /// `Component::connect` was given a port name this component doesn't expose.
    #[error("{component}: no such own port `{port}`")]
    UnknownOwnPort { component: String, port: String },

    /// `Component::connect` was given a node that isn't a port of a direct sub-component.
    #[error("{component}: node `{port}` is not a port of a direct sub-component")]
    NodeNotADirectChildPort { component: String, port: String },

    /// `Component::connect` was given a node whose name starts with `_`, marking it internal to
    /// its own defining component.
    #[error("{component}: cannot connect to internal port `{port}`")]
    InternalPort { component: String, port: String },

    /// A composite component was built with no sub-components.
    #[error("{0}: composite component has no sub-components")]
    NoSubComponents(String),

    /// A `Node` reachable from the root has no incident connections.
    #[error("unconnected node: {0}")]
    UnconnectedNode(String),

    /// A `Node` appeared as a connection target but was never discovered during the traversal.
    #[error("connection target not reachable from root: {0}")]
    UnreachableConnectionTarget(String),
}
