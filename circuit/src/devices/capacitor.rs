use crate::{AtomicDevice, Component, Netlist, Node, SimulatedDevice};
use indexmap::IndexMap;
use std::rc::Rc;

/// A two-terminal capacitor, stepped via the backward-Euler companion model.
pub struct Capacitor {
    role: String,
    a: Rc<Node>,
    b: Rc<Node>,
    capacitance: f64,
}

impl Capacitor {
    pub fn new(role: impl Into<String>, capacitance: f64) -> Self {
        Self {
            role: role.into(),
            a: Node::new("a"),
            b: Node::new("b"),
            capacitance,
        }
    }

    pub fn port_a(&self) -> &Rc<Node> {
        &self.a
    }

    pub fn port_b(&self) -> &Rc<Node> {
        &self.b
    }
}

impl Component for Capacitor {
    fn component_name(&self) -> &'static str {
        "capacitor"
    }
    fn role(&self) -> &str {
        &self.role
    }
    fn ports(&self) -> IndexMap<String, Rc<Node>> {
        let mut m = IndexMap::new();
        m.insert("a".to_string(), self.a.clone());
        m.insert("b".to_string(), self.b.clone());
        m
    }
    fn sub_components(&self) -> IndexMap<String, &dyn Component> {
        IndexMap::new()
    }
    fn as_atomic(&self) -> Option<&dyn AtomicDevice> {
        Some(self)
    }
}

impl AtomicDevice for Capacitor {
    fn ngspice_line(&self, id: usize, port_mapping: &IndexMap<String, String>) -> String {
        // ic=0: the uncharged initial condition this crate's stepping model always assumes too.
        format!(
            "C{id} {} {} {} ic=0",
            port_mapping["a"], port_mapping["b"], self.capacitance
        )
    }

    fn make_sim_device(&self, netlist: &Netlist) -> Box<dyn SimulatedDevice> {
        Box::new(SimulatedCapacitor {
            a: netlist.group_id(&self.a),
            b: netlist.group_id(&self.b),
            capacitance: self.capacitance,
        })
    }
}

struct SimulatedCapacitor {
    a: usize,
    b: usize,
    capacitance: f64,
}

impl SimulatedDevice for SimulatedCapacitor {
    fn step(&mut self, device_id: usize, ctx: &crate::StepContext, eq: &mut crate::EquationSystem) {
        let v_prev = ctx.prev_voltage_across(self.a, self.b);
        crate::stamp_capacitor(
            eq,
            self.a,
            self.b,
            self.capacitance,
            ctx.dt,
            &format!("cap{device_id}"),
            v_prev,
        );
    }
}
