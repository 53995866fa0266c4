use indexmap::IndexMap;
use nalgebra::{DMatrix, DVector};

/// A sparse-in-spirit (dense in representation — see the module doc below) linear system built up
/// one stamped term at a time, then solved for every named variable.
///
/// Rows and variables are both identified by string ids, assigned dense indices the first time
/// they're seen (`IndexMap`'s insertion order gives stable, deterministic ids across a run, which
/// `dump_equation` and tests both rely on). A device stamps the system by naming its own rows —
/// `i{device_id}` for branch currents, `v{group_id}_aux` for auxiliary voltage unknowns — and the
/// node-voltage rows it touches, `v{group_id}`, without caring what dense index either ends up at.
///
/// The system is solved densely via `nalgebra`'s LU decomposition. For circuits of the scale this
/// crate targets (tens of nodes, not thousands) a dense solve is simple and fast enough; true
/// sparse factorization is explicitly out of scope. If LU fails (a singular or
/// near-singular system — common with this crate's behavioral MOSFET model at the switching
/// threshold) the system falls back to a least-squares solve via SVD and reports the result as
/// `approximated`.
pub struct EquationSystem {
    vars: IndexMap<String, usize>,
    rows: IndexMap<String, usize>,
    terms: Vec<(usize, usize, f64)>,
    constants: Vec<(usize, f64)>,
}

/// The outcome of solving an [`EquationSystem`]: a value per named variable, plus whether the
/// direct solve degraded to a least-squares approximation.
pub struct Solution {
    values: IndexMap<String, f64>,
    pub approximated: bool,
}

impl Solution {
    /// The solved value for `var`, or `0.0` if `var` never appeared in the system.
    pub fn get(&self, var: &str) -> f64 {
        self.values.get(var).copied().unwrap_or(0.0)
    }
}

impl Default for EquationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl EquationSystem {
    pub fn new() -> Self {
        Self {
            vars: IndexMap::new(),
            rows: IndexMap::new(),
            terms: Vec::new(),
            constants: Vec::new(),
        }
    }

    fn var_index(&mut self, name: &str) -> usize {
        if let Some(&i) = self.vars.get(name) {
            return i;
        }
        let i = self.vars.len();
        self.vars.insert(name.to_string(), i);
        i
    }

    fn row_index(&mut self, name: &str) -> usize {
        if let Some(&i) = self.rows.get(name) {
            return i;
        }
        let i = self.rows.len();
        self.rows.insert(name.to_string(), i);
        i
    }

    /// Adds `coefficient * var` to `row`'s equation.
    pub fn add_term(&mut self, row: &str, var: &str, coefficient: f64) {
        let row_i = self.row_index(row);
        let var_i = self.var_index(var);
        self.terms.push((row_i, var_i, coefficient));
    }

    /// Adds a constant to the right-hand side of `row`'s equation.
    pub fn add_constant(&mut self, row: &str, value: f64) {
        let row_i = self.row_index(row);
        self.constants.push((row_i, value));
    }

    /// Solves the accumulated system for all named variables.
    ///
    /// Rows and variables need not be in 1:1 correspondence with each other by id — only the
    /// final dense counts matter, and a well-formed stamping always produces a square (or
    /// over/under-determined only at the margins, e.g. an unused node) system.
    pub fn solve(&self) -> Solution {
        let n_rows = self.rows.len();
        let n_vars = self.vars.len();

        let mut a = DMatrix::<f64>::zeros(n_rows, n_vars);
        for &(row, var, coeff) in &self.terms {
            a[(row, var)] += coeff;
        }

        let mut b = DVector::<f64>::zeros(n_rows);
        for &(row, value) in &self.constants {
            b[row] += value;
        }

        let (values, approximated) = if n_rows == n_vars {
            match a.clone().lu().solve(&b) {
                Some(x) => (x, false),
                None => (Self::least_squares(&a, &b), true),
            }
        } else {
            (Self::least_squares(&a, &b), true)
        };

        let mut out = IndexMap::new();
        for (name, &i) in &self.vars {
            out.insert(name.clone(), values[i]);
        }

        Solution {
            values: out,
            approximated,
        }
    }

    fn least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> DVector<f64> {
        let svd = a.clone().svd(true, true);
        svd.solve(b, 1e-12).unwrap_or_else(|_| DVector::zeros(a.ncols()))
    }

    /// A human-readable dump of every row's equation, in row-insertion order — one line per row,
    /// `coeff*var + coeff*var + ... = constant`.
    pub fn dump_equation(&self) -> String {
        let mut per_row_terms: Vec<Vec<(String, f64)>> = vec![Vec::new(); self.rows.len()];
        for &(row, var, coeff) in &self.terms {
            let var_name = self
                .vars
                .iter()
                .find(|&(_, &i)| i == var)
                .map(|(name, _)| name.clone())
                .unwrap_or_default();
            per_row_terms[row].push((var_name, coeff));
        }

        let mut per_row_constant = vec![0.0_f64; self.rows.len()];
        for &(row, value) in &self.constants {
            per_row_constant[row] += value;
        }

        let mut out = String::new();
        for (row_name, &row_i) in &self.rows {
            let lhs = per_row_terms[row_i]
                .iter()
                .map(|(var, coeff)| format!("{coeff}*{var}"))
                .collect::<Vec<_>>()
                .join(" + ");
            out.push_str(&format!(
                "{row_name}: {lhs} = {}\n",
                per_row_constant[row_i]
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_a_simple_voltage_divider() {
        // i1 = (v1 - v0) / r, stamped as a resistor between node 0 (ground, v=0) and node 1,
        // with a current source of 1A injected into node 1.
        let mut eq = EquationSystem::new();
        eq.add_term("v0", "v0", 1.0);
        eq.add_constant("v0", 0.0);

        eq.add_term("v1", "v1", 1.0 / 1000.0);
        eq.add_term("v1", "v0", -1.0 / 1000.0);
        eq.add_constant("v1", -1.0);

        let solution = eq.solve();
        assert!(!solution.approximated);
        assert!((solution.get("v1") - 1000.0).abs() < 1e-6);
        assert!((solution.get("v0") - 0.0).abs() < 1e-9);
    }

    #[test]
    fn missing_variable_reads_as_zero() {
        let eq = EquationSystem::new();
        let solution = eq.solve();
        assert_eq!(solution.get("vnope"), 0.0);
    }

    #[test]
    fn dump_equation_lists_every_row() {
        let mut eq = EquationSystem::new();
        eq.add_term("v0", "v0", 1.0);
        eq.add_constant("v0", 5.0);
        let dump = eq.dump_equation();
        assert!(dump.contains("v0:"));
        assert!(dump.contains("= 5"));
    }
}
