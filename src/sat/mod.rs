//! Thin adapter around [`rustsat`]/[`rustsat_kissat`] providing the
//! incremental, clause-at-a-time interface the structural encoders need:
//! allocate a variable, add a clause, add a Tseitin gate, solve under
//! assumptions, read back the model.

use rustsat::instances::Cnf;
use rustsat::solvers::{Solve, SolveIncremental, SolverResult};
use rustsat::types::{Lit, TernaryVal, Var};
use rustsat_kissat::Kissat;

use crate::error::CoreError;

/// Outcome of a single SAT query, mirroring the solver's own three-valued
/// result (satisfiable / unsatisfiable / aborted by a resource limit).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SatResult {
    True,
    False,
    Aborted,
}

/// Incremental CNF builder and solver wrapping a single `kissat` instance.
/// Variables allocated here correspond 1:1 to the boolean variables the
/// structural and Boolean-difference encoders introduce.
pub struct SatAdapter {
    solver: Kissat<'static>,
    nb_vars: u32,
    stats: SatStats,
}

/// Running totals reported by [`crate::dtpg`]'s per-fault statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct SatStats {
    pub nb_vars: usize,
    pub nb_clauses: usize,
    pub nb_solve_calls: usize,
}

impl Default for SatAdapter {
    fn default() -> SatAdapter {
        SatAdapter::new()
    }
}

impl SatAdapter {
    pub fn new() -> Self {
        SatAdapter {
            solver: Kissat::default(),
            nb_vars: 0,
            stats: SatStats::default(),
        }
    }

    /// Allocate a fresh boolean variable and return its positive literal.
    pub fn new_variable(&mut self) -> Lit {
        let v = Var::new(self.nb_vars);
        self.nb_vars += 1;
        self.stats.nb_vars = self.nb_vars as usize;
        v.pos_lit()
    }

    pub fn nb_vars(&self) -> u32 {
        self.nb_vars
    }

    pub fn add_clause(&mut self, lits: &[Lit]) -> Result<(), CoreError> {
        self.stats.nb_clauses += 1;
        let clause: rustsat::types::Clause = lits.iter().copied().collect();
        self.solver
            .add_clause(clause)
            .map_err(|e| CoreError::SatAbort(e.to_string()))
    }

    /// `a = b`, i.e. `(a -> b) & (b -> a)`.
    pub fn add_buffer(&mut self, a: Lit, b: Lit) -> Result<(), CoreError> {
        self.add_clause(&[!a, b])?;
        self.add_clause(&[a, !b])
    }

    /// `out = in1 & in2`.
    pub fn add_and_gate(&mut self, out: Lit, in1: Lit, in2: Lit) -> Result<(), CoreError> {
        self.add_clause(&[!out, in1])?;
        self.add_clause(&[!out, in2])?;
        self.add_clause(&[out, !in1, !in2])
    }

    /// `out = in1 | in2`.
    pub fn add_or_gate(&mut self, out: Lit, in1: Lit, in2: Lit) -> Result<(), CoreError> {
        self.add_and_gate(!out, !in1, !in2)
    }

    /// `out = in1 & in2 & .. & inN`.
    pub fn add_and_n(&mut self, out: Lit, ins: &[Lit]) -> Result<(), CoreError> {
        for &i in ins {
            self.add_clause(&[!out, i])?;
        }
        let mut clause: Vec<Lit> = ins.iter().map(|l| !*l).collect();
        clause.push(out);
        self.add_clause(&clause)
    }

    /// `out = in1 | in2 | .. | inN`.
    pub fn add_or_n(&mut self, out: Lit, ins: &[Lit]) -> Result<(), CoreError> {
        let negs: Vec<Lit> = ins.iter().map(|l| !*l).collect();
        self.add_and_n(!out, &negs)
    }

    /// `out = in1 XOR in2`.
    pub fn add_xor_gate(&mut self, out: Lit, in1: Lit, in2: Lit) -> Result<(), CoreError> {
        self.add_clause(&[!out, in1, in2])?;
        self.add_clause(&[!out, !in1, !in2])?;
        self.add_clause(&[out, !in1, in2])?;
        self.add_clause(&[out, in1, !in2])
    }

    /// `out = mux(sel, a, b) = sel ? a : b`.
    pub fn add_mux_gate(&mut self, out: Lit, sel: Lit, a: Lit, b: Lit) -> Result<(), CoreError> {
        self.add_clause(&[!sel, !a, out])?;
        self.add_clause(&[!sel, a, !out])?;
        self.add_clause(&[sel, !b, out])?;
        self.add_clause(&[sel, b, !out])
    }

    /// `out = maj(a, b, c)`.
    pub fn add_maj_gate(&mut self, out: Lit, a: Lit, b: Lit, c: Lit) -> Result<(), CoreError> {
        self.add_clause(&[!out, !a, !b, c])?;
        self.add_clause(&[!out, !a, b, !c])?;
        self.add_clause(&[!out, a, !b, !c])?;
        self.add_clause(&[!out, a, b])?;
        self.add_clause(&[!out, a, c])?;
        self.add_clause(&[!out, b, c])?;
        self.add_clause(&[out, !a, !b])?;
        self.add_clause(&[out, !a, !c])?;
        self.add_clause(&[out, !b, !c])?;
        self.add_clause(&[out, a, b, !c])?;
        self.add_clause(&[out, a, !b, c])?;
        self.add_clause(&[out, !a, b, c])
    }

    pub fn solve(&mut self, assumptions: &[Lit]) -> Result<SatResult, CoreError> {
        self.stats.nb_solve_calls += 1;
        let res = self
            .solver
            .solve_assumps(assumptions)
            .map_err(|e| CoreError::SatAbort(e.to_string()))?;
        Ok(match res {
            SolverResult::Sat => SatResult::True,
            SolverResult::Unsat => SatResult::False,
            SolverResult::Interrupted => SatResult::Aborted,
        })
    }

    /// The model value of `lit` after a `True` result from [`Self::solve`].
    pub fn value(&mut self, lit: Lit) -> Option<bool> {
        match self.solver.lit_val(lit) {
            Ok(TernaryVal::True) => Some(true),
            Ok(TernaryVal::False) => Some(false),
            _ => None,
        }
    }

    pub fn stats(&self) -> SatStats {
        self.stats
    }
}

/// Flatten a list of clauses into a [`Cnf`] instance, used by tests that want
/// to inspect the generated constraints without a live solver.
pub fn to_cnf(clauses: &[Vec<Lit>]) -> Cnf {
    let mut cnf = Cnf::new();
    for c in clauses {
        cnf.add_clause(c.iter().copied().collect());
    }
    cnf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_gate_sat() {
        let mut s = SatAdapter::new();
        let a = s.new_variable();
        let b = s.new_variable();
        let out = s.new_variable();
        s.add_and_gate(out, a, b).unwrap();
        let res = s.solve(&[a, b]).unwrap();
        assert_eq!(res, SatResult::True);
        assert_eq!(s.value(out), Some(true));
    }

    #[test]
    fn test_and_gate_unsat_under_forced_output() {
        let mut s = SatAdapter::new();
        let a = s.new_variable();
        let b = s.new_variable();
        let out = s.new_variable();
        s.add_and_gate(out, a, b).unwrap();
        let res = s.solve(&[!a, out]).unwrap();
        assert_eq!(res, SatResult::False);
    }

    #[test]
    fn test_xor_gate() {
        let mut s = SatAdapter::new();
        let a = s.new_variable();
        let b = s.new_variable();
        let out = s.new_variable();
        s.add_xor_gate(out, a, b).unwrap();
        let res = s.solve(&[a, !b]).unwrap();
        assert_eq!(res, SatResult::True);
        assert_eq!(s.value(out), Some(true));
    }
}
