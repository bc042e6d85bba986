//! In-process dense simplex with branch-and-bound for boolean variables.
//!
//! A two-phase primal simplex over a dense tableau, with Bland's rule for
//! cycling-free pivoting and a depth-first branch-and-bound layer on top for
//! 0/1 variables. Deliberately dependency-free: the rest of the workspace
//! can be tested against a real optimizer without an external solver
//! installed. Pipeline models are small (tens of variables), so the dense
//! tableau is not a limitation in practice.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::backend::{
    ConstraintId, LpBackend, LpStatus, ModelStore, Sense, VarId,
};

const EPS: f64 = 1e-9;
const FEAS_EPS: f64 = 1e-6;
const INT_EPS: f64 = 1e-6;
/// Stand-in for an infinite lower bound; models here always use finite ones.
const BIG_BOUND: f64 = 1e12;
const MAX_BNB_NODES: usize = 10_000;

/// The in-process back-end, registered as `"simplex"`.
#[derive(Debug, Default)]
pub struct SimplexBackend {
    store: ModelStore,
    solution: Vec<f64>,
}

impl SimplexBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LpBackend for SimplexBackend {
    fn id(&self) -> &str {
        "simplex"
    }

    fn make_num_var(&mut self, lo: f64, hi: f64, name: &str) -> VarId {
        self.store.add_var(lo, hi, name, false)
    }

    fn make_bool_var(&mut self, name: &str) -> VarId {
        self.store.add_var(0.0, 1.0, name, true)
    }

    fn make_constraint(&mut self, lo: f64, hi: f64, name: &str) -> ConstraintId {
        self.store.add_row(lo, hi, name)
    }

    fn set_coefficient(&mut self, constraint: ConstraintId, var: VarId, coeff: f64) {
        self.store.rows[constraint.index()]
            .coeffs
            .insert(var.index(), coeff);
    }

    fn objective_set_coefficient(&mut self, var: VarId, coeff: f64) {
        self.store.objective.insert(var.index(), coeff);
    }

    fn objective_minimize(&mut self) {
        self.store.sense = Sense::Minimize;
    }

    fn objective_maximize(&mut self) {
        self.store.sense = Sense::Maximize;
    }

    fn set_time_limit(&mut self, millis: u64) {
        self.store.time_limit_ms = Some(millis);
    }

    fn solve(&mut self) -> LpStatus {
        let deadline = self
            .store
            .time_limit_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));

        // Internal cost vector is always minimized
        let n = self.store.vars.len();
        let mut cost = vec![0.0; n];
        for (&j, &c) in &self.store.objective {
            cost[j] = match self.store.sense {
                Sense::Minimize => c,
                Sense::Maximize => -c,
            };
        }

        let lo: Vec<f64> = self.store.vars.iter().map(|v| v.lo).collect();
        let hi: Vec<f64> = self.store.vars.iter().map(|v| v.hi).collect();
        let bools = self.store.bool_indices();

        if bools.is_empty() {
            let out = solve_lp(&self.store, &cost, &lo, &hi, deadline);
            if matches!(out.status, LpStatus::Optimal | LpStatus::Feasible) {
                self.solution = out.x;
            }
            return out.status;
        }

        // Branch and bound, depth first, best solution kept as incumbent.
        let mut best: Option<(f64, Vec<f64>)> = None;
        let mut timed_out = false;
        let mut nodes = 0usize;
        let mut stack = vec![(lo, hi)];

        while let Some((node_lo, node_hi)) = stack.pop() {
            if let Some(d) = deadline {
                if Instant::now() >= d {
                    timed_out = true;
                    break;
                }
            }
            nodes += 1;
            if nodes > MAX_BNB_NODES {
                timed_out = true;
                break;
            }

            let out = solve_lp(&self.store, &cost, &node_lo, &node_hi, deadline);
            match out.status {
                LpStatus::Infeasible | LpStatus::Error => continue,
                LpStatus::Unbounded => {
                    // An unbounded root relaxation makes the integer model
                    // unbounded too; deeper nodes only tighten bounds
                    if nodes == 1 {
                        return LpStatus::Unbounded;
                    }
                    continue;
                }
                LpStatus::Optimal | LpStatus::Feasible => {}
            }

            if let Some((incumbent, _)) = &best {
                if out.objective >= incumbent - 1e-9 {
                    continue; // Bound: cannot improve
                }
            }

            // Most fractional boolean branches next
            let mut branch: Option<(usize, f64)> = None;
            for &j in &bools {
                let frac = (out.x[j] - out.x[j].round()).abs();
                if frac > INT_EPS && branch.map(|(_, f)| frac > f).unwrap_or(true) {
                    branch = Some((j, frac));
                }
            }

            match branch {
                None => {
                    debug!(objective = out.objective, nodes, "new incumbent");
                    best = Some((out.objective, out.x));
                }
                Some((j, _)) => {
                    let preferred = out.x[j].round().clamp(0.0, 1.0);
                    for &fix in &[1.0 - preferred, preferred] {
                        let mut clo = node_lo.clone();
                        let mut chi = node_hi.clone();
                        clo[j] = fix;
                        chi[j] = fix;
                        // Pushed last is popped first, so the preferred
                        // rounding is explored first
                        stack.push((clo, chi));
                    }
                }
            }
        }

        match best {
            Some((_, x)) => {
                self.solution = x;
                if timed_out {
                    LpStatus::Feasible
                } else {
                    LpStatus::Optimal
                }
            }
            None if timed_out => LpStatus::Error,
            None => LpStatus::Infeasible,
        }
    }

    fn value(&self, var: VarId) -> f64 {
        self.solution.get(var.index()).copied().unwrap_or(0.0)
    }
}

/// Result of one LP relaxation solve.
struct LpOutcome {
    status: LpStatus,
    x: Vec<f64>,
    /// Internal (minimization) objective value
    objective: f64,
}

impl LpOutcome {
    fn status_only(status: LpStatus) -> Self {
        Self {
            status,
            x: Vec::new(),
            objective: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Le,
    Ge,
    Eq,
}

/// One normalized standard-form row over the shifted variables.
struct StdRow {
    coeffs: Vec<(usize, f64)>,
    rhs: f64,
    kind: RowKind,
}

/// Solve `min cost·x` over the given bounds and the rows in `store`.
///
/// Variables are shifted to their lower bounds so the tableau works over
/// non-negative shifted variables; finite upper bounds become explicit rows.
fn solve_lp(
    store: &ModelStore,
    cost: &[f64],
    lo: &[f64],
    hi: &[f64],
    deadline: Option<Instant>,
) -> LpOutcome {
    let n = store.vars.len();
    let shift: Vec<f64> = lo
        .iter()
        .map(|&l| if l.is_finite() { l } else { -BIG_BOUND })
        .collect();

    // Crossed bounds (from branching fixes) mean an immediately empty box
    for j in 0..n {
        if hi[j] < shift[j] - EPS {
            return LpOutcome::status_only(LpStatus::Infeasible);
        }
    }

    let mut rows: Vec<StdRow> = Vec::new();
    for row in &store.rows {
        let offset: f64 = row
            .coeffs
            .iter()
            .map(|(&j, &c)| c * shift[j])
            .sum();
        let coeffs: Vec<(usize, f64)> = row
            .coeffs
            .iter()
            .filter(|(_, &c)| c.abs() > 0.0)
            .map(|(&j, &c)| (j, c))
            .collect();
        let lo_b = row.lo - offset;
        let hi_b = row.hi - offset;
        if row.lo.is_finite() && row.hi.is_finite() && (row.hi - row.lo).abs() <= 1e-9 {
            rows.push(StdRow {
                coeffs,
                rhs: lo_b,
                kind: RowKind::Eq,
            });
            continue;
        }
        if row.hi.is_finite() {
            rows.push(StdRow {
                coeffs: coeffs.clone(),
                rhs: hi_b,
                kind: RowKind::Le,
            });
        }
        if row.lo.is_finite() {
            rows.push(StdRow {
                coeffs,
                rhs: lo_b,
                kind: RowKind::Ge,
            });
        }
    }

    // Finite upper bounds become x'_j <= hi_j - lo_j
    for j in 0..n {
        if hi[j].is_finite() {
            rows.push(StdRow {
                coeffs: vec![(j, 1.0)],
                rhs: hi[j] - shift[j],
                kind: RowKind::Le,
            });
        }
    }

    // Normalize every right-hand side to be non-negative
    for row in &mut rows {
        if row.rhs < 0.0 {
            row.rhs = -row.rhs;
            for (_, c) in &mut row.coeffs {
                *c = -*c;
            }
            row.kind = match row.kind {
                RowKind::Le => RowKind::Ge,
                RowKind::Ge => RowKind::Le,
                RowKind::Eq => RowKind::Eq,
            };
        }
    }

    let m = rows.len();

    // Column layout: structural | slack/surplus | artificials | rhs
    let mut ncols = n;
    let mut slack_col = vec![usize::MAX; m];
    let mut artificial_col = vec![usize::MAX; m];
    for (r, row) in rows.iter().enumerate() {
        match row.kind {
            RowKind::Le => {
                slack_col[r] = ncols;
                ncols += 1;
            }
            RowKind::Ge => {
                slack_col[r] = ncols;
                ncols += 1;
                artificial_col[r] = ncols;
                ncols += 1;
            }
            RowKind::Eq => {
                artificial_col[r] = ncols;
                ncols += 1;
            }
        }
    }
    let first_artificial = n;
    let is_artificial =
        |col: usize| col >= first_artificial && artificial_col.contains(&col);

    let rhs_col = ncols;
    let mut tableau = vec![vec![0.0; ncols + 1]; m];
    let mut basis = vec![0usize; m];
    for (r, row) in rows.iter().enumerate() {
        for &(j, c) in &row.coeffs {
            tableau[r][j] += c;
        }
        tableau[r][rhs_col] = row.rhs;
        match row.kind {
            RowKind::Le => {
                tableau[r][slack_col[r]] = 1.0;
                basis[r] = slack_col[r];
            }
            RowKind::Ge => {
                tableau[r][slack_col[r]] = -1.0;
                tableau[r][artificial_col[r]] = 1.0;
                basis[r] = artificial_col[r];
            }
            RowKind::Eq => {
                tableau[r][artificial_col[r]] = 1.0;
                basis[r] = artificial_col[r];
            }
        }
    }

    let max_iters = 20_000 + 50 * (m + ncols);

    // --- Phase 1: drive artificials to zero ---
    let mut phase1_cost = vec![0.0; ncols];
    for r in 0..m {
        if artificial_col[r] != usize::MAX {
            phase1_cost[artificial_col[r]] = 1.0;
        }
    }
    let mut obj = build_objective_row(&phase1_cost, &tableau, &basis, rhs_col);
    match run_simplex(
        &mut tableau,
        &mut basis,
        &mut obj,
        rhs_col,
        &|_| false,
        max_iters,
        deadline,
    ) {
        SimplexEnd::Optimal => {}
        SimplexEnd::Unbounded => {
            // Phase 1 objective is bounded below by zero; this is numeric
            return LpOutcome::status_only(LpStatus::Error);
        }
        SimplexEnd::Interrupted => return LpOutcome::status_only(LpStatus::Error),
    }
    if -obj[rhs_col] > FEAS_EPS {
        return LpOutcome::status_only(LpStatus::Infeasible);
    }

    // Pivot remaining basic artificials out where possible
    for r in 0..m {
        if !is_artificial(basis[r]) {
            continue;
        }
        if let Some(j) = (0..first_artificial).find(|&j| tableau[r][j].abs() > 1e-7) {
            pivot_in_place(&mut tableau, &mut obj, &mut basis, r, j, rhs_col);
        }
        // Otherwise the row is redundant; its artificial stays basic at zero
    }

    // --- Phase 2: the real objective ---
    let mut phase2_cost = vec![0.0; ncols];
    phase2_cost[..n].copy_from_slice(&cost[..n]);
    let mut obj = build_objective_row(&phase2_cost, &tableau, &basis, rhs_col);
    let banned = |col: usize| is_artificial(col);
    let end = run_simplex(
        &mut tableau,
        &mut basis,
        &mut obj,
        rhs_col,
        &banned,
        max_iters,
        deadline,
    );

    let mut x = shift;
    for r in 0..m {
        if basis[r] < n {
            x[basis[r]] += tableau[r][rhs_col];
        }
    }
    let objective: f64 = (0..n).map(|j| cost[j] * x[j]).sum();

    let status = match end {
        SimplexEnd::Optimal => LpStatus::Optimal,
        SimplexEnd::Unbounded => return LpOutcome::status_only(LpStatus::Unbounded),
        // The basis stays primal-feasible after phase 1, so an interrupted
        // phase 2 still carries a usable point
        SimplexEnd::Interrupted => LpStatus::Feasible,
    };

    LpOutcome {
        status,
        x,
        objective,
    }
}

/// Reduced-cost row for the given cost vector and current basis.
fn build_objective_row(
    cost: &[f64],
    tableau: &[Vec<f64>],
    basis: &[usize],
    rhs_col: usize,
) -> Vec<f64> {
    let mut obj = vec![0.0; rhs_col + 1];
    obj[..rhs_col].copy_from_slice(cost);
    for (r, &b) in basis.iter().enumerate() {
        let cb = cost[b];
        if cb != 0.0 {
            for j in 0..=rhs_col {
                obj[j] -= cb * tableau[r][j];
            }
        }
    }
    obj
}

enum SimplexEnd {
    Optimal,
    Unbounded,
    Interrupted,
}

/// Primal simplex iterations with Bland's rule; `banned` columns never enter.
fn run_simplex(
    tableau: &mut [Vec<f64>],
    basis: &mut [usize],
    obj: &mut [f64],
    rhs_col: usize,
    banned: &dyn Fn(usize) -> bool,
    max_iters: usize,
    deadline: Option<Instant>,
) -> SimplexEnd {
    for iter in 0..max_iters {
        if iter % 64 == 0 {
            if let Some(d) = deadline {
                if Instant::now() >= d {
                    return SimplexEnd::Interrupted;
                }
            }
        }

        // Bland: smallest improving column index
        let entering = (0..rhs_col).find(|&j| !banned(j) && obj[j] < -EPS);
        let entering = match entering {
            Some(j) => j,
            None => return SimplexEnd::Optimal,
        };

        // Ratio test; ties resolved toward the smallest basis index (Bland)
        let mut leaving: Option<(usize, f64)> = None;
        for (r, row) in tableau.iter().enumerate() {
            let a = row[entering];
            if a > EPS {
                let ratio = row[rhs_col] / a;
                let better = match leaving {
                    None => true,
                    Some((lr, lratio)) => {
                        ratio < lratio - EPS
                            || (ratio < lratio + EPS && basis[r] < basis[lr])
                    }
                };
                if better {
                    leaving = Some((r, ratio));
                }
            }
        }
        let (pivot_row, _) = match leaving {
            Some(p) => p,
            None => return SimplexEnd::Unbounded,
        };

        pivot_in_place(tableau, obj, basis, pivot_row, entering, rhs_col);
    }
    SimplexEnd::Interrupted
}

fn pivot_in_place(
    tableau: &mut [Vec<f64>],
    obj: &mut [f64],
    basis: &mut [usize],
    row: usize,
    col: usize,
    rhs_col: usize,
) {
    let pivot = tableau[row][col];
    for value in tableau[row].iter_mut() {
        *value /= pivot;
    }
    let pivot_row = tableau[row].clone();
    for (r, tableau_row) in tableau.iter_mut().enumerate() {
        if r == row {
            continue;
        }
        let factor = tableau_row[col];
        if factor.abs() > 0.0 {
            for (target, &source) in tableau_row.iter_mut().zip(pivot_row.iter()) {
                *target -= factor * source;
            }
        }
    }
    let factor = obj[col];
    if factor.abs() > 0.0 {
        for j in 0..=rhs_col {
            obj[j] -= factor * pivot_row[j];
        }
    }
    basis[row] = col;
}
