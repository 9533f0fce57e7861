//! Global pairwise alignment (Gotoh) that also counts co-optimal paths.
//!
//! Gaps cost `open_gap_score` for the first position and
//! `extend_gap_score` for every further position. End gaps are scored the
//! same as internal gaps. Alongside the optimal score, every DP cell carries
//! the number of distinct paths reaching it with that score, so callers can
//! tell a unique optimum from a tie.

use crate::error::AlignError;
use crate::matrix::{aa_index, SubstitutionMatrix};

const NEG_INF: i32 = i32::MIN / 4;

/// One edit operation of a traceback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignOp {
    /// Target residue aligned to query residue
    Pair,
    /// Target residue aligned to a gap
    Delete,
    /// Query residue aligned to a gap
    Insert,
}

/// Traceback of a uniquely optimal alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traceback {
    /// Segment end points as `(target_pos, query_pos)`, starting at `(0, 0)`.
    /// An ungapped alignment of two length-`n` sequences is `[(0, 0), (n, n)]`.
    pub path: Vec<(usize, usize)>,
    pub ops: Vec<AlignOp>,
    /// Target with `-` at inserted positions
    pub target: Vec<u8>,
    /// Query with `-` at deleted positions
    pub query: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub score: i32,
    /// Number of distinct optimal alignments (saturating).
    pub count: u64,
    /// Present only when `count == 1`.
    pub traceback: Option<Traceback>,
}

impl Alignment {
    pub fn is_unique(&self) -> bool {
        self.count == 1
    }

    /// True for a unique alignment that is a single diagonal over `len`
    /// residues of both sequences.
    pub fn is_linear(&self, len: usize) -> bool {
        match &self.traceback {
            Some(tb) if self.is_unique() => tb.path == [(0, 0), (len, len)],
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    score: i32,
    count: u64,
}

impl Cell {
    const NONE: Cell = Cell { score: NEG_INF, count: 0 };

    fn reachable(&self) -> bool {
        self.count > 0
    }

    fn shifted(self, delta: i32) -> Cell {
        if self.reachable() {
            Cell { score: self.score + delta, count: self.count }
        } else {
            Cell::NONE
        }
    }
}

/// Best score over the reachable candidates, with their counts summed.
fn combine(candidates: [Cell; 3]) -> Cell {
    let mut best = Cell::NONE;
    for c in candidates.into_iter().filter(Cell::reachable) {
        if !best.reachable() || c.score > best.score {
            best = c;
        } else if c.score == best.score {
            best.count = best.count.saturating_add(c.count);
        }
    }
    best
}

#[derive(Debug, Clone, Copy)]
pub struct PairwiseAligner {
    pub matrix: SubstitutionMatrix,
    pub open_gap_score: i32,
    pub extend_gap_score: i32,
}

impl Default for PairwiseAligner {
    fn default() -> Self {
        Self {
            matrix: SubstitutionMatrix::blosum62(),
            open_gap_score: -2,
            extend_gap_score: 0,
        }
    }
}

impl PairwiseAligner {
    pub fn new(matrix: SubstitutionMatrix, open_gap_score: i32, extend_gap_score: i32) -> Self {
        Self { matrix, open_gap_score, extend_gap_score }
    }

    fn encode(&self, seq: &[u8]) -> Result<Vec<usize>, AlignError> {
        if seq.is_empty() {
            return Err(AlignError::EmptySequence);
        }
        seq.iter()
            .enumerate()
            .map(|(offset, &residue)| {
                aa_index(residue).ok_or(AlignError::UnknownResidue {
                    residue: residue as char,
                    offset,
                    matrix: self.matrix.name(),
                })
            })
            .collect()
    }

    /// Globally align `query` against `target`.
    pub fn align(&self, target: &[u8], query: &[u8]) -> Result<Alignment, AlignError> {
        let t = self.encode(target)?;
        let q = self.encode(query)?;
        let (n, m) = (t.len(), q.len());
        let width = m + 1;
        let idx = |i: usize, j: usize| i * width + j;

        // pair / delete / insert states
        let mut mm = vec![Cell::NONE; (n + 1) * width];
        let mut dd = vec![Cell::NONE; (n + 1) * width];
        let mut ii = vec![Cell::NONE; (n + 1) * width];
        mm[idx(0, 0)] = Cell { score: 0, count: 1 };

        let open = self.open_gap_score;
        let extend = self.extend_gap_score;

        for i in 0..=n {
            for j in 0..=m {
                if i == 0 && j == 0 {
                    continue;
                }
                if i > 0 && j > 0 {
                    let k = idx(i - 1, j - 1);
                    let s = self.matrix.score_index(t[i - 1], q[j - 1]);
                    mm[idx(i, j)] = combine([mm[k], dd[k], ii[k]]).shifted(s);
                }
                if i > 0 {
                    let k = idx(i - 1, j);
                    dd[idx(i, j)] = combine([
                        mm[k].shifted(open),
                        ii[k].shifted(open),
                        dd[k].shifted(extend),
                    ]);
                }
                if j > 0 {
                    let k = idx(i, j - 1);
                    ii[idx(i, j)] = combine([
                        mm[k].shifted(open),
                        dd[k].shifted(open),
                        ii[k].shifted(extend),
                    ]);
                }
            }
        }

        let end = idx(n, m);
        let best = combine([mm[end], dd[end], ii[end]]);

        let traceback = if best.count == 1 {
            let start_state = if mm[end].reachable() && mm[end].score == best.score {
                AlignOp::Pair
            } else if dd[end].reachable() && dd[end].score == best.score {
                AlignOp::Delete
            } else {
                AlignOp::Insert
            };
            Some(self.trace(&t, &q, &mm, &dd, &ii, start_state, target, query))
        } else {
            None
        };

        Ok(Alignment { score: best.score, count: best.count, traceback })
    }

    #[allow(clippy::too_many_arguments)]
    fn trace(
        &self,
        t: &[usize],
        q: &[usize],
        mm: &[Cell],
        dd: &[Cell],
        ii: &[Cell],
        mut state: AlignOp,
        target: &[u8],
        query: &[u8],
    ) -> Traceback {
        let width = q.len() + 1;
        let idx = |i: usize, j: usize| i * width + j;
        let open = self.open_gap_score;
        let extend = self.extend_gap_score;

        let pick = |cands: [(AlignOp, Cell, i32); 3], target_score: i32| -> AlignOp {
            cands
                .into_iter()
                .find(|(_, c, delta)| c.reachable() && c.score + delta == target_score)
                .map(|(op, _, _)| op)
                .unwrap_or(AlignOp::Pair)
        };

        let (mut i, mut j) = (t.len(), q.len());
        let mut ops = Vec::with_capacity(i.max(j));
        while i > 0 || j > 0 {
            ops.push(state);
            match state {
                AlignOp::Pair => {
                    let here = mm[idx(i, j)].score;
                    let s = self.matrix.score_index(t[i - 1], q[j - 1]);
                    let k = idx(i - 1, j - 1);
                    state = pick(
                        [
                            (AlignOp::Pair, mm[k], s),
                            (AlignOp::Delete, dd[k], s),
                            (AlignOp::Insert, ii[k], s),
                        ],
                        here,
                    );
                    i -= 1;
                    j -= 1;
                }
                AlignOp::Delete => {
                    let here = dd[idx(i, j)].score;
                    let k = idx(i - 1, j);
                    state = pick(
                        [
                            (AlignOp::Pair, mm[k], open),
                            (AlignOp::Insert, ii[k], open),
                            (AlignOp::Delete, dd[k], extend),
                        ],
                        here,
                    );
                    i -= 1;
                }
                AlignOp::Insert => {
                    let here = ii[idx(i, j)].score;
                    let k = idx(i, j - 1);
                    state = pick(
                        [
                            (AlignOp::Pair, mm[k], open),
                            (AlignOp::Delete, dd[k], open),
                            (AlignOp::Insert, ii[k], extend),
                        ],
                        here,
                    );
                    j -= 1;
                }
            }
        }
        ops.reverse();

        let mut path = vec![(0, 0)];
        let mut aligned_target = Vec::with_capacity(ops.len());
        let mut aligned_query = Vec::with_capacity(ops.len());
        let (mut ti, mut qj) = (0usize, 0usize);
        let mut previous: Option<AlignOp> = None;
        for &op in &ops {
            if previous.is_some_and(|p| p != op) {
                path.push((ti, qj));
            }
            match op {
                AlignOp::Pair => {
                    aligned_target.push(target[ti]);
                    aligned_query.push(query[qj]);
                    ti += 1;
                    qj += 1;
                }
                AlignOp::Delete => {
                    aligned_target.push(target[ti]);
                    aligned_query.push(b'-');
                    ti += 1;
                }
                AlignOp::Insert => {
                    aligned_target.push(b'-');
                    aligned_query.push(query[qj]);
                    qj += 1;
                }
            }
            previous = Some(op);
        }
        path.push((ti, qj));

        Traceback { path, ops, target: aligned_target, query: aligned_query }
    }
}
