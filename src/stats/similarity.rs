use serde::Serialize;

use crate::core::panel::Panel;
use crate::stats::derived::percent;
use crate::store::{KmerItem, KmerStore};

/// K-mer co-occurrence between panel members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarityMatrix {
    /// N rows of N counts; `shared[i][j]` is the k-mers in both i and j
    shared: Vec<Vec<u64>>,
    /// K-mers belonging to exactly one contaminant
    unique: Vec<u64>,
}

impl SimilarityMatrix {
    fn new(n: usize) -> Self {
        Self {
            shared: vec![vec![0; n]; n],
            unique: vec![0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.unique.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unique.is_empty()
    }

    /// K-mers shared by `i` and `j`; the diagonal is every k-mer of `i`
    pub fn shared(&self, i: usize, j: usize) -> u64 {
        self.shared[i][j]
    }

    /// `shared(i, j)` as a percentage of the reference total of row `i`
    pub fn shared_pc(&self, panel: &Panel, i: usize, j: usize) -> f64 {
        percent(self.shared(i, j), panel.reference_kmers(i))
    }

    pub fn unique(&self, i: usize) -> u64 {
        self.unique[i]
    }

    pub fn unique_pc(&self, panel: &Panel, i: usize) -> f64 {
        percent(self.unique(i), panel.reference_kmers(i))
    }

    fn bump(&mut self, i: usize, j: usize) {
        self.shared[i][j] += 1;
    }
}

/// Single pass over the k-mer store building the similarity matrix.
///
/// Run it once, after counting has finished. The store is only borrowed
/// immutably, so it cannot change while the traversal is in progress.
pub struct SimilarityAnalyzer<'a> {
    panel: &'a Panel,
}

impl<'a> SimilarityAnalyzer<'a> {
    pub fn new(panel: &'a Panel) -> Self {
        Self { panel }
    }

    pub fn analyze<S: KmerStore>(&self, store: &S) -> SimilarityMatrix {
        let n = self.panel.len();
        let mut matrix = SimilarityMatrix::new(n);
        let mut members = Vec::with_capacity(n);

        store.visit(|item| {
            members.clear();
            members.extend((0..n).filter(|&i| item.has_membership(i)));

            for (k, &i) in members.iter().enumerate() {
                for &j in &members[k..] {
                    matrix.bump(i, j);
                    if i != j {
                        matrix.bump(j, i);
                    }
                }
            }

            if let [only] = members.as_slice() {
                matrix.unique[*only] += 1;
            }
        });

        matrix
    }
}
