/// Per-read k-mer hit counts produced by the upstream counting stage.
///
/// Vectors are indexed by panel position. Entries past the end of a vector
/// read as zero, so a short vector never causes an out-of-bounds access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadHits {
    /// Contaminant k-mers found in this read
    pub kmers_loaded: u32,

    /// Raw hit count per contaminant
    pub kmers_from_contaminant: Vec<u32>,

    /// Hits attributable to exactly one contaminant, per contaminant
    pub unique_kmers_from_contaminant: Vec<u32>,

    /// Number of contaminants with at least one raw hit
    pub contaminants_detected: u32,
}

impl ReadHits {
    /// Build hit counts, deriving `contaminants_detected` from the raw hits
    pub fn new(kmers_loaded: u32, hits: Vec<u32>, unique_hits: Vec<u32>) -> Self {
        let contaminants_detected = hits.iter().filter(|&&h| h > 0).count() as u32;
        Self {
            kmers_loaded,
            kmers_from_contaminant: hits,
            unique_kmers_from_contaminant: unique_hits,
            contaminants_detected,
        }
    }

    /// Hits where the per-read total is simply the sum of raw hits
    pub fn from_hits(hits: Vec<u32>, unique_hits: Vec<u32>) -> Self {
        let loaded = hits.iter().sum();
        Self::new(loaded, hits, unique_hits)
    }

    /// A read with no contaminant k-mers
    pub fn empty(n_contaminants: usize) -> Self {
        Self::new(0, vec![0; n_contaminants], vec![0; n_contaminants])
    }

    /// Raw hits for a contaminant
    #[inline]
    pub fn hits(&self, contaminant: usize) -> u32 {
        self.kmers_from_contaminant
            .get(contaminant)
            .copied()
            .unwrap_or(0)
    }

    /// Unique hits for a contaminant
    #[inline]
    pub fn unique_hits(&self, contaminant: usize) -> u32 {
        self.unique_kmers_from_contaminant
            .get(contaminant)
            .copied()
            .unwrap_or(0)
    }
}
