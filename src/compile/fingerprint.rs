use xxhash_rust::xxh3::Xxh3;

use crate::compile::graph::FilterGraph;

const XXH3_SEED: u64 = 0x3c6e_f372_fe94_f82b;

/// Stable identity of a compiled [`FilterGraph`].
///
/// Two graphs share a fingerprint exactly when they would produce the same ffmpeg invocation
/// (same inputs, same filter program, same output mapping).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GraphFingerprint {
    /// High 64 bits of the XXH3-128 digest.
    pub hi: u64,
    /// Low 64 bits of the XXH3-128 digest.
    pub lo: u64,
}

impl std::fmt::Display for GraphFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

pub(crate) fn fingerprint_graph(graph: &FilterGraph) -> GraphFingerprint {
    let mut h = StableHasher::new();
    h.write_u64(graph.inputs.len() as u64);
    for p in &graph.inputs {
        h.write_str_bytes(p.as_os_str().as_encoded_bytes());
    }
    h.write_str_bytes(graph.to_filter_complex().as_bytes());
    h.write_str_bytes(graph.output_map().as_bytes());
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_u64(&mut self, v: u64) {
        self.inner.update(&v.to_le_bytes());
    }

    // Length-prefixed so that adjacent fields cannot alias.
    fn write_str_bytes(&mut self, b: &[u8]) {
        self.write_u64(b.len() as u64);
        self.inner.update(b);
    }

    fn finish(self) -> GraphFingerprint {
        let v = self.inner.digest128();
        GraphFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}
