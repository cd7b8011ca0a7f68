/// Fixed-width group of u64 samples emitted and consumed as one unit.
///
/// A well-formed vector is homogeneous: every element equals the first. The
/// elements stand in for I/Q payload words, so only their integer identity
/// matters to the probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqVector {
    elements: Vec<u64>,
}

impl SeqVector {
    /// Builds a vector with `vlen` copies of `value`.
    pub fn broadcast(value: u64, vlen: usize) -> Self {
        assert!(vlen > 0, "vector length must be > 0");
        Self {
            elements: vec![value; vlen],
        }
    }

    /// Wraps already-decoded elements (wire path and tests).
    pub fn from_elements(elements: Vec<u64>) -> Self {
        assert!(!elements.is_empty(), "vector length must be > 0");
        Self { elements }
    }

    /// Number of elements.
    pub fn vlen(&self) -> usize {
        self.elements.len()
    }

    /// Raw element view.
    pub fn elements(&self) -> &[u64] {
        &self.elements
    }

    /// First element — the scalar fed to the continuity comparator.
    pub fn reference(&self) -> u64 {
        self.elements[0]
    }

    /// Audits internal homogeneity against the first element.
    ///
    /// A mismatch is a corruption event: reported, never fatal, and the
    /// reference element still participates in continuity tracking.
    pub fn audit(&self) -> CorruptionReport {
        let reference = self.reference();
        let mismatched = self
            .elements
            .iter()
            .filter(|element| **element != reference)
            .count();
        CorruptionReport {
            reference,
            consistent: self.elements.len() - mismatched,
            mismatched,
        }
    }
}

/// Outcome of a homogeneity audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorruptionReport {
    /// The vector's first element.
    pub reference: u64,
    /// Elements equal to the reference (the reference itself included).
    pub consistent: usize,
    /// Elements that differ from the reference.
    pub mismatched: usize,
}

impl CorruptionReport {
    /// True when every element matched the reference.
    pub fn is_clean(&self) -> bool {
        self.mismatched == 0
    }
}
