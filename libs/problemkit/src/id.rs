//! Correlation identifier generation.

/// Default length of generated correlation identifiers.
pub const DEFAULT_ID_LEN: usize = 8;

/// Source of fresh correlation identifiers. Each call returns a new token.
pub trait IdGenerator: Send + Sync {
    fn new_short_id(&self) -> String;
}

/// URL-safe random identifiers backed by `nanoid`.
#[derive(Debug, Clone, Copy)]
pub struct NanoIdGenerator {
    len: usize,
}

impl NanoIdGenerator {
    /// Identifiers of `len` characters; zero is bumped to one.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { len: len.max(1) }
    }
}

impl Default for NanoIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LEN)
    }
}

impl IdGenerator for NanoIdGenerator {
    fn new_short_id(&self) -> String {
        nanoid::format(nanoid::rngs::default, &nanoid::alphabet::SAFE, self.len)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn ids_have_requested_length_and_differ() {
        let ids = NanoIdGenerator::new(12);
        let a = ids.new_short_id();
        let b = ids.new_short_id();
        assert_eq!(a.len(), 12);
        assert_ne!(a, b);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        );
    }

    #[test]
    fn zero_length_is_bumped() {
        assert_eq!(NanoIdGenerator::new(0).new_short_id().len(), 1);
    }
}
