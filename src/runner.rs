//! The fuzz-until-broken run loop.

use arbitrary::Unstructured;
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::error::Error;
use crate::generate::{self, ESCAPED_RATIO};
use crate::oracle::{Oracle, Verdict};

/// Repeatedly generates shortcode instances and checks them against the
/// external parser, halting on the first non-[`Verdict::Match`].
///
/// The runner owns the run's only entropy source: a seeded [`StdRng`] that
/// refills a fixed-size byte buffer before every iteration. All generator
/// draws for an iteration come from an [`Unstructured`] over that buffer,
/// so a single seed reproduces an entire run.
pub struct Runner {
    oracle: Oracle,
    rng: StdRng,
    buf: Vec<u8>,
}

impl Runner {
    /// `entropy` is the per-iteration buffer size in bytes; it bounds how
    /// deep a single instance can grow.
    pub fn new(oracle: Oracle, seed: Option<u64>, entropy: usize) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            oracle,
            rng,
            buf: vec![0; entropy],
        }
    }

    /// Generates and checks one instance. The escaped-delimiter variant is
    /// drawn first from the fresh buffer, one in ten.
    pub fn step(&mut self) -> Result<Verdict, Error> {
        self.rng.fill_bytes(&mut self.buf);
        let mut u = Unstructured::new(&self.buf);
        let escaped = u.ratio(ESCAPED_RATIO.0, ESCAPED_RATIO.1)?;
        let case = generate::shortcode(&mut u, escaped)?;
        self.oracle.check(&case)
    }

    /// Runs until the first mismatch or process failure and returns it.
    ///
    /// `on_match` is invoked once per passing instance as a liveness
    /// signal. There is no success-terminal state: absent a failure the
    /// loop runs until the process is externally terminated.
    pub fn run(&mut self, mut on_match: impl FnMut()) -> Result<Verdict, Error> {
        loop {
            match self.step()? {
                Verdict::Match => on_match(),
                halted @ (Verdict::Mismatch { .. } | Verdict::ProcessFailure { .. }) => {
                    return Ok(halted)
                }
            }
        }
    }
}
