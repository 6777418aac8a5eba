//! Host-side state shared with the wasm instance.
//!
//! Lives inside the `wasmi::Store` and is reached from import closures via
//! `Caller::data_mut`. Holds the random source, the print sinks, the last
//! recorded fault, and the memory region's generation counter.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Seed of the default random source when none is configured.
///
/// High 64 fraction bits of sqrt(2); any fixed constant works, it only has
/// to be documented and stable so `randf` sequences are reproducible.
pub const DEFAULT_RANDOM_SEED: u64 = 0x6a09_e667_f3bc_c908;

/// Why a call out of the module trapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    Abort(i32),
    Exit(i32),
}

/// A caller-replaceable callback slot.
pub type RandomFn = Box<dyn FnMut() -> f64 + Send>;
pub type PrintIntFn = Box<dyn FnMut(i32) + Send>;
pub type PrintCharFn = Box<dyn FnMut(char) + Send>;

/// Per-store host state.
pub struct HostState {
    /// splitmix64 state for the default random source.
    rng: u64,
    random: Option<RandomFn>,
    print_int: PrintIntFn,
    print_char: PrintCharFn,
    fault: Option<Fault>,
    generation: Arc<AtomicU64>,
}

impl HostState {
    /// Next uniform sample in `[0, 1)`.
    ///
    /// splitmix64, mapped through the high 53 bits so every value is an
    /// exactly representable f64.
    pub(crate) fn next_random(&mut self) -> f64 {
        if let Some(random) = &mut self.random {
            return random();
        }
        self.rng = self.rng.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.rng;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    pub(crate) fn print_int(&mut self, value: i32) {
        (self.print_int)(value);
    }

    pub(crate) fn print_char(&mut self, c: char) {
        (self.print_char)(c);
    }

    pub(crate) fn record_fault(&mut self, fault: Fault) {
        self.fault = Some(fault);
    }

    pub(crate) fn take_fault(&mut self) -> Option<Fault> {
        self.fault.take()
    }

    pub(crate) fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Install the per-instantiation configuration.
    pub(crate) fn configure(
        &mut self,
        seed: u64,
        random: Option<RandomFn>,
        print_int: Option<PrintIntFn>,
        print_char: Option<PrintCharFn>,
        generation: Arc<AtomicU64>,
    ) {
        self.rng = seed;
        self.random = random;
        if let Some(print_int) = print_int {
            self.print_int = print_int;
        }
        if let Some(print_char) = print_char {
            self.print_char = print_char;
        }
        self.fault = None;
        self.generation = generation;
    }
}

impl Default for HostState {
    fn default() -> Self {
        Self {
            rng: DEFAULT_RANDOM_SEED,
            random: None,
            print_int: Box::new(|value| println!("{value}")),
            print_char: Box::new(|c| {
                let mut out = std::io::stdout();
                let _ = write!(out, "{c}");
            }),
            fault: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl std::fmt::Debug for HostState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostState")
            .field("rng", &self.rng)
            .field("random_overridden", &self.random.is_some())
            .field("fault", &self.fault)
            .field(
                "generation",
                &self.generation.load(Ordering::SeqCst),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_random_is_deterministic() {
        let mut a = HostState::default();
        let mut b = HostState::default();
        for _ in 0..16 {
            assert_eq!(a.next_random(), b.next_random());
        }
    }

    #[test]
    fn test_random_in_unit_interval() {
        let mut state = HostState::default();
        for _ in 0..1000 {
            let v = state.next_random();
            assert!((0.0..1.0).contains(&v), "sample {v} outside [0, 1)");
        }
    }

    #[test]
    fn test_override_replaces_default_source() {
        let mut state = HostState::default();
        state.configure(
            0,
            Some(Box::new(|| 0.25)),
            None,
            None,
            Arc::new(AtomicU64::new(0)),
        );
        assert_eq!(state.next_random(), 0.25);
        assert_eq!(state.next_random(), 0.25);
    }

    #[test]
    fn test_fault_is_taken_once() {
        let mut state = HostState::default();
        state.record_fault(Fault::Abort(7));
        assert_eq!(state.take_fault(), Some(Fault::Abort(7)));
        assert_eq!(state.take_fault(), None);
    }
}
