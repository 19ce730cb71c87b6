use std::sync::atomic::{AtomicU64, Ordering};

/// An `f64` stored as its bit pattern in an `AtomicU64`.
#[derive(Debug, Default)]
pub(crate) struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub(crate) fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Adds `delta` with a compare-and-swap loop so concurrent adds are never lost.
    pub(crate) fn add(&self, delta: f64) {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self.bits.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AtomicF64;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_adds_are_not_lost() {
        let value = Arc::new(AtomicF64::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let value = value.clone();
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        value.add(0.5);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(value.get(), 4_000.0);
    }
}
