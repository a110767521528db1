use std::sync::OnceLock;

/// A value computed on first access and cached afterwards.
pub struct Memoized<T, F = fn() -> T> {
    value: OnceLock<T>,
    compute: F,
}

impl<T, F: Fn() -> T> Memoized<T, F> {
    pub const fn new(compute: F) -> Self {
        Self {
            value: OnceLock::new(),
            compute,
        }
    }

    pub fn get(&self) -> &T {
        self.value.get_or_init(|| (self.compute)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn computes_at_most_once() {
        let calls = AtomicUsize::new(0);
        let memoized = Memoized::new(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            42
        });

        assert_eq!(*memoized.get(), 42);
        assert_eq!(*memoized.get(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn works_in_statics() {
        fn answer() -> u32 {
            42
        }
        static ANSWER: Memoized<u32> = Memoized::new(answer as fn() -> u32);
        assert_eq!(*ANSWER.get(), 42);
    }
}
