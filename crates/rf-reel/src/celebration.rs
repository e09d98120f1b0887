//! End-of-session celebration overlay

/// Host particle/confetti effect
pub trait Celebration: Send {
    fn start(&mut self);

    fn stop(&mut self);
}

/// Deferred constructor for a [`Celebration`]
pub type CelebrationFactory = Box<dyn FnOnce() -> Box<dyn Celebration> + Send>;

/// Celebration built on first start and reused afterwards
///
/// `start` and `stop` are idempotent; each returns whether it changed
/// anything.
#[derive(Default)]
pub struct LazyCelebration {
    factory: Option<CelebrationFactory>,
    instance: Option<Box<dyn Celebration>>,
    running: bool,
}

impl LazyCelebration {
    pub fn new(factory: CelebrationFactory) -> Self {
        Self {
            factory: Some(factory),
            instance: None,
            running: false,
        }
    }

    /// No effect configured; `start` does nothing
    pub fn none() -> Self {
        Self::default()
    }

    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        if self.instance.is_none() {
            match self.factory.take() {
                Some(factory) => {
                    log::debug!("Constructing celebration overlay");
                    self.instance = Some(factory());
                }
                None => return false,
            }
        }
        match self.instance.as_mut() {
            Some(instance) => {
                instance.start();
                self.running = true;
                true
            }
            None => false,
        }
    }

    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        if let Some(instance) = self.instance.as_mut() {
            instance.stop();
        }
        self.running = false;
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_constructed(&self) -> bool {
        self.instance.is_some()
    }
}

impl std::fmt::Debug for LazyCelebration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyCelebration")
            .field("constructed", &self.is_constructed())
            .field("running", &self.running)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        starts: Arc<AtomicUsize>,
    }

    impl Celebration for Counting {
        fn start(&mut self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn stop(&mut self) {}
    }

    fn counting() -> (LazyCelebration, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let built = Arc::new(AtomicUsize::new(0));
        let starts = Arc::new(AtomicUsize::new(0));
        let (b, s) = (built.clone(), starts.clone());
        let lazy = LazyCelebration::new(Box::new(move || {
            b.fetch_add(1, Ordering::SeqCst);
            Box::new(Counting { starts: s }) as Box<dyn Celebration>
        }));
        (lazy, built, starts)
    }

    #[test]
    fn test_constructed_lazily_once() {
        let (mut lazy, built, starts) = counting();
        assert!(!lazy.is_constructed());

        assert!(lazy.start());
        assert!(!lazy.start());
        assert!(lazy.stop());
        assert!(lazy.start());

        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(starts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stop_without_start() {
        let (mut lazy, built, _) = counting();
        assert!(!lazy.stop());
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_none_never_runs() {
        let mut lazy = LazyCelebration::none();
        assert!(!lazy.start());
        assert!(!lazy.is_running());
    }
}
