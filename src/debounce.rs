use std::time::Duration;

/// A cancellable deferred value. Each `schedule` replaces the pending value and
/// re-arms the deadline; `poll` hands the value out once the quiet window has
/// elapsed. Time is supplied by the caller as a monotonic timestamp.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Duration)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Schedule `value`, discarding any pending one.
    pub fn schedule(&mut self, value: T, now: Duration) {
        self.pending = Some((value, now + self.window));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// The pending value, if its deadline has passed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        if self.deadline().is_some_and(|deadline| now >= deadline) {
            self.cancel()
        } else {
            None
        }
    }

    /// The pending value regardless of the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_after_window() {
        let mut d = Debouncer::new(ms(300));
        d.schedule("a", ms(0));
        assert_eq!(d.poll(ms(299)), None);
        assert_eq!(d.poll(ms(300)), Some("a"));
        assert_eq!(d.poll(ms(301)), None);
    }

    #[test]
    fn test_new_value_cancels_and_rearms() {
        let mut d = Debouncer::new(ms(300));
        d.schedule("a", ms(0));
        d.schedule("b", ms(200));
        assert_eq!(d.poll(ms(300)), None);
        assert_eq!(d.deadline(), Some(ms(500)));
        assert_eq!(d.poll(ms(500)), Some("b"));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_cancel_and_flush() {
        let mut d = Debouncer::new(ms(300));
        d.schedule(1, ms(0));
        assert_eq!(d.cancel(), Some(1));
        assert_eq!(d.poll(ms(1000)), None);

        d.schedule(2, ms(0));
        assert_eq!(d.flush(), Some(2));
    }
}
