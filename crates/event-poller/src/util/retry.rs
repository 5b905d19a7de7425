use core::time::Duration;

/// Delays growing geometrically by `factor` at each step.
#[derive(Copy, Clone, Debug)]
pub struct ExponentialGrowth {
    delay: Duration,
    factor: u32,
}

impl ExponentialGrowth {
    pub const fn new(delay: Duration, factor: u32) -> Self {
        Self { delay, factor }
    }

    pub const fn clamp(self, max_delay: Duration) -> Clamped<Self> {
        Clamped::new(self, max_delay)
    }
}

impl Iterator for ExponentialGrowth {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.delay;
        self.delay = self.delay.saturating_mul(self.factor);
        Some(delay)
    }
}

/// Caps every delay of the inner strategy at `max_delay`.
#[derive(Copy, Clone, Debug)]
pub struct Clamped<S> {
    pub strategy: S,
    pub max_delay: Duration,
}

impl<S> Clamped<S> {
    pub const fn new(strategy: S, max_delay: Duration) -> Self {
        Self {
            strategy,
            max_delay,
        }
    }
}

impl<S> Iterator for Clamped<S>
where
    S: Iterator<Item = Duration>,
{
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        self.strategy
            .next()
            .map(|delay| delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXP_STRATEGY: ExponentialGrowth = ExponentialGrowth::new(Duration::from_millis(500), 2);

    #[test]
    fn exp_growth_no_clamp() {
        let delays = EXP_STRATEGY.take(6).collect::<Vec<_>>();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000),
                Duration::from_millis(8000),
                Duration::from_millis(16000),
            ]
        );
    }

    #[test]
    fn clamped_exp_growth_max_delay() {
        let delays = EXP_STRATEGY
            .clamp(Duration::from_secs(3))
            .take(6)
            .collect::<Vec<_>>();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(3000),
                Duration::from_millis(3000),
                Duration::from_millis(3000),
            ]
        );
    }

    #[test]
    fn exp_growth_saturates() {
        let mut strategy = ExponentialGrowth::new(Duration::MAX, 2);

        assert_eq!(strategy.next(), Some(Duration::MAX));
        assert_eq!(strategy.next(), Some(Duration::MAX));
    }
}
