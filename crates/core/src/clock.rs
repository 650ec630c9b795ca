use chrono::NaiveDate;

/// Source of "today" for the pipelines. Everything else they do is a pure
/// function of the input rows.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Always returns the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_stable() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let clock = FixedClock(d);
        assert_eq!(clock.today(), d);
        assert_eq!(clock.today(), clock.today());
    }
}
