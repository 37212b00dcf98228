use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

/// Metrics the persistence layer reports after every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    /// Cumulative operation latency in microseconds
    OperationLatency,
    ReadCount,
    WriteCount,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetricName::OperationLatency => "operation_latency_us",
            MetricName::ReadCount => "read_count",
            MetricName::WriteCount => "write_count",
        })
    }
}

/// Destination for operation metrics.
pub trait MetricsSink: Send + Sync {
    fn add_to_counter(&self, name: MetricName, amount: u64);
}

/// Process-wide operation statistics
///
/// Thread-safe counters for every metric in [`MetricName`].
/// Uses atomic counters for lock-free updates.
#[derive(Debug, Default)]
pub struct Statistics {
    pub operation_latency_micros: AtomicU64,
    pub num_reads: AtomicU64,
    pub num_writes: AtomicU64,
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    fn counter(&self, name: MetricName) -> &AtomicU64 {
        match name {
            MetricName::OperationLatency => &self.operation_latency_micros,
            MetricName::ReadCount => &self.num_reads,
            MetricName::WriteCount => &self.num_writes,
        }
    }

    pub fn get(&self, name: MetricName) -> u64 {
        self.counter(name).load(Ordering::Relaxed)
    }

    pub fn num_reads(&self) -> u64 {
        self.num_reads.load(Ordering::Relaxed)
    }

    pub fn num_writes(&self) -> u64 {
        self.num_writes.load(Ordering::Relaxed)
    }

    pub fn operation_latency_micros(&self) -> u64 {
        self.operation_latency_micros.load(Ordering::Relaxed)
    }

    pub fn avg_latency_ms(&self) -> f64 {
        let ops = (self.num_reads() + self.num_writes()) as f64;
        if ops > 0.0 {
            self.operation_latency_micros() as f64 / ops / 1000.0
        } else {
            0.0
        }
    }

    /// Reset all statistics to zero
    pub fn reset(&self) {
        self.operation_latency_micros.store(0, Ordering::Relaxed);
        self.num_reads.store(0, Ordering::Relaxed);
        self.num_writes.store(0, Ordering::Relaxed);
    }

    /// Get a formatted statistics report
    pub fn report(&self) -> String {
        format!(
            "Persistence Statistics:\n\
            \n\
            Operations:\n\
            - Reads:         {}\n\
            - Writes:        {}\n\
            - Total latency: {} us\n\
            - Avg latency:   {:.3} ms",
            self.num_reads(),
            self.num_writes(),
            self.operation_latency_micros(),
            self.avg_latency_ms(),
        )
    }
}

impl MetricsSink for Statistics {
    #[inline]
    fn add_to_counter(&self, name: MetricName, amount: u64) {
        self.counter(name).fetch_add(amount, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Read,
    Write,
}

/// Scoped timer around one operation.
///
/// Dropping the timer reports the elapsed time and the operation count,
/// so metrics are emitted on every exit path, including early `?` returns.
pub struct OperationTimer<'a> {
    sink: &'a dyn MetricsSink,
    kind: OperationKind,
    units: u64,
    started: Instant,
}

impl<'a> OperationTimer<'a> {
    pub fn start(sink: &'a dyn MetricsSink, kind: OperationKind) -> Self {
        OperationTimer {
            sink,
            kind,
            units: 1,
            started: Instant::now(),
        }
    }

    /// Count this operation as `units` reads or writes (at least one).
    pub fn set_units(&mut self, units: usize) {
        self.units = (units as u64).max(1);
    }
}

impl Drop for OperationTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed().as_micros() as u64;
        self.sink
            .add_to_counter(MetricName::OperationLatency, elapsed);
        let count = match self.kind {
            OperationKind::Read => MetricName::ReadCount,
            OperationKind::Write => MetricName::WriteCount,
        };
        self.sink.add_to_counter(count, self.units);
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;

    #[test]
    fn test_statistics_basic() {
        let stats = Statistics::new();

        stats.add_to_counter(MetricName::WriteCount, 2);
        stats.add_to_counter(MetricName::ReadCount, 1);
        stats.add_to_counter(MetricName::OperationLatency, 3000);

        assert_eq!(stats.num_writes(), 2);
        assert_eq!(stats.num_reads(), 1);
        assert_eq!(stats.get(MetricName::OperationLatency), 3000);
        assert_eq!(stats.avg_latency_ms(), 1.0);
    }

    #[test]
    fn test_timer_reports_on_drop() {
        let stats = Statistics::new();
        {
            let _timer = OperationTimer::start(&stats, OperationKind::Read);
            thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(stats.num_reads(), 1);
        assert_eq!(stats.num_writes(), 0);
        assert!(stats.operation_latency_micros() >= 2000);
    }

    #[test]
    fn test_timer_reports_on_early_return() {
        fn failing(stats: &Statistics) -> Result<(), String> {
            let mut timer = OperationTimer::start(stats, OperationKind::Write);
            timer.set_units(3);
            "not a number".parse::<u32>().map_err(|e| e.to_string())?;
            Ok(())
        }

        let stats = Statistics::new();
        assert!(failing(&stats).is_err());
        assert_eq!(stats.num_writes(), 3);
    }

    #[test]
    fn test_units_never_zero() {
        let stats = Statistics::new();
        {
            let mut timer = OperationTimer::start(&stats, OperationKind::Write);
            timer.set_units(0);
        }
        assert_eq!(stats.num_writes(), 1);
    }

    #[test]
    fn test_statistics_reset_and_report() {
        let stats = Statistics::new();
        stats.add_to_counter(MetricName::ReadCount, 5);
        assert!(stats.report().contains("Reads:         5"));

        stats.reset();
        assert_eq!(stats.num_reads(), 0);
        assert!(stats.report().contains("Avg latency:   0.000 ms"));
    }
}
