//! Logical-time job schedule.
//!
//! Jobs repeat with a fixed period. Time is an offset from an arbitrary
//! origin, advanced explicitly by the owner: the server maps it onto a tokio
//! `Instant`, tests just call [`Schedule::advance_to`].

use std::time::Duration;

use crate::error::{EcoPulseError, Result};

#[derive(Debug, Clone)]
struct Entry<J> {
    job: J,
    period: Duration,
    next_due: Duration,
}

#[derive(Debug, Clone)]
pub struct Schedule<J> {
    entries: Vec<Entry<J>>,
    now: Duration,
}

impl<J> Default for Schedule<J> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            now: Duration::ZERO,
        }
    }
}

impl<J: Clone> Schedule<J> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repeat `job` every `period`, first firing one period from now.
    pub fn every(&mut self, job: J, period: Duration) -> Result<()> {
        self.every_from(job, period, self.now + period)
    }

    /// Repeat `job` every `period`, first firing immediately.
    pub fn every_immediate(&mut self, job: J, period: Duration) -> Result<()> {
        self.every_from(job, period, self.now)
    }

    fn every_from(&mut self, job: J, period: Duration, first: Duration) -> Result<()> {
        if period.is_zero() {
            return Err(EcoPulseError::BadConfig("schedule period must be non-zero".into()));
        }
        self.entries.push(Entry {
            job,
            period,
            next_due: first,
        });
        Ok(())
    }

    /// Current logical time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Offset of the earliest pending firing.
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.next_due).min()
    }

    /// Number of registered jobs.
    pub fn job_count(&self) -> usize {
        self.entries.len()
    }

    /// Move logical time to `now` and return every firing due up to and
    /// including it, oldest first. Ties fire in registration order; missed
    /// periods are all replayed. Time never moves backwards.
    pub fn advance_to(&mut self, now: Duration) -> Vec<J> {
        self.now = self.now.max(now);
        let mut fired = Vec::new();
        loop {
            let mut earliest: Option<usize> = None;
            for (i, e) in self.entries.iter().enumerate() {
                if e.next_due > self.now {
                    continue;
                }
                match earliest {
                    Some(j) if self.entries[j].next_due <= e.next_due => {}
                    _ => earliest = Some(i),
                }
            }
            let Some(i) = earliest else { break };
            let entry = &mut self.entries[i];
            fired.push(entry.job.clone());
            entry.next_due += entry.period;
        }
        fired
    }

    pub fn advance_by(&mut self, by: Duration) -> Vec<J> {
        let target = self.now + by;
        self.advance_to(target)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Job {
        Tick,
        Co2,
        Weather,
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn page_schedule() -> Schedule<Job> {
        let mut s = Schedule::new();
        s.every(Job::Tick, secs(7)).unwrap();
        s.every_immediate(Job::Co2, secs(300)).unwrap();
        s.every_immediate(Job::Weather, secs(600)).unwrap();
        s
    }

    #[test]
    fn immediate_jobs_fire_at_origin() {
        let mut s = page_schedule();
        assert_eq!(s.next_due(), Some(Duration::ZERO));
        assert_eq!(s.advance_to(Duration::ZERO), vec![Job::Co2, Job::Weather]);
        assert_eq!(s.next_due(), Some(secs(7)));
    }

    #[test]
    fn ticks_fire_every_period() {
        let mut s = page_schedule();
        s.advance_to(Duration::ZERO);
        let fired = s.advance_by(secs(70));
        assert_eq!(fired.iter().filter(|j| **j == Job::Tick).count(), 10);
        assert!(!fired.contains(&Job::Co2));
    }

    #[test]
    fn long_period_jobs_interleave_chronologically() {
        let mut s = page_schedule();
        let fired = s.advance_to(secs(600));
        let ticks = fired.iter().filter(|j| **j == Job::Tick).count();
        assert_eq!(ticks, 85);
        assert_eq!(fired.iter().filter(|j| **j == Job::Co2).count(), 3);
        assert_eq!(fired.iter().filter(|j| **j == Job::Weather).count(), 2);

        // the 5 minute poll lands between tick 42 (294s) and tick 43 (301s)
        let pos = fired.iter().enumerate().filter(|(_, j)| **j == Job::Co2).nth(1).unwrap().0;
        let ticks_before = fired[..pos].iter().filter(|j| **j == Job::Tick).count();
        assert_eq!(ticks_before, 42);
    }

    #[test]
    fn time_does_not_go_backwards() {
        let mut s = page_schedule();
        s.advance_to(secs(20));
        assert!(s.advance_to(secs(5)).is_empty());
        assert_eq!(s.now(), secs(20));
    }

    #[test]
    fn zero_period_is_rejected() {
        let mut s: Schedule<Job> = Schedule::new();
        let err = s.every(Job::Tick, Duration::ZERO).unwrap_err();
        assert_eq!(err.code().as_str(), "BAD_CONFIG");
        assert_eq!(s.job_count(), 0);
    }
}
