//! Progress and statistics for a running session

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::models::Grade;

/// Per-session grading counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyStats {
    pub correct: usize,
    pub medium: usize,
    pub difficult: usize,
    pub total: usize,
}

impl StudyStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, grade: Grade) {
        match grade {
            Grade::Easy => self.correct += 1,
            Grade::Medium => self.medium += 1,
            Grade::Difficult => self.difficult += 1,
        }
    }

    /// Number of cards graded so far
    pub fn reviewed(&self) -> usize {
        self.correct + self.medium + self.difficult
    }

    /// Percentage of graded cards that were recalled (easy or medium)
    pub fn success_rate(&self) -> u32 {
        let reviewed = self.reviewed();
        if reviewed == 0 {
            return 0;
        }
        (((self.correct + self.medium) as f64 / reviewed as f64) * 100.0).round() as u32
    }
}

/// "3/10" style position label
pub fn progress_label(current_index: usize, total: usize) -> String {
    format!("{}/{}", (current_index + 1).min(total), total)
}

/// Cards left to grade
pub fn remaining(current_index: usize, total: usize) -> usize {
    total.saturating_sub(current_index)
}

/// Wall-clock budget for a session. Informational only.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    started_at: DateTime<Utc>,
    budget: Duration,
}

impl SessionClock {
    pub fn start(budget_minutes: u32) -> Self {
        Self::starting_at(Utc::now(), budget_minutes)
    }

    pub fn starting_at(started_at: DateTime<Utc>, budget_minutes: u32) -> Self {
        Self {
            started_at,
            budget: Duration::minutes(budget_minutes as i64),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }

    /// Whether the planned duration has passed (never true for a zero budget)
    pub fn is_over_budget(&self, now: DateTime<Utc>) -> bool {
        self.budget > Duration::zero() && self.elapsed(now) >= self.budget
    }
}

/// Format a duration as "m:ss"
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_label() {
        assert_eq!(progress_label(0, 5), "1/5");
        assert_eq!(progress_label(4, 5), "5/5");
        // Completed sessions stay on the last card
        assert_eq!(progress_label(5, 5), "5/5");
        assert_eq!(progress_label(0, 0), "0/0");
    }

    #[test]
    fn test_remaining() {
        assert_eq!(remaining(0, 5), 5);
        assert_eq!(remaining(3, 5), 2);
        assert_eq!(remaining(5, 5), 0);
        assert_eq!(remaining(7, 5), 0);
    }

    #[test]
    fn test_record_and_rate() {
        let mut stats = StudyStats::new(4);
        assert_eq!(stats.success_rate(), 0);

        stats.record(Grade::Easy);
        stats.record(Grade::Medium);
        stats.record(Grade::Difficult);

        assert_eq!(stats.correct, 1);
        assert_eq!(stats.medium, 1);
        assert_eq!(stats.difficult, 1);
        assert_eq!(stats.reviewed(), 3);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.success_rate(), 67);
    }

    #[test]
    fn test_session_clock() {
        let start = Utc::now();
        let clock = SessionClock::starting_at(start, 10);
        assert!(!clock.is_over_budget(start + Duration::minutes(9)));
        assert!(clock.is_over_budget(start + Duration::minutes(10)));
        assert_eq!(clock.elapsed(start - Duration::minutes(1)), Duration::zero());

        let unlimited = SessionClock::starting_at(start, 0);
        assert!(!unlimited.is_over_budget(start + Duration::hours(5)));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::seconds(0)), "0:00");
        assert_eq!(format_elapsed(Duration::seconds(75)), "1:15");
        assert_eq!(format_elapsed(Duration::minutes(12)), "12:00");
    }
}
