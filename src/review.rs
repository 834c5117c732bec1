//! Spaced review scheduling.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Review intervals in days, shortest first.
pub const INTERVALS: [i64; 5] = [1, 3, 7, 21, 60];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReviewItem {
  pub teks: String,
  pub item_id: String,
  pub due_at: DateTime<Utc>,
  /// 1 = high, 2 = medium, 3 = low.
  pub priority: u8,
}

#[derive(Clone, Debug, Default)]
pub struct ReviewScheduler {
  items: Vec<ReviewItem>,
}

/// `(interval days, priority)` for a mastery score.
pub fn interval_for(score: f64) -> (i64, u8) {
  if score >= 0.9 {
    (INTERVALS[4], 3)
  } else if score >= 0.7 {
    (INTERVALS[3], 2)
  } else if score >= 0.5 {
    (INTERVALS[2], 2)
  } else {
    (INTERVALS[0], 1)
  }
}

impl ReviewScheduler {
  pub fn new() -> Self { Self::default() }

  /// Queue `item_id` for review; an existing entry for the same item is replaced.
  pub fn schedule(&mut self, teks: &str, item_id: &str, score: f64, last_reviewed: DateTime<Utc>) -> ReviewItem {
    let (days, priority) = interval_for(score);
    let entry = ReviewItem {
      teks: teks.to_string(),
      item_id: item_id.to_string(),
      due_at: last_reviewed + Duration::days(days),
      priority,
    };
    self.items.retain(|r| r.item_id != item_id);
    self.items.push(entry.clone());
    entry
  }

  /// Entries due at `now`, highest priority first, then earliest due.
  pub fn due(&self, now: DateTime<Utc>, limit: usize) -> Vec<ReviewItem> {
    let mut due: Vec<ReviewItem> = self.items.iter().filter(|r| r.due_at <= now).cloned().collect();
    due.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.due_at.cmp(&b.due_at)));
    due.truncate(limit);
    due
  }

  pub fn for_skill(&self, teks: &str) -> Vec<ReviewItem> {
    self.items.iter().filter(|r| r.teks == teks).cloned().collect()
  }

  /// Remove the entry for `item_id`, returning it.
  pub fn mark_reviewed(&mut self, item_id: &str) -> Option<ReviewItem> {
    let pos = self.items.iter().position(|r| r.item_id == item_id)?;
    Some(self.items.remove(pos))
  }

  pub fn schedule_by_skill(&self) -> BTreeMap<String, Vec<ReviewItem>> {
    let mut out: BTreeMap<String, Vec<ReviewItem>> = BTreeMap::new();
    for r in &self.items {
      out.entry(r.teks.clone()).or_default().push(r.clone());
    }
    out
  }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap()
  }

  #[test]
  fn intervals_follow_score_bands() {
    assert_eq!(interval_for(0.95), (60, 3));
    assert_eq!(interval_for(0.7), (21, 2));
    assert_eq!(interval_for(0.5), (7, 2));
    assert_eq!(interval_for(0.1), (1, 1));
  }

  #[test]
  fn due_reviews_sorted_by_priority() {
    let mut s = ReviewScheduler::new();
    s.schedule("6.2", "a", 0.75, t0());
    s.schedule("6.4", "b", 0.2, t0());
    s.schedule("6.8B", "c", 0.95, t0());
    assert!(s.due(t0(), 10).is_empty());

    let due = s.due(t0() + Duration::days(30), 10);
    let ids: Vec<&str> = due.iter().map(|r| r.item_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(s.due(t0() + Duration::days(90), 1).len(), 1);
  }

  #[test]
  fn mark_reviewed_removes_entry() {
    let mut s = ReviewScheduler::new();
    s.schedule("6.2", "a", 0.2, t0());
    s.schedule("6.2", "b", 0.2, t0());
    s.schedule("6.2", "a", 0.6, t0());
    assert_eq!(s.len(), 2);
    assert_eq!(s.schedule_by_skill()["6.2"].len(), 2);
    assert_eq!(s.mark_reviewed("a").map(|r| r.priority), Some(2));
    assert!(s.mark_reviewed("a").is_none());
    assert_eq!(s.for_skill("6.2").len(), 1);
  }
}
