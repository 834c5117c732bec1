//! Per-skill mastery tracking with an exponentially weighted moving average.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Outcomes kept per skill for difficulty stepping.
const RECENT_WINDOW: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MasteryParams {
  /// EWMA smoothing factor.
  pub alpha: f64,
  pub threshold: f64,
  /// Attempts required before a skill can count as mastered.
  pub min_items: u32,
}

impl Default for MasteryParams {
  fn default() -> Self {
    Self { alpha: 0.2, threshold: 0.83, min_items: 15 }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
  NotStarted,
  Mastered,
  Developing,
  Beginning,
  Struggling,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MasteryRecord {
  pub teks: String,
  pub score: f64,
  pub attempts: u32,
  pub last_seen_at: DateTime<Utc>,
  pub due_review_at: Option<DateTime<Utc>>,
  pub last_difficulty: u8,
  pub recent: VecDeque<bool>,
}

/// Result of recording one attempt.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MasteryUpdate {
  pub teks: String,
  pub score: f64,
  pub attempts: u32,
  pub mastery_delta: f64,
  pub is_mastered: bool,
  pub level: MasteryLevel,
  pub due_review_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default)]
pub struct MasteryTracker {
  params: MasteryParams,
  records: BTreeMap<String, MasteryRecord>,
}

impl MasteryTracker {
  pub fn new(params: MasteryParams) -> Self {
    Self { params, records: BTreeMap::new() }
  }

  pub fn params(&self) -> &MasteryParams { &self.params }

  /// Fold one graded attempt into the skill's score.
  pub fn update(&mut self, teks: &str, correct: bool, difficulty: u8, now: DateTime<Utc>) -> MasteryUpdate {
    let MasteryParams { alpha, threshold, min_items } = self.params;
    let record = self.records.entry(teks.to_string()).or_insert_with(|| MasteryRecord {
      teks: teks.to_string(),
      score: 0.0,
      attempts: 0,
      last_seen_at: now,
      due_review_at: None,
      last_difficulty: difficulty,
      recent: VecDeque::with_capacity(RECENT_WINDOW),
    });

    let previous = record.score;
    let observation = if correct { 1.0 } else { 0.0 };
    record.score = alpha * observation + (1.0 - alpha) * previous;
    record.attempts += 1;
    record.last_seen_at = now;
    record.last_difficulty = difficulty;
    record.recent.push_back(correct);
    while record.recent.len() > RECENT_WINDOW {
      record.recent.pop_front();
    }

    let is_mastered = record.score >= threshold && record.attempts >= min_items;
    record.due_review_at = if is_mastered { None } else { Some(now + Duration::days(1)) };

    MasteryUpdate {
      teks: teks.to_string(),
      score: record.score,
      attempts: record.attempts,
      mastery_delta: record.score - previous,
      is_mastered,
      level: level_for(record, &self.params),
      due_review_at: record.due_review_at,
    }
  }

  pub fn get(&self, teks: &str) -> Option<&MasteryRecord> { self.records.get(teks) }

  pub fn all(&self) -> impl Iterator<Item = &MasteryRecord> { self.records.values() }

  /// Current score, `0.0` for skills never attempted.
  pub fn score(&self, teks: &str) -> f64 {
    self.records.get(teks).map(|r| r.score).unwrap_or(0.0)
  }

  pub fn level(&self, teks: &str) -> MasteryLevel {
    match self.records.get(teks) {
      Some(record) => level_for(record, &self.params),
      None => MasteryLevel::NotStarted,
    }
  }

  pub fn recent(&self, teks: &str) -> Vec<bool> {
    self.records.get(teks).map(|r| r.recent.iter().copied().collect()).unwrap_or_default()
  }

  /// Skills whose review date has passed.
  pub fn due_for_review(&self, now: DateTime<Utc>) -> Vec<String> {
    self
      .records
      .values()
      .filter(|r| r.due_review_at.is_some_and(|due| due <= now))
      .map(|r| r.teks.clone())
      .collect()
  }

  pub fn reset(&mut self, teks: &str) -> bool {
    self.records.remove(teks).is_some()
  }
}

fn level_for(record: &MasteryRecord, params: &MasteryParams) -> MasteryLevel {
  if record.score >= params.threshold && record.attempts >= params.min_items {
    MasteryLevel::Mastered
  } else if record.score >= 0.6 {
    MasteryLevel::Developing
  } else if record.score >= 0.3 {
    MasteryLevel::Beginning
  } else {
    MasteryLevel::Struggling
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use proptest::prelude::*;

  fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap()
  }

  #[test]
  fn ewma_moves_toward_observations() {
    let mut m = MasteryTracker::default();
    let first = m.update("6.2", true, 2, t0());
    assert!((first.score - 0.2).abs() < 1e-12);
    assert!((first.mastery_delta - 0.2).abs() < 1e-12);
    assert_eq!(first.due_review_at, Some(t0() + Duration::days(1)));
    let second = m.update("6.2", false, 2, t0());
    assert!((second.score - 0.16).abs() < 1e-12);
    assert!((second.mastery_delta + 0.04).abs() < 1e-12);
    assert_eq!(m.level("6.2"), MasteryLevel::Struggling);
    assert_eq!(m.level("6.4"), MasteryLevel::NotStarted);
  }

  #[test]
  fn mastery_needs_score_and_volume() {
    let mut m = MasteryTracker::default();
    let mut last = None;
    for _ in 0..14 {
      last = Some(m.update("6.8B", true, 3, t0()));
    }
    let update = last.unwrap();
    assert!(update.score >= 0.83);
    assert!(!update.is_mastered, "only 14 attempts");
    assert_eq!(m.level("6.8B"), MasteryLevel::Developing);

    let update = m.update("6.8B", true, 3, t0());
    assert!(update.is_mastered);
    assert_eq!(update.level, MasteryLevel::Mastered);
    assert_eq!(update.due_review_at, None);
    assert!(m.due_for_review(t0() + Duration::days(2)).is_empty());
  }

  #[test]
  fn recent_window_is_bounded() {
    let mut m = MasteryTracker::default();
    for i in 0..25 {
      m.update("6.4", i % 2 == 0, 2, t0());
    }
    assert_eq!(m.recent("6.4").len(), RECENT_WINDOW);
    assert_eq!(m.get("6.4").unwrap().attempts, 25);
    assert_eq!(m.due_for_review(t0() + Duration::days(1)), vec!["6.4".to_string()]);
    assert!(m.reset("6.4"));
    assert_eq!(m.score("6.4"), 0.0);
  }

  proptest! {
    #[test]
    fn delta_is_new_minus_old(outcomes in proptest::collection::vec(any::<bool>(), 1..40)) {
      let mut m = MasteryTracker::default();
      for correct in outcomes {
        let before = m.score("6.9A");
        let update = m.update("6.9A", correct, 2, t0());
        prop_assert!((update.mastery_delta - (update.score - before)).abs() < 1e-12);
        prop_assert!((0.0..=1.0).contains(&update.score));
      }
    }
  }
}
