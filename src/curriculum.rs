//! Skill sequencing and adaptive difficulty.

use crate::mastery::MasteryTracker;

/// Prerequisite score a skill needs before its dependants unlock.
pub const UNLOCK_SCORE: f64 = 0.7;

/// Difficulty stepping rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyRules {
  pub step_up_after: usize,
  pub step_down_after: usize,
  pub min: u8,
  pub max: u8,
}

impl Default for DifficultyRules {
  fn default() -> Self {
    Self { step_up_after: 3, step_down_after: 2, min: 1, max: 5 }
  }
}

/// Prerequisite graph in declaration order.
#[derive(Clone, Debug)]
pub struct Curriculum {
  skills: Vec<(&'static str, &'static [&'static str])>,
  rules: DifficultyRules,
}

impl Default for Curriculum {
  fn default() -> Self {
    Self {
      skills: vec![
        ("6.2", &[]),
        ("6.4", &["6.2"]),
        ("6.7B", &["6.2"]),
        ("6.7D", &["6.7B"]),
        ("6.8B", &[]),
        ("6.9A", &["6.2", "6.7B"]),
        ("6.11", &[]),
      ],
      rules: DifficultyRules::default(),
    }
  }
}

impl Curriculum {
  pub fn skills(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.skills.iter().map(|(teks, _)| *teks)
  }

  pub fn prerequisites(&self, teks: &str) -> &'static [&'static str] {
    self.skills.iter().find(|(t, _)| *t == teks).map(|(_, deps)| *deps).unwrap_or(&[])
  }

  pub fn is_unlocked(&self, teks: &str, mastery: &MasteryTracker) -> bool {
    self.prerequisites(teks).iter().all(|p| mastery.score(p) >= UNLOCK_SCORE)
  }

  /// First unlocked skill that is not yet proficient, else the first unlocked one.
  pub fn next_skill(&self, mastery: &MasteryTracker) -> &'static str {
    let unlocked: Vec<&'static str> = self.sequence().into_iter().filter(|t| self.is_unlocked(t, mastery)).collect();
    unlocked
      .iter()
      .find(|t| mastery.score(t) < UNLOCK_SCORE)
      .or_else(|| unlocked.first())
      .copied()
      .unwrap_or("6.2")
  }

  /// Step up after a run of correct answers, down after a run of misses.
  pub fn next_difficulty(&self, current: u8, recent: &[bool]) -> u8 {
    let current = current.clamp(self.rules.min, self.rules.max);
    let Some(&last) = recent.last() else {
      return current;
    };
    let streak = recent.iter().rev().take_while(|r| **r == last).count();
    if last && streak >= self.rules.step_up_after {
      (current + 1).min(self.rules.max)
    } else if !last && streak >= self.rules.step_down_after {
      current.saturating_sub(1).max(self.rules.min)
    } else {
      current
    }
  }

  /// Topological order; ties keep declaration order.
  pub fn sequence(&self) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::with_capacity(self.skills.len());
    while out.len() < self.skills.len() {
      let ready = self
        .skills
        .iter()
        .find(|(t, deps)| !out.contains(t) && deps.iter().all(|d| out.contains(d)));
      match ready {
        Some((t, _)) => out.push(*t),
        None => {
          // cycle: append the rest as declared
          let rest: Vec<&'static str> = self.skills.iter().map(|(t, _)| *t).filter(|t| !out.contains(t)).collect();
          out.extend(rest);
        }
      }
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn tracker_with(scores: &[(&str, usize)]) -> MasteryTracker {
    let mut m = MasteryTracker::default();
    for (teks, correct) in scores {
      for _ in 0..*correct {
        m.update(teks, true, 2, Utc::now());
      }
    }
    m
  }

  #[test]
  fn sequence_respects_prerequisites() {
    let c = Curriculum::default();
    let seq = c.sequence();
    assert_eq!(seq.len(), 7);
    for (i, teks) in seq.iter().enumerate() {
      for dep in c.prerequisites(teks) {
        let pos = seq.iter().position(|t| t == dep).unwrap();
        assert!(pos < i, "{dep} must come before {teks}");
      }
    }
    assert_eq!(seq[0], "6.2");
  }

  #[test]
  fn unlocking_follows_prerequisite_scores() {
    let c = Curriculum::default();
    let fresh = MasteryTracker::default();
    assert!(c.is_unlocked("6.2", &fresh));
    assert!(c.is_unlocked("6.8B", &fresh));
    assert!(!c.is_unlocked("6.4", &fresh));
    assert_eq!(c.next_skill(&fresh), "6.2");

    // six straight correct answers put 6.2 above 0.7
    let m = tracker_with(&[("6.2", 6)]);
    assert!(m.score("6.2") >= UNLOCK_SCORE);
    assert!(c.is_unlocked("6.4", &m));
    assert!(!c.is_unlocked("6.9A", &m));
    assert_eq!(c.next_skill(&m), "6.4");
  }

  #[test]
  fn proficient_everywhere_returns_first_unlocked() {
    let c = Curriculum::default();
    let all: Vec<(&str, usize)> = c.skills().map(|t| (t, 8)).collect();
    let m = tracker_with(&all);
    assert_eq!(c.next_skill(&m), "6.2");
  }

  #[test]
  fn difficulty_steps() {
    let c = Curriculum::default();
    assert_eq!(c.next_difficulty(2, &[]), 2);
    assert_eq!(c.next_difficulty(2, &[true, true, true]), 3);
    assert_eq!(c.next_difficulty(2, &[false, true, true]), 2);
    assert_eq!(c.next_difficulty(2, &[true, false, false]), 1);
    assert_eq!(c.next_difficulty(1, &[false, false]), 1);
    assert_eq!(c.next_difficulty(5, &[true, true, true, true]), 5);
    assert_eq!(c.next_difficulty(9, &[false]), 5);
  }
}
