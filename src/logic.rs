//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Serving practice items (curriculum-driven or by template)
//!   - Grading attempts and folding them into mastery and review state
//!   - Hints, progress and review queries

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::domain::Item;
use crate::error::GenerationError;
use crate::grader::{grade_item, Submission};
use crate::protocol::{
    to_out, AttemptOut, CurriculumNextOut, HintOut, ItemOut, ProgressOut, SkillProgressOut,
};
use crate::review::ReviewItem;
use crate::state::AppState;

/// Default number of due reviews returned.
pub const DEFAULT_REVIEW_LIMIT: usize = 10;

fn random_seed() -> u64 {
  rand::random::<u32>() as u64
}

/// Item for `teks`, or for the curriculum's next skill when none is given.
#[instrument(level = "info", skip(state), fields(teks = ?teks, seed = ?seed))]
pub async fn next_item(state: &AppState, teks: Option<&str>, seed: Option<u64>) -> ItemOut {
  let teks = match teks {
    Some(t) if !t.trim().is_empty() => t.trim().to_string(),
    _ => {
      let mastery = state.mastery.read().await;
      state.curriculum.next_skill(&mastery).to_string()
    }
  };
  let seed = seed.unwrap_or_else(random_seed);
  let (item, origin) = state.choose_item(&teks, seed).await;
  info!(target: "item", %teks, id = %item.id, %origin, "Item served");
  to_out(&item)
}

#[instrument(level = "info", skip(state), fields(%template_id, seed = ?seed))]
pub async fn item_by_template(state: &AppState, template_id: &str, seed: Option<u64>) -> Result<ItemOut, GenerationError> {
  let seed = seed.unwrap_or_else(random_seed);
  let item = state.item_for_template(template_id, seed).await?;
  Ok(to_out(&item))
}

/// Grade a response, update mastery and requeue the item for review.
/// `None` when the item id was never issued.
#[instrument(level = "info", skip(state, response), fields(%item_id))]
pub async fn submit_attempt(state: &AppState, item_id: &str, response: &Submission) -> Option<AttemptOut> {
  let item: Item = state.get_item(item_id).await?;
  let grade = grade_item(&item, response, state.config.grading.plot_tolerance);
  let now = Utc::now();

  let (update, recent) = {
    let mut mastery = state.mastery.write().await;
    let update = mastery.update(&item.teks, grade.correct, item.difficulty, now);
    (update, mastery.recent(&item.teks))
  };
  let next_difficulty = state.curriculum.next_difficulty(item.difficulty, &recent);

  {
    let mut reviews = state.reviews.write().await;
    reviews.mark_reviewed(&item.id);
    reviews.schedule(&item.teks, &item.id, update.score, now);
  }

  info!(
    target: "grading",
    id = %item.id,
    teks = %item.teks,
    correct = grade.correct,
    feedback = ?grade.feedback_code,
    score = %format!("{:.3}", update.score),
    "Attempt graded"
  );

  Some(AttemptOut {
    item_id: item.id.clone(),
    correct: grade.correct,
    canonical: grade.canonical,
    feedback_code: grade.feedback_code,
    explanation: item.explanation.clone(),
    mastery: update,
    next_difficulty,
  })
}

/// Hint `index` of an issued item; indexes past the end return the last hint.
#[instrument(level = "info", skip(state), fields(%item_id, index = ?index))]
pub async fn get_hint(state: &AppState, item_id: &str, index: Option<usize>) -> Option<HintOut> {
  let item = state.get_item(item_id).await?;
  let total = item.hints.len();
  let index = index.unwrap_or(0).min(total.checked_sub(1)?);
  debug!(target: "teks_tutor", %item_id, index, total, "Hint served");
  Some(HintOut { item_id: item.id.clone(), index, total, text: item.hints[index].clone() })
}

/// Every curriculum skill with its current standing.
#[instrument(level = "info", skip(state))]
pub async fn progress(state: &AppState) -> ProgressOut {
  let mastery = state.mastery.read().await;
  let sequence = state.curriculum.sequence();
  let row = |teks: &str| {
    let record = mastery.get(teks);
    SkillProgressOut {
      teks: teks.to_string(),
      score: mastery.score(teks),
      attempts: record.map(|r| r.attempts).unwrap_or(0),
      level: mastery.level(teks),
      unlocked: state.curriculum.is_unlocked(teks, &mastery),
      due_review_at: record.and_then(|r| r.due_review_at),
    }
  };
  let mut skills: Vec<SkillProgressOut> = sequence.iter().map(|teks| row(teks)).collect();
  // practised skills outside the curriculum graph come last
  skills.extend(
    mastery
      .all()
      .filter(|r| !sequence.iter().any(|t| *t == r.teks))
      .map(|r| row(&r.teks)),
  );
  ProgressOut { skills }
}

#[instrument(level = "info", skip(state))]
pub async fn recommend_next(state: &AppState) -> CurriculumNextOut {
  let teks = {
    let mastery = state.mastery.read().await;
    state.curriculum.next_skill(&mastery)
  };
  let difficulty = state.target_difficulty(teks).await;
  CurriculumNextOut {
    teks: teks.to_string(),
    difficulty,
    sequence: state.curriculum.sequence().into_iter().map(str::to_string).collect(),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn due_reviews(state: &AppState, limit: Option<usize>) -> Vec<ReviewItem> {
  state.reviews.read().await.due(Utc::now(), limit.unwrap_or(DEFAULT_REVIEW_LIMIT))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::TutorConfig;
  use crate::grader::FeedbackCode;
  use crate::templates::TemplateStore;

  fn state() -> AppState {
    let store = TemplateStore::load_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/content/templates")).unwrap();
    AppState::from_store(store, TutorConfig::default())
  }

  #[tokio::test]
  async fn fresh_learner_starts_on_rational_operations() {
    let s = state();
    let item = next_item(&s, None, Some(7)).await;
    assert_eq!(item.teks, "6.2");
    assert!(s.get_item(&item.id).await.is_some());
    assert_eq!(recommend_next(&s).await.teks, "6.2");
  }

  #[tokio::test]
  async fn attempts_update_mastery_and_reviews() {
    let s = state();
    let item = s.item_for_template("6.8B_trapezoid_area", 11).await.unwrap();
    let key = Submission::Text(item.answer.key_text());
    let out = submit_attempt(&s, &item.id, &key).await.unwrap();
    assert!(out.correct);
    assert_eq!(out.feedback_code, FeedbackCode::Ok);
    assert!((out.mastery.score - 0.2).abs() < 1e-9);

    let wrong = submit_attempt(&s, &item.id, &Submission::Text("oops".into())).await.unwrap();
    assert_eq!(wrong.feedback_code, FeedbackCode::ParseError);

    let p = progress(&s).await;
    let trap = p.skills.iter().find(|k| k.teks == "6.8B").unwrap();
    assert_eq!(trap.attempts, 2);
    assert_eq!(s.reviews.read().await.for_skill("6.8B").len(), 1);
    assert!(due_reviews(&s, None).await.is_empty());
  }

  #[tokio::test]
  async fn progress_lists_skills_outside_the_curriculum() {
    let s = state();
    let item = next_item(&s, Some("6.99"), Some(1)).await;
    let full = s.get_item(&item.id).await.unwrap();
    submit_attempt(&s, &item.id, &Submission::Text(full.answer.key_text())).await.unwrap();

    let p = progress(&s).await;
    assert_eq!(p.skills.len(), 8);
    let extra = p.skills.last().unwrap();
    assert_eq!(extra.teks, "6.99");
    assert_eq!(extra.attempts, 1);
    assert!(extra.unlocked);
  }

  #[tokio::test]
  async fn unknown_items_yield_none() {
    let s = state();
    assert!(submit_attempt(&s, "nope", &Submission::Number(1.0)).await.is_none());
    assert!(get_hint(&s, "nope", None).await.is_none());
  }

  #[tokio::test]
  async fn hint_index_is_clamped() {
    let s = state();
    let item = s.item_for_template("6.4_unit_rate", 3).await.unwrap();
    let last = get_hint(&s, &item.id, Some(99)).await.unwrap();
    assert_eq!(last.index, last.total - 1);
    assert_eq!(last.text, *item.hints.last().unwrap());
  }

  #[tokio::test]
  async fn unknown_template_is_an_error() {
    let s = state();
    assert_eq!(
      item_by_template(&s, "missing", Some(1)).await.unwrap_err(),
      GenerationError::TemplateNotFound("missing".into())
    );
  }
}
