//! Built-in items that keep practice going when generation is exhausted.

use crate::domain::{
  Answer, AnswerForm, AnswerFormat, Diagram, Item, ItemType, McOption, Params, ParamValue, Point, Safety, Shape,
  Stimulus,
};
use crate::fraction::Fraction;
use crate::svg;

/// Template id carried by every fallback item.
pub const FALLBACK_TEMPLATE: &str = "fallback";

/// One hand-written item per skill, served as-is.
pub fn seed_items() -> Vec<Item> {
  ["6.2", "6.4", "6.7B", "6.7D", "6.8B", "6.9A", "6.11"].into_iter().map(hard_fallback_item).collect()
}

/// Absolute last-resort fallback for `teks`. Unknown skills get a rational
/// operations item relabelled with the requested code.
pub fn hard_fallback_item(teks: &str) -> Item {
  let mut params = Params::new();
  let mut stimulus = None;
  let mut options = Vec::new();
  let mut form = AnswerFormat::default();

  let (kind, prompt, answer, hints, explanation): (ItemType, &str, Answer, &[&str], &str) = match teks {
    "6.4" => {
      params.insert("x", ParamValue::Int(3));
      params.insert("y", ParamValue::Int(120));
      form.tolerance = Some(0.01);
      stimulus = Some(Stimulus { context: "Maya's family drives 120 miles in 3 hours.".into(), diagram: None });
      (
        ItemType::Numeric,
        "How many miles do they drive per hour?",
        Answer::Decimal(40.0),
        &["Divide the total by the number of hours."],
        "Divide the total by the number of units: 120 ÷ 3 = 40. The answer is 40.",
      )
    }
    "6.7B" => {
      options = vec![
        McOption { label: "A".into(), value: "x + 3 = 7".into(), correct: true, rationale: "It has an equals sign.".into() },
        McOption { label: "B".into(), value: "2x + 5".into(), correct: false, rationale: "No equals sign, so it is an expression.".into() },
        McOption { label: "C".into(), value: "4 - y".into(), correct: false, rationale: "No equals sign, so it is an expression.".into() },
      ];
      (
        ItemType::Mc,
        "Which of these is an equation?",
        Answer::Choices(vec!["x + 3 = 7".into()]),
        &["An equation states that two quantities are equal."],
        "An equation contains an equals sign. The answer is x + 3 = 7.",
      )
    }
    "6.7D" => {
      params.insert("a", ParamValue::Int(3));
      params.insert("b", ParamValue::Int(2));
      (
        ItemType::Expression,
        "Write an expression equivalent to 3(x + 2).",
        Answer::Expression("3x + 6".into()),
        &["Multiply 3 by each term inside the parentheses."],
        "Distribute: 3 × x + 3 × 2 = 3x + 6. The answer is 3x + 6.",
      )
    }
    "6.8B" => {
      for (name, v) in [("b1", 8), ("b2", 12), ("h", 6)] {
        params.insert(name, ParamValue::Int(v));
      }
      params.insert("units", ParamValue::Text("cm".into()));
      form.form = AnswerForm::Int;
      let shape = Shape::Trapezoid { b1: 8, b2: 12, h: 6, units: "cm".into() };
      stimulus = Some(Stimulus {
        context: "A garden bed is shaped like a trapezoid.".into(),
        diagram: Some(Diagram { svg: svg::render(&shape), shape }),
      });
      (
        ItemType::Numeric,
        "Find the area of the trapezoid in square centimeters.",
        Answer::Integer(60),
        &["Add the two bases, multiply by the height, then halve."],
        "Add the bases: 8 + 12 = 20. Multiply by the height: 20 × 6 = 120. Halve it: 120 ÷ 2 = 60. The answer is 60.",
      )
    }
    "6.9A" => {
      params.insert("form", ParamValue::Text("x+a=b".into()));
      params.insert("a", ParamValue::Int(7));
      params.insert("b", ParamValue::Int(12));
      form.form = AnswerForm::Fraction;
      (
        ItemType::Numeric,
        "Solve x + 7 = 12.",
        Answer::Fraction(Fraction::from_integer(5)),
        &["Undo the addition by subtracting 7 from both sides."],
        "Subtract 7 from both sides: 12 - 7 = 5. So x = 5.",
      )
    }
    "6.11" => {
      let target = Point { x: 2.0, y: -3.0 };
      params.insert("x", ParamValue::Int(2));
      params.insert("y", ParamValue::Int(-3));
      form.tolerance = Some(0.25);
      let shape = Shape::CoordinatePlane { x_min: -5, x_max: 5, y_min: -5, y_max: 5, points: vec![] };
      stimulus = Some(Stimulus { context: String::new(), diagram: Some(Diagram { svg: svg::render(&shape), shape }) });
      (
        ItemType::Plot,
        "Plot the point (2, -3).",
        Answer::Point(target),
        &["Start at the origin, move along the x-axis first."],
        "Move 2 units right. Move 3 units down. The answer is (2, -3).",
      )
    }
    _ => {
      params.insert("a", ParamValue::Int(6));
      params.insert("b", ParamValue::Int(-4));
      params.insert("op", ParamValue::Text("+".into()));
      form.form = AnswerForm::Int;
      (
        ItemType::Numeric,
        "Compute 6 + (-4).",
        Answer::Integer(2),
        &["Adding a negative number moves left on the number line."],
        "Compute 6 + (-4) = 2. The answer is 2.",
      )
    }
  };

  Item {
    id: Item::make_id(teks, FALLBACK_TEMPLATE, 0),
    teks: teks.to_string(),
    kind,
    template_id: FALLBACK_TEMPLATE.into(),
    seed: 0,
    params,
    stimulus,
    prompt: prompt.into(),
    options,
    answer_equivalents: answer.equivalents(),
    answer,
    answer_format: form,
    hints: hints.iter().map(|h| h.to_string()).collect(),
    explanation: explanation.into(),
    difficulty: 1,
    tags: vec!["fallback".into()],
    safety: Safety { moderation_passed: true },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grader::{grade_item, Submission, DEFAULT_PLOT_TOLERANCE};
  use crate::validator::Moderation;

  #[test]
  fn fallback_items_grade_their_own_answers() {
    for item in seed_items() {
      let submission = match &item.answer {
        Answer::Point(p) => Submission::Point(*p),
        Answer::Choices(v) => Submission::Choices(v.clone()),
        other => Submission::Text(other.key_text()),
      };
      let result = grade_item(&item, &submission, DEFAULT_PLOT_TOLERANCE);
      assert!(result.correct, "{}", item.id);
      assert!(!item.hints.is_empty());
    }
  }

  #[test]
  fn fallback_text_is_clean() {
    let m = Moderation::default();
    for item in seed_items() {
      assert!(m.flagged(&item.prompt).is_none());
      assert!(m.flagged(&item.explanation).is_none());
    }
  }

  #[test]
  fn unknown_skill_keeps_requested_code() {
    let item = hard_fallback_item("6.99");
    assert_eq!(item.teks, "6.99");
    assert_eq!(item.id, "itm_6.99_fallback_0");
  }
}
