//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Learner-facing DTOs never carry the answer key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AnswerFormat, Item, ItemType, Stimulus};
use crate::grader::{Canonical, FeedbackCode, Submission};
use crate::mastery::{MasteryLevel, MasteryUpdate};
use crate::review::ReviewItem;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    NextItem {
        #[serde(default)]
        teks: Option<String>,
        #[serde(default)]
        seed: Option<u64>,
    },
    SubmitAttempt {
        item_id: String,
        response: Submission,
    },
    Hint {
        item_id: String,
        #[serde(default)]
        index: Option<usize>,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Item {
        item: ItemOut,
    },
    AttemptResult(AttemptOut),
    Hint(HintOut),
    Error {
        message: String,
    },
}

/// An MC option as shown to the learner.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OptionOut {
    pub label: String,
    pub value: String,
}

/// DTO used by both WS and HTTP for item delivery.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOut {
    pub id: String,
    pub teks: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub template_id: String,
    pub seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stimulus: Option<Stimulus>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionOut>,
    pub answer_format: AnswerFormat,
    pub difficulty: u8,
    pub tags: Vec<String>,
    pub hint_count: usize,
}

/// Convert a full `Item` (internal) to the public DTO.
pub fn to_out(i: &Item) -> ItemOut {
    ItemOut {
        id: i.id.clone(),
        teks: i.teks.clone(),
        kind: i.kind,
        template_id: i.template_id.clone(),
        seed: i.seed,
        stimulus: i.stimulus.clone(),
        prompt: i.prompt.clone(),
        options: i
            .options
            .iter()
            .map(|o| OptionOut { label: o.label.clone(), value: o.value.clone() })
            .collect(),
        answer_format: i.answer_format,
        difficulty: i.difficulty,
        tags: i.tags.clone(),
        hint_count: i.hints.len(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct PracticeQuery {
    pub teks: Option<String>,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SeedQuery {
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AttemptIn {
    pub item_id: String,
    pub response: Submission,
}

#[derive(Debug, Serialize)]
pub struct AttemptOut {
    pub item_id: String,
    pub correct: bool,
    pub canonical: Canonical,
    pub feedback_code: FeedbackCode,
    pub explanation: String,
    pub mastery: MasteryUpdate,
    pub next_difficulty: u8,
}

#[derive(Debug, Deserialize)]
pub struct HintQuery {
    pub item_id: String,
    pub index: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HintOut {
    pub item_id: String,
    pub index: usize,
    pub total: usize,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SkillProgressOut {
    pub teks: String,
    pub score: f64,
    pub attempts: u32,
    pub level: MasteryLevel,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_review_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ProgressOut {
    pub skills: Vec<SkillProgressOut>,
}

#[derive(Debug, Serialize)]
pub struct CurriculumNextOut {
    pub teks: String,
    pub difficulty: u8,
    pub sequence: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ReviewsOut {
    pub due: Vec<ReviewItem>,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub templates: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::hard_fallback_item;

    #[test]
    fn item_dto_hides_the_key() {
        let item = hard_fallback_item("6.7B");
        let json = serde_json::to_value(to_out(&item)).unwrap();
        assert_eq!(json["type"], "mc");
        assert_eq!(json["hint_count"], 1);
        assert!(json.get("answer").is_none());
        assert!(json.get("explanation").is_none());
        assert!(json["options"][0].get("correct").is_none());
    }

    #[test]
    fn client_messages_parse() {
        let m: ClientWsMessage =
            serde_json::from_str(r#"{"type":"submit_attempt","item_id":"x","response":{"x":1,"y":2}}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::SubmitAttempt { response: Submission::Point(_), .. }));
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"next_item"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::NextItem { teks: None, seed: None }));
    }
}
