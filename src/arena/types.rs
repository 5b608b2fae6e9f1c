//! Wire types for the battle arena HTTP contract
//!
//! Shapes mirror what the server actually sends. Judges historically
//! reported ratings as bare scores and later as objects with reasoning, so
//! the rating decoder accepts both.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request body for `POST /api/battle`
#[derive(Debug, Clone, Serialize)]
pub struct BattleRequest {
    /// The user's prompt for this turn
    pub prompt: String,

    /// Prior turns of the active thread, oldest first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<Vec<HistoryMessage>>,

    /// Optional attached image as a base64 data URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl BattleRequest {
    /// Request carrying only a prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            conversation_history: None,
            image_data: None,
        }
    }
}

/// One prior turn sent as battle context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// "user" or "assistant"
    pub role: String,
    /// Message text
    pub content: String,
}

/// A full battle record: the prompt and every model's ranked answer
#[derive(Debug, Clone, Deserialize)]
pub struct BattleRecord {
    /// Server-assigned battle id
    pub id: i64,

    /// The prompt that was battled
    pub prompt: String,

    /// Creation timestamp (RFC-3339), when the server reports one
    #[serde(default)]
    pub created_at: Option<String>,

    /// Candidate responses, best score first
    #[serde(default)]
    pub responses: Vec<ModelResponse>,

    /// Winning model identifier
    #[serde(default)]
    pub winner: Option<String>,

    /// Winning model display name
    #[serde(default)]
    pub winner_display: Option<String>,

    /// How a tie was broken, when one occurred
    #[serde(default)]
    pub tiebreaker_info: Option<TiebreakerInfo>,
}

impl BattleRecord {
    /// Text of the winning response
    ///
    /// Falls back to the first (highest-scored) response when no winner
    /// flag is set, matching what the chat surface displays.
    pub fn winning_text(&self) -> Option<&str> {
        self.responses
            .iter()
            .find(|r| r.is_winner)
            .or_else(|| self.responses.first())
            .map(|r| r.text.as_str())
    }
}

/// One model's answer within a battle
#[derive(Debug, Clone, Deserialize)]
pub struct ModelResponse {
    /// Model identifier
    pub model: String,

    /// Human-friendly model name
    #[serde(default)]
    pub model_display: Option<String>,

    /// The answer text
    pub text: String,

    /// Mean of the judges' scores
    #[serde(default)]
    pub average_score: f64,

    /// Whether this response won the battle
    #[serde(default)]
    pub is_winner: bool,

    /// Per-judge ratings, keyed by judge model
    #[serde(default)]
    pub ratings: HashMap<String, JudgeRating>,
}

impl ModelResponse {
    /// Display name, falling back to the raw model identifier
    pub fn display_name(&self) -> &str {
        self.model_display.as_deref().unwrap_or(&self.model)
    }
}

/// A judge's verdict on one response
///
/// Decodes either the old bare-score form (`7.5`) or the current object
/// form (`{"score": 7.5, "reasoning": "..."}`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JudgeRating {
    /// Score with the judge's reasoning attached
    Detailed {
        /// Numeric score
        score: f64,
        /// Free-text justification; may be empty
        #[serde(default)]
        reasoning: String,
    },
    /// Bare numeric score from the legacy format
    Bare(f64),
}

impl JudgeRating {
    /// The numeric score regardless of wire format
    pub fn score(&self) -> f64 {
        match self {
            JudgeRating::Detailed { score, .. } => *score,
            JudgeRating::Bare(score) => *score,
        }
    }

    /// The reasoning, when the judge provided one
    pub fn reasoning(&self) -> Option<&str> {
        match self {
            JudgeRating::Detailed { reasoning, .. } if !reasoning.is_empty() => Some(reasoning),
            _ => None,
        }
    }
}

/// Tie-break metadata attached to a battle
#[derive(Debug, Clone, Deserialize)]
pub struct TiebreakerInfo {
    /// Whether the top scores tied
    #[serde(default)]
    pub tie_occurred: bool,

    /// Method used to break the tie
    #[serde(default)]
    pub method: Option<String>,
}

/// Battle summary as returned by `GET /api/battles`
#[derive(Debug, Clone, Deserialize)]
pub struct BattleSummary {
    /// Battle id
    pub id: i64,

    /// Prompt excerpt (truncated server-side)
    pub prompt: String,

    /// Creation timestamp (RFC-3339)
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Aggregate leaderboard as returned by `GET /api/stats`
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    /// Per-model standings, best first
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,

    /// Total battles fought
    #[serde(default)]
    pub total_battles: i64,
}

/// One model's standing on the leaderboard
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardEntry {
    /// Model identifier
    pub model: String,

    /// Battles won
    #[serde(default)]
    pub wins: i64,

    /// Mean score across all battles
    #[serde(default)]
    pub average_score: f64,

    /// Wins as a percentage of total battles
    #[serde(default)]
    pub win_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battle_request_omits_empty_fields() {
        let request = BattleRequest::new("hello");
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"prompt\":\"hello\""));
        assert!(!json.contains("conversation_history"));
        assert!(!json.contains("image_data"));
    }

    #[test]
    fn test_rating_decodes_bare_score() {
        let rating: JudgeRating = serde_json::from_str("8.5").unwrap();
        assert_eq!(rating.score(), 8.5);
        assert!(rating.reasoning().is_none());
    }

    #[test]
    fn test_rating_decodes_object_form() {
        let rating: JudgeRating =
            serde_json::from_str(r#"{"score": 6.0, "reasoning": "too terse"}"#).unwrap();
        assert_eq!(rating.score(), 6.0);
        assert_eq!(rating.reasoning(), Some("too terse"));
    }

    #[test]
    fn test_rating_empty_reasoning_reads_as_none() {
        let rating: JudgeRating =
            serde_json::from_str(r#"{"score": 6.0, "reasoning": ""}"#).unwrap();
        assert!(rating.reasoning().is_none());
    }

    #[test]
    fn test_battle_record_decodes_mixed_ratings() {
        let json = r#"{
            "id": 12,
            "prompt": "why is the sky blue",
            "responses": [{
                "model": "alpha",
                "model_display": "Alpha 2",
                "text": "Rayleigh scattering.",
                "average_score": 9.0,
                "is_winner": true,
                "ratings": {
                    "beta": 9.0,
                    "gamma": {"score": 9.0, "reasoning": "accurate"}
                }
            }],
            "winner": "alpha",
            "tiebreaker_info": {"tie_occurred": false}
        }"#;
        let record: BattleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.responses[0].ratings["beta"].score(), 9.0);
        assert_eq!(
            record.responses[0].ratings["gamma"].reasoning(),
            Some("accurate")
        );
        assert!(!record.tiebreaker_info.unwrap().tie_occurred);
    }

    #[test]
    fn test_winning_text_prefers_winner_flag() {
        let json = r#"{
            "id": 1,
            "prompt": "p",
            "responses": [
                {"model": "a", "text": "loser", "average_score": 5.0, "is_winner": false},
                {"model": "b", "text": "champion", "average_score": 9.0, "is_winner": true}
            ]
        }"#;
        let record: BattleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.winning_text(), Some("champion"));
    }

    #[test]
    fn test_winning_text_falls_back_to_first_response() {
        let json = r#"{
            "id": 1,
            "prompt": "p",
            "responses": [
                {"model": "a", "text": "best effort", "average_score": 5.0, "is_winner": false}
            ]
        }"#;
        let record: BattleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.winning_text(), Some("best effort"));
    }

    #[test]
    fn test_winning_text_none_without_responses() {
        let record: BattleRecord =
            serde_json::from_str(r#"{"id": 1, "prompt": "p"}"#).unwrap();
        assert!(record.winning_text().is_none());
    }

    #[test]
    fn test_display_name_fallback() {
        let response: ModelResponse =
            serde_json::from_str(r#"{"model": "alpha", "text": "t"}"#).unwrap();
        assert_eq!(response.display_name(), "alpha");
    }

    #[test]
    fn test_stats_response_decodes() {
        let json = r#"{
            "leaderboard": [
                {"model": "alpha", "wins": 10, "average_score": 8.1, "win_rate": 62.5}
            ],
            "total_battles": 16
        }"#;
        let stats: StatsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_battles, 16);
        assert_eq!(stats.leaderboard[0].wins, 10);
    }
}
