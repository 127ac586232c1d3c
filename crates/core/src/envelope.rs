use serde::{Deserialize, Serialize};

/// The reply body expected by the Home Assistant conversation API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub response: ConversationReply,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationReply {
    pub speech: Speech,
    pub response_type: ResponseType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speech {
    pub plain: PlainSpeech,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainSpeech {
    pub speech: String,
    /// Always serialised, as `null` when empty.
    pub extra_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    ActionDone,
}

impl ConversationResponse {
    /// Wraps spoken text as a completed action.
    pub fn action_done(speech: impl Into<String>) -> Self {
        Self {
            response: ConversationReply {
                speech: Speech {
                    plain: PlainSpeech {
                        speech: speech.into(),
                        extra_data: None,
                    },
                },
                response_type: ResponseType::ActionDone,
            },
        }
    }
}
