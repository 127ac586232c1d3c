pub mod agent;
pub mod envelope;
pub mod extract;

pub use agent::{AgentError, AgentOutcome, AgentRunner, OpenClawAgent};
pub use envelope::ConversationResponse;
pub use extract::{clean_speech, extract_response_text};
