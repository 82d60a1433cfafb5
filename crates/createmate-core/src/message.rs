use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A schemaless document as persisted by the storage agent.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// What the user wants to post about, and how often.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    /// Main topic area, e.g. "Technology".
    pub area_of_interest: String,
    /// Kind of post, e.g. "Event Updates".
    pub content_type: String,
    /// Keywords every post should work in.
    pub keywords: Vec<String>,
    /// Number of posts per week (1..=7).
    pub post_frequency: u8,
}

/// Coordinator → scheduler: plan a week for this input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Session the schedule belongs to.
    pub session_id: Uuid,
    /// What the schedule is planned for.
    pub input: UserInput,
}

/// The posting days chosen for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Session the schedule belongs to.
    pub session_id: Uuid,
    /// Canonical weekday names, in week order.
    pub posting_days: Vec<String>,
}

/// Coordinator → content generator: write one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    /// Session the post belongs to.
    pub session_id: Uuid,
    /// Subject of the post.
    pub topic: String,
    /// Weekday the post is planned for.
    pub day: String,
    /// Topic area copied from the user input.
    pub area_of_interest: String,
    /// Kind of post copied from the user input.
    pub content_type: String,
    /// Keywords copied from the user input.
    pub keywords: Vec<String>,
}

/// A finished post draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    /// Session the post belongs to.
    pub session_id: Uuid,
    /// Subject of the post.
    pub topic: String,
    /// Post body as returned by the model.
    pub content: String,
    /// Weekday the post is planned for.
    pub day: String,
}

fn default_num_topics() -> usize {
    1
}

/// Coordinator → topic suggester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRequest {
    /// Session the topics are for.
    pub session_id: Uuid,
    /// Topic area copied from the user input.
    pub area_of_interest: String,
    /// Kind of post copied from the user input.
    pub content_type: String,
    /// Keywords copied from the user input.
    pub keywords: Vec<String>,
    /// How many topics to return.
    #[serde(default = "default_num_topics")]
    pub num_topics: usize,
    /// Reviewer comments on the initial post, when it was not liked.
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Topics proposed for the remaining posting days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSuggestion {
    /// Session the topics are for.
    pub session_id: Uuid,
    /// One topic per remaining posting day.
    pub topics: Vec<String>,
}

/// The user's verdict on the initial post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Whether the user liked the post.
    pub liked: bool,
    /// Free-form remarks.
    #[serde(default)]
    pub comments: Option<String>,
}

fn default_request_type() -> String {
    "get_state".to_string()
}

/// Asks the coordinator for a snapshot of its session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRequest {
    /// Always `get_state`.
    #[serde(default = "default_request_type")]
    pub request_type: String,
}

impl Default for StateRequest {
    fn default() -> Self {
        Self {
            request_type: default_request_type(),
        }
    }
}

/// Snapshot of the coordinator's session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResponse {
    /// Id of the session in progress, if any.
    pub session_id: Option<Uuid>,
    /// Input that started the session.
    pub user_input: Option<UserInput>,
    /// The schedule, once the scheduler replied.
    pub schedule: Option<Schedule>,
    /// Posts generated so far.
    pub generated_content: Vec<GeneratedContent>,
    /// Topics proposed after feedback.
    pub suggested_topics: Vec<String>,
    /// Posting days still without a topic.
    pub remaining_days: Vec<String>,
    /// Failures reported during the session.
    pub errors: Vec<String>,
}

/// Insert `data` into `collection`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    /// Target collection.
    pub collection: String,
    /// Document to insert.
    pub data: Document,
}

/// Fetch the first document in `collection` matching `query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveData {
    /// Collection to search.
    pub collection: String,
    /// Field equality filter; dotted keys reach into nested objects.
    pub query: Document,
}

/// Set the fields of `update` on the first document matching `query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateData {
    /// Collection to search.
    pub collection: String,
    /// Filter selecting the document.
    pub query: Document,
    /// Fields to set, either plain or under `$set`.
    pub update: Document,
}

/// Remove the first document matching `query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteData {
    /// Collection to search.
    pub collection: String,
    /// Filter selecting the document.
    pub query: Document,
}

/// Outcome of a storage operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Operation result, e.g. the inserted id or the found document.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Human-readable outcome.
    pub message: String,
}

impl DataResponse {
    /// A successful response carrying `data`.
    pub fn ok(data: serde_json::Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
        }
    }

    /// A failed response without data.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
        }
    }
}

/// Acknowledges a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Human-readable status.
    pub message: String,
}

impl Ack {
    /// Build an ack.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Pipeline stage a worker was performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkStage {
    /// Picking the posting days.
    Schedule,
    /// Suggesting topics for the remaining days.
    Topics,
    /// Writing a post.
    Content,
}

impl std::fmt::Display for WorkStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkStage::Schedule => write!(f, "schedule"),
            WorkStage::Topics => write!(f, "topics"),
            WorkStage::Content => write!(f, "content"),
        }
    }
}

/// Worker → coordinator: the request could not be fulfilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkFailed {
    /// Session the request belonged to.
    pub session_id: Uuid,
    /// Stage that failed.
    pub stage: WorkStage,
    /// Error text.
    pub reason: String,
    /// Posting day, for content failures.
    #[serde(default)]
    pub day: Option<String>,
}

/// Every payload that can travel over the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentMessage {
    /// Start a session.
    UserInput(UserInput),
    /// See [`ScheduleRequest`].
    ScheduleRequest(ScheduleRequest),
    /// See [`Schedule`].
    Schedule(Schedule),
    /// See [`ContentRequest`].
    ContentRequest(ContentRequest),
    /// See [`GeneratedContent`].
    GeneratedContent(GeneratedContent),
    /// See [`TopicRequest`].
    TopicRequest(TopicRequest),
    /// See [`TopicSuggestion`].
    TopicSuggestion(TopicSuggestion),
    /// Verdict on the initial post.
    Feedback(Feedback),
    /// See [`StateRequest`].
    StateRequest(StateRequest),
    /// See [`StateResponse`].
    StateResponse(StateResponse),
    /// See [`StoreData`].
    StoreData(StoreData),
    /// See [`RetrieveData`].
    RetrieveData(RetrieveData),
    /// See [`UpdateData`].
    UpdateData(UpdateData),
    /// See [`DeleteData`].
    DeleteData(DeleteData),
    /// See [`DataResponse`].
    DataResponse(DataResponse),
    /// See [`Ack`].
    Ack(Ack),
    /// See [`WorkFailed`].
    WorkFailed(WorkFailed),
}

impl AgentMessage {
    /// Short, stable name of the payload type (the serde tag).
    pub fn kind(&self) -> &'static str {
        match self {
            AgentMessage::UserInput(_) => "user_input",
            AgentMessage::ScheduleRequest(_) => "schedule_request",
            AgentMessage::Schedule(_) => "schedule",
            AgentMessage::ContentRequest(_) => "content_request",
            AgentMessage::GeneratedContent(_) => "generated_content",
            AgentMessage::TopicRequest(_) => "topic_request",
            AgentMessage::TopicSuggestion(_) => "topic_suggestion",
            AgentMessage::Feedback(_) => "feedback",
            AgentMessage::StateRequest(_) => "state_request",
            AgentMessage::StateResponse(_) => "state_response",
            AgentMessage::StoreData(_) => "store_data",
            AgentMessage::RetrieveData(_) => "retrieve_data",
            AgentMessage::UpdateData(_) => "update_data",
            AgentMessage::DeleteData(_) => "delete_data",
            AgentMessage::DataResponse(_) => "data_response",
            AgentMessage::Ack(_) => "ack",
            AgentMessage::WorkFailed(_) => "work_failed",
        }
    }

    /// The session a pipeline message belongs to, if it is session-scoped.
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            AgentMessage::ScheduleRequest(m) => Some(m.session_id),
            AgentMessage::Schedule(m) => Some(m.session_id),
            AgentMessage::ContentRequest(m) => Some(m.session_id),
            AgentMessage::GeneratedContent(m) => Some(m.session_id),
            AgentMessage::TopicRequest(m) => Some(m.session_id),
            AgentMessage::TopicSuggestion(m) => Some(m.session_id),
            AgentMessage::WorkFailed(m) => Some(m.session_id),
            _ => None,
        }
    }
}

macro_rules! impl_from_payload {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for AgentMessage {
                fn from(msg: $ty) -> Self {
                    AgentMessage::$ty(msg)
                }
            }
        )*
    };
}

impl_from_payload!(
    UserInput,
    ScheduleRequest,
    Schedule,
    ContentRequest,
    GeneratedContent,
    TopicRequest,
    TopicSuggestion,
    Feedback,
    StateRequest,
    StateResponse,
    StoreData,
    RetrieveData,
    UpdateData,
    DeleteData,
    DataResponse,
    Ack,
    WorkFailed,
);

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample_input() -> UserInput {
        UserInput {
            area_of_interest: "Technology".into(),
            content_type: "Event Updates".into(),
            keywords: vec!["Ethereum".into()],
            post_frequency: 3,
        }
    }

    #[test]
    fn test_message_tagged_by_type() {
        let msg: AgentMessage = sample_input().into();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "user_input");
        assert_eq!(json["post_frequency"], 3);
        assert_eq!(msg.kind(), "user_input");
    }

    #[test]
    fn test_topic_request_defaults() {
        let json = serde_json::json!({
            "type": "topic_request",
            "session_id": Uuid::nil(),
            "area_of_interest": "Tech",
            "content_type": "Blog",
            "keywords": ["rust"],
        });
        let msg: AgentMessage = serde_json::from_value(json).unwrap();
        match msg {
            AgentMessage::TopicRequest(req) => {
                assert_eq!(req.num_topics, 1);
                assert!(req.feedback.is_none());
            }
            other => panic!("Expected TopicRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_state_request_default_type() {
        let req: StateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.request_type, "get_state");
        assert_eq!(StateRequest::default(), req);
    }

    #[test]
    fn test_session_scoped_messages() {
        let id = Uuid::new_v4();
        let schedule = AgentMessage::from(Schedule {
            session_id: id,
            posting_days: vec!["Monday".into()],
        });
        assert_eq!(schedule.session_id(), Some(id));

        let feedback = AgentMessage::from(Feedback {
            liked: true,
            comments: None,
        });
        assert!(feedback.session_id().is_none());
    }

    #[test]
    fn test_data_response_constructors() {
        let ok = DataResponse::ok(serde_json::json!({"inserted_id": "abc"}), "stored");
        assert!(ok.success);
        assert_eq!(ok.data.unwrap()["inserted_id"], "abc");

        let failed = DataResponse::failed("No data found");
        assert!(!failed.success);
        assert!(failed.data.is_none());
    }

    #[test]
    fn test_work_stage_display() {
        assert_eq!(WorkStage::Schedule.to_string(), "schedule");
        assert_eq!(WorkStage::Content.to_string(), "content");
    }
}
