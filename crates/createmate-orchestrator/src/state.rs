use crate::prompts::initial_topic;
use crate::types::collections;
use createmate_core::{
    validate_user_input, AgentMessage, ContentRequest, CreateMateResult, Document, Feedback,
    GeneratedContent, Schedule, ScheduleRequest, StateResponse, StoreData, TopicRequest,
    TopicSuggestion, UserInput, WorkFailed,
};
use createmate_storage::to_document;
use uuid::Uuid;

/// Something the coordinator must do after a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the scheduler for posting days.
    Schedule(ScheduleRequest),
    /// Ask for topics for the remaining days.
    Topics(TopicRequest),
    /// Ask for one post.
    Content(ContentRequest),
    /// Persist a document.
    Store(StoreData),
}

impl Effect {
    fn store(collection: &str, data: Document) -> Self {
        Effect::Store(StoreData {
            collection: collection.to_string(),
            data,
        })
    }

    /// The bus payload carrying this effect.
    pub fn into_message(self) -> AgentMessage {
        match self {
            Effect::Schedule(m) => m.into(),
            Effect::Topics(m) => m.into(),
            Effect::Content(m) => m.into(),
            Effect::Store(m) => m.into(),
        }
    }
}

/// The coordinator's view of the current session.
///
/// Every transition is synchronous and returns the effects to perform, so the
/// whole pipeline can be driven without a bus.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    session_id: Option<Uuid>,
    user_input: Option<UserInput>,
    schedule: Option<Schedule>,
    generated_content: Vec<GeneratedContent>,
    suggested_topics: Vec<String>,
    remaining_days: Vec<String>,
    errors: Vec<String>,
}

impl SessionState {
    /// An empty state with no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the session in progress.
    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Posting days still waiting for a topic.
    pub fn remaining_days(&self) -> &[String] {
        &self.remaining_days
    }

    /// Whether a message belongs to the current session.
    ///
    /// Untagged messages (input, feedback, storage replies) are always accepted.
    pub fn accepts(&self, message: &AgentMessage) -> bool {
        match message.session_id() {
            Some(id) => self.session_id == Some(id),
            None => true,
        }
    }

    /// Replace any previous session with one for `input`.
    pub fn start_session(&mut self, input: UserInput) -> CreateMateResult<Vec<Effect>> {
        validate_user_input(&input)?;
        let session_id = Uuid::new_v4();
        *self = Self {
            session_id: Some(session_id),
            user_input: Some(input.clone()),
            ..Self::default()
        };

        let mut record = to_document(&input)?;
        record.insert("session_id".into(), session_id.to_string().into());

        let mut effects = vec![
            Effect::store(collections::USER_INPUTS, record),
            Effect::Schedule(ScheduleRequest { session_id, input }),
        ];
        effects.extend(self.topic_request(None));
        Ok(effects)
    }

    /// Record the schedule and request the initial post for its first day.
    pub fn apply_schedule(&mut self, schedule: Schedule) -> CreateMateResult<Vec<Effect>> {
        let mut effects = vec![Effect::store(collections::SCHEDULES, to_document(&schedule)?)];
        let session_id = schedule.session_id;

        let first_day = schedule.posting_days.first().cloned();
        self.remaining_days = schedule.posting_days.iter().skip(1).cloned().collect();
        self.schedule = Some(schedule);

        let Some(day) = first_day else {
            self.errors.push("schedule: no posting days".into());
            return Ok(effects);
        };
        let Some(input) = self.user_input.clone() else {
            self.errors.push("schedule: no user input for session".into());
            return Ok(effects);
        };
        let topic = initial_topic(&input);
        effects.push(Effect::Content(content_request(session_id, &input, topic, day)));
        Ok(effects)
    }

    /// Upsert a finished post by day.
    pub fn apply_content(&mut self, content: GeneratedContent) -> CreateMateResult<Vec<Effect>> {
        let record = to_document(&content)?;
        match self
            .generated_content
            .iter_mut()
            .find(|existing| existing.day == content.day)
        {
            Some(existing) => *existing = content,
            None => self.generated_content.push(content),
        }
        Ok(vec![Effect::store(collections::GENERATED_CONTENT, record)])
    }

    /// Record topics and request a post for each remaining day that has one.
    pub fn apply_topics(&mut self, suggestion: TopicSuggestion) -> CreateMateResult<Vec<Effect>> {
        let mut effects = vec![Effect::store(
            collections::SUGGESTED_TOPICS,
            to_document(&suggestion)?,
        )];
        let session_id = suggestion.session_id;
        self.suggested_topics = suggestion.topics;

        if let Some(input) = self.user_input.as_ref() {
            for (day, topic) in self.remaining_days.iter().zip(&self.suggested_topics) {
                effects.push(Effect::Content(content_request(
                    session_id,
                    input,
                    topic.clone(),
                    day.clone(),
                )));
            }
        }
        Ok(effects)
    }

    /// Store feedback and ask for topics for the remaining days.
    ///
    /// Returns the acknowledgement text alongside the effects.
    pub fn apply_feedback(&mut self, feedback: Feedback) -> CreateMateResult<(String, Vec<Effect>)> {
        let Some(session_id) = self.session_id else {
            return Ok(("Feedback received; no session in progress, nothing pending".into(), Vec::new()));
        };

        let mut record = to_document(&feedback)?;
        record.insert("session_id".into(), session_id.to_string().into());
        let mut effects = vec![Effect::store(collections::FEEDBACK, record)];

        let comments = if feedback.liked { None } else { feedback.comments };
        let topics = self.topic_request(comments);
        let message = if topics.is_some() {
            format!(
                "Feedback received; suggesting topics for {} remaining days",
                self.remaining_days.len()
            )
        } else {
            "Feedback received; no remaining days to schedule".to_string()
        };
        effects.extend(topics);
        Ok((message, effects))
    }

    /// Record a worker failure.
    pub fn apply_failure(&mut self, failure: WorkFailed) {
        let entry = match failure.day {
            Some(day) => format!("{} ({day}): {}", failure.stage, failure.reason),
            None => format!("{}: {}", failure.stage, failure.reason),
        };
        self.errors.push(entry);
    }

    /// Record an error against the session.
    pub fn record_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Snapshot for state requests.
    pub fn snapshot(&self) -> StateResponse {
        StateResponse {
            session_id: self.session_id,
            user_input: self.user_input.clone(),
            schedule: self.schedule.clone(),
            generated_content: self.generated_content.clone(),
            suggested_topics: self.suggested_topics.clone(),
            remaining_days: self.remaining_days.clone(),
            errors: self.errors.clone(),
        }
    }

    fn topic_request(&self, feedback: Option<String>) -> Option<Effect> {
        let session_id = self.session_id?;
        let input = self.user_input.as_ref()?;
        if self.remaining_days.is_empty() {
            return None;
        }
        Some(Effect::Topics(TopicRequest {
            session_id,
            area_of_interest: input.area_of_interest.clone(),
            content_type: input.content_type.clone(),
            keywords: input.keywords.clone(),
            num_topics: self.remaining_days.len(),
            feedback,
        }))
    }
}

fn content_request(session_id: Uuid, input: &UserInput, topic: String, day: String) -> ContentRequest {
    ContentRequest {
        session_id,
        topic,
        day,
        area_of_interest: input.area_of_interest.clone(),
        content_type: input.content_type.clone(),
        keywords: input.keywords.clone(),
    }
}
