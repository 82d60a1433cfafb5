use createmate_core::{
    ContentRequest, CreateMateError, CreateMateResult, TopicRequest, UserInput, Weekday,
};
use std::collections::HashSet;

/// Prompt asking for `post_frequency` posting days.
pub fn schedule_prompt(input: &UserInput) -> String {
    format!(
        "Generate a weekly content posting schedule based on the following preferences:\n\
         - Area of interest: {}\n\
         - Content type: {}\n\
         - Keywords: {}\n\
         - Post frequency: {} times per week\n\n\
         Provide the schedule as a JSON array of days (e.g., [\"Monday\", \"Wednesday\", \"Friday\"]).\n\
         Ensure the number of days matches the post frequency.",
        input.area_of_interest,
        input.content_type,
        input.keywords.join(", "),
        input.post_frequency
    )
}

/// Prompt asking for `num_topics` topics, with feedback when present.
pub fn topics_prompt(request: &TopicRequest) -> String {
    let mut prompt = format!(
        "Generate a list of {} engaging and trending topic suggestions for content creation based on the following:\n\
         - Area of interest: {}\n\
         - Content type: {}\n\
         - Keywords: {}\n\n\
         Consider current trends and popular discussions in this area. Each topic should be specific, interesting, and relevant to the given parameters.\n",
        request.num_topics,
        request.area_of_interest,
        request.content_type,
        request.keywords.join(", ")
    );
    if let Some(feedback) = request.feedback.as_deref().filter(|f| !f.trim().is_empty()) {
        prompt.push_str(&format!(
            "\nThe reader did not like the previous post. Take this feedback into account: {}\n",
            feedback.trim()
        ));
    }
    prompt.push_str("\nProvide the topics as a JSON array of strings.");
    prompt
}

/// Prompt for one post.
pub fn content_prompt(request: &ContentRequest) -> String {
    format!(
        "Generate content for a {} post about {} in the area of {}.\n\
         Incorporate the following keywords: {}.\n\
         The content should be suitable for posting on {}.\n\n\
         Please provide a well-structured post with:\n\
         1. An engaging title\n\
         2. An introduction\n\
         3. Main content (2-3 paragraphs)\n\
         4. A conclusion or call-to-action\n\n\
         Ensure the content is informative, engaging, and relevant to the topic and keywords.",
        request.content_type,
        request.topic,
        request.area_of_interest,
        request.keywords.join(", "),
        request.day
    )
}

/// The initial post topic used before any suggestions exist.
pub fn initial_topic(input: &UserInput) -> String {
    format!("{} - {} Update", input.area_of_interest, input.content_type)
}

/// Extract a JSON array of strings from model output.
///
/// Accepts a bare array, an array inside a Markdown code fence, or an array
/// surrounded by prose.
pub fn parse_string_array(text: &str) -> CreateMateResult<Vec<String>> {
    let body = strip_code_fence(text.trim());
    let start = body.find('[');
    let end = body.rfind(']');
    let slice = match (start, end) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => {
            return Err(CreateMateError::Llm(format!(
                "Expected a JSON array in model output: {}",
                preview(text)
            )))
        }
    };

    let values: Vec<serde_json::Value> = serde_json::from_str(slice).map_err(|e| {
        CreateMateError::Llm(format!("Failed to parse model output as JSON: {e}"))
    })?;

    values
        .into_iter()
        .map(|v| match v {
            serde_json::Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            other => Err(CreateMateError::Llm(format!(
                "Expected non-empty strings in array, got {other}"
            ))),
        })
        .collect()
}

/// Parse and check a schedule: exactly `frequency` distinct weekdays,
/// returned as canonical names in week order.
pub fn parse_schedule(text: &str, frequency: u8) -> CreateMateResult<Vec<String>> {
    let raw = parse_string_array(text)?;
    let mut days = Vec::with_capacity(raw.len());
    let mut seen = HashSet::new();
    for entry in &raw {
        let day: Weekday = entry.parse().map_err(CreateMateError::Llm)?;
        if !seen.insert(day) {
            return Err(CreateMateError::Llm(format!(
                "Schedule lists {day} more than once"
            )));
        }
        days.push(day);
    }
    if days.len() != usize::from(frequency) {
        return Err(CreateMateError::Llm(format!(
            "Schedule has {} days, expected {frequency}",
            days.len()
        )));
    }
    days.sort();
    Ok(days.iter().map(|d| d.name().to_string()).collect())
}

/// Parse topics, keeping the first `count`.
pub fn parse_topics(text: &str, count: usize) -> CreateMateResult<Vec<String>> {
    let mut topics = parse_string_array(text)?;
    if topics.len() < count {
        return Err(CreateMateError::Llm(format!(
            "Got {} topics, expected {count}",
            topics.len()
        )));
    }
    topics.truncate(count);
    Ok(topics)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // drop the language tag line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.rsplit_once("```").map_or(rest, |(body, _)| body).trim()
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(120) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn input() -> UserInput {
        UserInput {
            area_of_interest: "Technology".into(),
            content_type: "Event Updates".into(),
            keywords: vec!["Ethereum".into(), "Layer 2".into()],
            post_frequency: 3,
        }
    }

    #[test]
    fn test_schedule_prompt_mentions_preferences() {
        let prompt = schedule_prompt(&input());
        assert!(prompt.contains("Area of interest: Technology"));
        assert!(prompt.contains("Keywords: Ethereum, Layer 2"));
        assert!(prompt.contains("3 times per week"));
        assert!(prompt.contains("JSON array of days"));
    }

    #[test]
    fn test_topics_prompt_feedback() {
        let mut request = TopicRequest {
            session_id: Uuid::new_v4(),
            area_of_interest: "AI".into(),
            content_type: "Blog".into(),
            keywords: vec!["agents".into()],
            num_topics: 2,
            feedback: None,
        };
        let plain = topics_prompt(&request);
        assert!(plain.contains("list of 2 engaging"));
        assert!(!plain.contains("feedback"));

        request.feedback = Some("Too technical".into());
        assert!(topics_prompt(&request).contains("Too technical"));
    }

    #[test]
    fn test_content_prompt_structure() {
        let request = ContentRequest {
            session_id: Uuid::new_v4(),
            topic: initial_topic(&input()),
            day: "Monday".into(),
            area_of_interest: "Technology".into(),
            content_type: "Event Updates".into(),
            keywords: vec!["Ethereum".into()],
        };
        let prompt = content_prompt(&request);
        assert!(prompt.contains("about Technology - Event Updates Update"));
        assert!(prompt.contains("suitable for posting on Monday"));
        assert!(prompt.contains("Main content (2-3 paragraphs)"));
    }

    #[test]
    fn test_parse_bare_and_fenced_arrays() {
        assert_eq!(
            parse_string_array(r#"["Monday", "Friday"]"#).unwrap(),
            vec!["Monday", "Friday"]
        );
        let fenced = "```json\n[\"Tuesday\"]\n```";
        assert_eq!(parse_string_array(fenced).unwrap(), vec!["Tuesday"]);
        let prose = "Here is your schedule: [\"Wednesday\", \"Sunday\"] Enjoy!";
        assert_eq!(parse_string_array(prose).unwrap(), vec!["Wednesday", "Sunday"]);
    }

    #[test]
    fn test_parse_rejects_non_arrays() {
        assert!(parse_string_array("Monday and Friday").is_err());
        assert!(parse_string_array("[1, 2]").is_err());
        assert!(parse_string_array("[\"ok\", ]").is_err());
    }

    #[test]
    fn test_parse_schedule_canonicalizes_and_sorts() {
        let days = parse_schedule(r#"["friday", "Mon", "WEDNESDAY"]"#, 3).unwrap();
        assert_eq!(days, vec!["Monday", "Wednesday", "Friday"]);
    }

    #[test]
    fn test_parse_schedule_checks_count_and_duplicates() {
        assert!(parse_schedule(r#"["Monday", "Friday"]"#, 3).is_err());
        assert!(parse_schedule(r#"["Monday", "monday"]"#, 2).is_err());
        assert!(parse_schedule(r#"["Funday"]"#, 1).is_err());
    }

    #[test]
    fn test_parse_topics_truncates() {
        let topics = parse_topics(r#"["a", "b", "c"]"#, 2).unwrap();
        assert_eq!(topics, vec!["a", "b"]);
        assert!(parse_topics(r#"["a"]"#, 2).is_err());
        assert!(parse_topics("[]", 0).unwrap().is_empty());
    }
}
