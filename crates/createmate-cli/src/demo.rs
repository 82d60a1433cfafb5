use anyhow::Context as _;
use createmate_core::{StateResponse, UserInput};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const POLL_LIMIT: Duration = Duration::from_secs(180);

/// Scripted walk through a session against a running server.
pub async fn run(base_url: &str, input: UserInput) -> anyhow::Result<()> {
    let base = base_url.trim_end_matches('/');
    let http = reqwest::Client::new();

    println!("Submitting user input to {base}...");
    let message = post(&http, &format!("{base}/user-input"), &input).await?;
    println!("  {message}");

    println!("Waiting for the initial post...");
    let state = poll_state(&http, base, |s| !s.generated_content.is_empty() || !s.errors.is_empty())
        .await?;
    report_errors(&state);
    if let Some(schedule) = &state.schedule {
        println!("Schedule: {}", schedule.posting_days.join(", "));
    }
    print_posts(&state);

    println!("Sending feedback...");
    let feedback = serde_json::json!({ "liked": true, "comments": "Great initial post!" });
    let message = post(&http, &format!("{base}/feedback"), &feedback).await?;
    println!("  {message}");

    let expected = state
        .schedule
        .as_ref()
        .map_or(1, |s| s.posting_days.len());
    println!("Waiting for {expected} posts...");
    let state = poll_state(&http, base, |s| {
        s.generated_content.len() >= expected || s.errors.len() > state.errors.len()
    })
    .await?;
    report_errors(&state);
    println!("Suggested topics: {}", state.suggested_topics.join("; "));
    print_posts(&state);
    Ok(())
}

async fn post<T: serde::Serialize>(
    http: &reqwest::Client,
    url: &str,
    body: &T,
) -> anyhow::Result<String> {
    let resp = http
        .post(url)
        .json(body)
        .send()
        .await
        .with_context(|| format!("POST {url} failed"))?;
    let status = resp.status();
    let json: serde_json::Value = resp.json().await?;
    if !status.is_success() {
        anyhow::bail!("POST {url} returned {status}: {}", json["detail"]);
    }
    Ok(json["message"].as_str().unwrap_or_default().to_string())
}

async fn poll_state(
    http: &reqwest::Client,
    base: &str,
    done: impl Fn(&StateResponse) -> bool,
) -> anyhow::Result<StateResponse> {
    let started = Instant::now();
    loop {
        let state: StateResponse = http
            .get(format!("{base}/state"))
            .send()
            .await
            .context("GET /state failed")?
            .error_for_status()?
            .json()
            .await?;
        if done(&state) {
            return Ok(state);
        }
        if started.elapsed() > POLL_LIMIT {
            anyhow::bail!("Gave up waiting after {}s", POLL_LIMIT.as_secs());
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn report_errors(state: &StateResponse) {
    for error in &state.errors {
        eprintln!("  error: {error}");
    }
}

fn print_posts(state: &StateResponse) {
    for post in &state.generated_content {
        println!("\n=== {} | {} ===\n{}", post.day, post.topic, post.content);
    }
}
