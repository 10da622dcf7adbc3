//! Prints a random comment forest for one thread, as the backend would
//! return it from `GET /comments`. Feed the output to `agora-ctl tree`.

use agora_api::{Comment, CommentId, ThreadId, UserId};
use anyhow::Context;
use chrono::{Duration, TimeZone, Utc};
use rand::Rng;

const NUM_USERS: u64 = 5;
const NUM_COMMENTS: u64 = 40;

/// Probability that a comment is a reply rather than top-level
const REPLY_PROBABILITY: f64 = 0.7;

/// Probability that a reply points to a comment that does not exist
const DANGLING_PROBABILITY: f64 = 0.05;

const COMMENT_WORD_COUNT: usize = 12;

fn main() -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();
    let start = Utc
        .timestamp_opt(1_704_067_200, 0)
        .single()
        .context("building start timestamp")?;

    let mut comments = Vec::new();
    for id in 1..=NUM_COMMENTS {
        let parent = match id > 1 && rng.gen_bool(REPLY_PROBABILITY) {
            false => None,
            true if rng.gen_bool(DANGLING_PROBABILITY) => Some(CommentId(NUM_COMMENTS + id)),
            true => Some(CommentId(rng.gen_range(1..id))),
        };
        comments.push(Comment {
            id: CommentId(id),
            thread_id: ThreadId(1),
            parent_comment_id: parent,
            creator_id: UserId(rng.gen_range(1..=NUM_USERS)),
            content: lipsum::lipsum_words(rng.gen_range(1..=COMMENT_WORD_COUNT)),
            created_at: start + Duration::minutes(rng.gen_range(0..10_000)),
            likes: (1..=NUM_USERS)
                .filter(|_| rng.gen_bool(0.2))
                .map(UserId)
                .collect(),
        });
    }

    let out = serde_json::to_string_pretty(&comments).context("serializing comments")?;
    println!("{out}");
    Ok(())
}
