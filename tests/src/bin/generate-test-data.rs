//! Print a JSON seed suitable for `MockServer::from_seed`

use std::collections::BTreeMap;

use agora_api::{CommentId, NewComment, NewPost, PostId, PostType, Record, Time, Vote, ID_FIELD};
use agora_client::schema;
use chrono::Duration;
use rand::{seq::SliceRandom, Rng};
use serde_json::Value;

const NUM_USERS: usize = 8;
const NUM_COMMUNITIES: usize = 5;
const NUM_POSTS: usize = 40;
const MAX_COMMENTS_PER_POST: usize = 25;

const TITLE_WORDS: usize = 8;
const DESCRIPTION_WORDS: usize = 15;
const BODY_WORDS: usize = 40;
const COMMENT_WORDS: usize = 20;

/// How far in the past the generated activity starts
const HISTORY_DAYS: i64 = 30;

fn gen_name(rng: &mut impl Rng) -> String {
    let word = lipsum::lipsum_words_with_rng(&mut *rng, 1)
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>();
    format!("{}{}", word, rng.gen_range(1..1000))
}

fn gen_names(rng: &mut impl Rng, n: usize) -> Vec<String> {
    let mut names = Vec::with_capacity(n);
    while names.len() < n {
        let name = gen_name(rng);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn gen_time_after(rng: &mut impl Rng, start: Time) -> Time {
    let elapsed = (chrono::Utc::now() - start).num_seconds().max(1);
    start + Duration::seconds(rng.gen_range(0..elapsed))
}

fn gen_votes(rng: &mut impl Rng, r: &mut Record) {
    let vote = *[Vote::Up, Vote::Down, Vote::None]
        .choose(rng)
        .unwrap_or(&Vote::None);
    let mut upvotes = rng.gen_range(0..200u32);
    let mut downvotes = rng.gen_range(0..60u32);
    // The caller's own vote is part of the counts
    match vote {
        Vote::Up => upvotes += 1,
        Vote::Down => downvotes += 1,
        Vote::None => (),
    }
    r.insert(String::from("upvotes"), Value::from(upvotes));
    r.insert(String::from("downvotes"), Value::from(downvotes));
    r.insert(String::from("user_vote"), Value::from(vote.as_str()));
}

fn gen_post(rng: &mut impl Rng, author: &str, community: &str) -> NewPost {
    let post_type = *[PostType::Text, PostType::Image, PostType::Link]
        .choose(rng)
        .unwrap_or(&PostType::Text);
    let image_url = (post_type == PostType::Image)
        .then(|| format!("https://picsum.photos/seed/{}/800/600", rng.gen::<u32>()));
    let link_url = (post_type == PostType::Link)
        .then(|| format!("https://example.org/{}", gen_name(rng)));
    NewPost {
        title: lipsum::lipsum_title_with_rng(&mut *rng)
            .split_whitespace()
            .take(TITLE_WORDS)
            .collect::<Vec<_>>()
            .join(" "),
        content: lipsum::lipsum_words_with_rng(&mut *rng, BODY_WORDS),
        post_type,
        image_url,
        link_url,
        author_username: String::from(author),
        community_name: String::from(community),
    }
}

fn with_id(mut r: Record, id: usize) -> Record {
    r.insert(String::from(ID_FIELD), Value::from(id + 1));
    r
}

fn main() {
    let mut rng = rand::thread_rng();
    let start = chrono::Utc::now() - Duration::days(HISTORY_DAYS);
    let mut seed = BTreeMap::<&str, Vec<Record>>::new();

    // Generate users
    let users = gen_names(&mut rng, NUM_USERS);
    let mut karma = vec![(0i64, 0i64); NUM_USERS];

    // Generate communities
    let communities = gen_names(&mut rng, NUM_COMMUNITIES);
    seed.insert(
        "community",
        communities
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let description = lipsum::lipsum_words_with_rng(&mut rng, DESCRIPTION_WORDS);
                let mut r = schema::new_community_record(name, &description, start);
                r.insert(
                    String::from("member_count"),
                    Value::from(rng.gen_range(1..5000)),
                );
                r.insert(String::from("is_subscribed"), Value::from(rng.gen_bool(0.3)));
                with_id(r, i)
            })
            .collect(),
    );

    // Generate posts, each with a comment tree
    let mut posts = Vec::with_capacity(NUM_POSTS);
    let mut comments = Vec::new();
    for i in 0..NUM_POSTS {
        let author = rng.gen_range(0..NUM_USERS);
        let community = communities.choose(&mut rng).map(String::as_str).unwrap_or("");
        let created = gen_time_after(&mut rng, start);
        let mut post = schema::new_post_record(&gen_post(&mut rng, &users[author], community), created);
        gen_votes(&mut rng, &mut post);
        karma[author].0 += post["upvotes"].as_i64().unwrap_or(0)
            - post["downvotes"].as_i64().unwrap_or(0);
        post.insert(String::from("is_pinned"), Value::from(rng.gen_bool(0.05)));

        // Parents always precede their replies, so every generated thread is a valid forest
        let mut thread: Vec<(usize, Time)> = Vec::new();
        for _ in 0..rng.gen_range(0..=MAX_COMMENTS_PER_POST) {
            let parent = match thread.is_empty() || rng.gen_bool(0.4) {
                true => None,
                false => thread.choose(&mut rng).copied(),
            };
            let after = parent.map(|(_, t)| t).unwrap_or(created);
            let author = rng.gen_range(0..NUM_USERS);
            let c = NewComment {
                post_id: PostId(i as u64 + 1),
                parent_id: parent.map(|(id, _)| CommentId(id as u64 + 1)),
                content: lipsum::lipsum_words_with_rng(&mut rng, COMMENT_WORDS),
                author_username: users[author].clone(),
            };
            let at = gen_time_after(&mut rng, after);
            let mut r = schema::new_comment_record(&c, at);
            gen_votes(&mut rng, &mut r);
            karma[author].1 += r["upvotes"].as_i64().unwrap_or(0)
                - r["downvotes"].as_i64().unwrap_or(0);
            thread.push((comments.len(), at));
            comments.push(with_id(r, comments.len()));
        }
        post.insert(String::from("comment_count"), Value::from(thread.len()));
        posts.push(with_id(post, i));
    }
    seed.insert("post", posts);
    seed.insert("comment", comments);

    seed.insert(
        "user",
        users
            .iter()
            .zip(karma)
            .enumerate()
            .map(|(i, (name, (post_karma, comment_karma)))| {
                let mut r = schema::new_user_record(name, start);
                r.insert(String::from("post_karma"), Value::from(post_karma.max(0)));
                r.insert(
                    String::from("comment_karma"),
                    Value::from(comment_karma.max(0)),
                );
                with_id(r, i)
            })
            .collect(),
    );

    match serde_json::to_string_pretty(&seed) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed serializing the seed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn names_are_varied_and_valid() {
        let mut rng = StdRng::seed_from_u64(42);
        let names = gen_names(&mut rng, 20);
        assert_eq!(names.iter().collect::<HashSet<_>>().len(), 20);
        for n in &names {
            agora_api::validate_name(n).unwrap();
        }
        let words = names
            .iter()
            .map(|n| n.trim_end_matches(|c: char| c.is_ascii_digit()))
            .collect::<HashSet<_>>();
        assert!(words.len() > 1, "all names share one word: {names:?}");
    }
}
