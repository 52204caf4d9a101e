use sqlx::SqlitePool;

use crate::{
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Recommendation, ReviewWithGame},
    services::{providers::TextGenerator, reviews},
};

const RECS_CACHE_TTL: u64 = 3600; // 1 hour

/// Generates recommendations for an account from its stored reviews
///
/// With no reviews on file this returns a single sentinel record and never
/// touches the generation service. Otherwise the service is called exactly
/// once per request -- no retry, no backoff -- and both a failed call and an
/// unparseable response degrade to a sentinel record, so the caller always
/// receives at least one renderable entry.
pub async fn generate(
    pool: &SqlitePool,
    generator: &dyn TextGenerator,
    user_id: i64,
    limit: usize,
) -> AppResult<Vec<Recommendation>> {
    let review_rows = reviews::list_reviews(pool, user_id).await?;

    if review_rows.is_empty() {
        return Ok(vec![Recommendation::no_reviews()]);
    }

    let prompt = build_prompt(&review_rows, limit);

    let text = match generator.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Generation call failed");
            return Ok(vec![Recommendation::generation_failed()]);
        }
    };

    match parse_recommendations(&text) {
        Ok(mut records) => {
            records.truncate(limit);
            tracing::info!(user_id, count = records.len(), "Recommendations generated");
            Ok(records)
        }
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Generated text yielded no records");
            Ok(vec![Recommendation::parse_failed()])
        }
    }
}

/// Read-through wrapper around [`generate`] with a per-account cache entry
///
/// A cache read failure counts as a miss; recommendations must keep working
/// when the cache is unreachable.
pub async fn cached_recommendations(
    pool: &SqlitePool,
    generator: &dyn TextGenerator,
    cache: &Cache,
    user_id: i64,
    limit: usize,
) -> AppResult<Vec<Recommendation>> {
    let key = CacheKey::Recommendations(user_id);

    match cache.fetch::<Vec<Recommendation>>(&key).await {
        Ok(Some(cached)) => {
            tracing::debug!(user_id, "Recommendation cache hit");
            return Ok(cached);
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Recommendation cache read failed");
        }
    }

    let records = generate(pool, generator, user_id, limit).await?;
    cache.write_behind(&key, &records, RECS_CACHE_TTL);

    Ok(records)
}

/// Drops the account's cached recommendations so the next read regenerates
///
/// An unreachable cache is logged and ignored: the refresh path regenerates
/// either way, and a cache outage must not fail the request.
pub async fn invalidate_cached(cache: &Cache, user_id: i64) {
    if let Err(e) = cache.invalidate(&CacheKey::Recommendations(user_id)).await {
        tracing::warn!(user_id, error = %e, "Recommendation cache invalidation failed");
    }
}

/// Builds the generation prompt from the account's reviews
///
/// The three-line output shape the parser expects is spelled out in the
/// prompt rather than assumed.
fn build_prompt(reviews: &[ReviewWithGame], limit: usize) -> String {
    let review_lines = reviews
        .iter()
        .map(|r| format!("{}: {} (Rating: {}/5)", r.game_name, r.review_text, r.rating))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on these game reviews, recommend {limit} Steam games the user should try. \
         Only recommend games available on Steam, and never a game that already appears \
         in the reviews below.\n\
         For each recommendation output exactly three lines: the game's name, a short \
         description, and a line starting with \"Genres:\" listing its genres. Separate \
         recommendations with a blank line.\n\n\
         {review_lines}\n"
    )
}

/// Parses free-form generated text into structured records
///
/// Blank lines split the text into blocks; within a block, non-blank lines
/// are consumed three at a time as (name, description, genres), with
/// markdown emphasis stripped from the name and a literal "Genres:" label
/// stripped from the third line. Incomplete trailing groups are dropped per
/// block, so one malformed block cannot misalign the records after it. A
/// response that yields no complete record at all is a `ParseFailure`.
fn parse_recommendations(text: &str) -> AppResult<Vec<Recommendation>> {
    let mut records = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in text.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !block.is_empty() {
                collect_block(&block, &mut records);
                block.clear();
            }
        } else {
            block.push(line);
        }
    }

    if records.is_empty() {
        return Err(AppError::ParseFailure(format!(
            "No complete records in {} chars of generated text",
            text.len()
        )));
    }

    Ok(records)
}

/// Consumes one block's lines in groups of three
fn collect_block(lines: &[&str], records: &mut Vec<Recommendation>) {
    for group in lines.chunks(3) {
        let [name_line, description_line, genres_line] = group else {
            // Incomplete tail; dropped rather than borrowed from the next block.
            continue;
        };

        let name = clean_name(name_line);
        let description = description_line.trim().to_string();
        let genres = strip_genres_label(genres_line).trim().to_string();

        if name.is_empty() || description.is_empty() || genres.is_empty() {
            continue;
        }

        records.push(Recommendation {
            name,
            description,
            genres,
        });
    }
}

/// Strips list numbering and markdown emphasis from a name line
fn clean_name(raw: &str) -> String {
    let mut s = raw.trim();

    // Leading bullet markers
    s = s.trim_start_matches(['-', '*', '•']).trim_start();

    // Leading list numbering like "3." or "3)"
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &s[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            s = stripped.trim_start();
        }
    }

    s.trim_matches(|c| matches!(c, '*' | '_' | '`' | '#'))
        .trim()
        .to_string()
}

/// Strips a leading "Genres:" label, case-insensitively, when present
fn strip_genres_label(raw: &str) -> &str {
    let trimmed = raw.trim();
    const LABEL: &str = "genres:";
    match trimmed.get(..LABEL.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(LABEL) => &trimmed[LABEL.len()..],
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{sqlite::create_memory_pool, init_schema};
    use crate::services::accounts;

    mockall::mock! {
        pub Generator {}

        #[async_trait::async_trait]
        impl TextGenerator for Generator {
            async fn generate(&self, prompt: &str) -> AppResult<String>;
        }
    }

    async fn test_pool_with_reviews(entries: &[(&str, &str, &str, i64)]) -> (SqlitePool, i64) {
        let pool = create_memory_pool().await.unwrap();
        init_schema(&pool).await.unwrap();
        let user_id = accounts::register(&pool, "alice", "pw").await.unwrap().user_id;
        for (app_id, name, text, rating) in entries {
            reviews::upsert_review(&pool, user_id, app_id, name, text, *rating)
                .await
                .unwrap();
        }
        (pool, user_id)
    }

    #[test]
    fn test_parse_two_records_without_blank_lines() {
        let text = "Name\nDesc\nGenres: X\nName2\nDesc2\nGenres: Y";
        let records = parse_recommendations(text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Name");
        assert_eq!(records[0].description, "Desc");
        assert_eq!(records[0].genres, "X");
        assert_eq!(records[1].name, "Name2");
        assert_eq!(records[1].description, "Desc2");
        assert_eq!(records[1].genres, "Y");
    }

    #[test]
    fn test_parse_two_line_response_fails() {
        let err = parse_recommendations("Name\nDesc").unwrap_err();
        assert!(matches!(err, AppError::ParseFailure(_)));
    }

    #[test]
    fn test_parse_blank_line_separated_blocks() {
        let text =
            "Hades\nA roguelike.\nGenres: Action\n\nCeleste\nA platformer.\nGenres: Platformer";
        let records = parse_recommendations(text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "Celeste");
        assert_eq!(records[1].genres, "Platformer");
    }

    #[test]
    fn test_parse_malformed_block_does_not_misalign_the_rest() {
        // The middle block has only two lines; it must be dropped without
        // shifting the third block's lines.
        let text = "Hades\nA roguelike.\nGenres: Action\n\nOrphan line\nsecond orphan\n\nCeleste\nA platformer.\nGenres: Platformer";
        let records = parse_recommendations(text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Hades");
        assert_eq!(records[1].name, "Celeste");
    }

    #[test]
    fn test_parse_strips_markup_and_numbering() {
        let text = "**1. Elden Ring**\nAn open-world action RPG.\ngenres: RPG, Souls-like";
        let records = parse_recommendations(text).unwrap();

        assert_eq!(records[0].name, "Elden Ring");
        assert_eq!(records[0].genres, "RPG, Souls-like");
    }

    #[test]
    fn test_parse_rejects_record_with_empty_field() {
        // Genres line holds only the label, so the record is incomplete.
        let text = "Hades\nA roguelike.\nGenres:";
        let err = parse_recommendations(text).unwrap_err();
        assert!(matches!(err, AppError::ParseFailure(_)));
    }

    #[test]
    fn test_build_prompt_embeds_reviews_and_limit() {
        let entries = vec![ReviewWithGame {
            review_id: 1,
            game_name: "Dota 2".to_string(),
            review_text: "Endless.".to_string(),
            rating: 4,
            created_at: chrono::Utc::now(),
        }];

        let prompt = build_prompt(&entries, 7);
        assert!(prompt.contains("recommend 7 Steam games"));
        assert!(prompt.contains("Dota 2: Endless. (Rating: 4/5)"));
    }

    #[tokio::test]
    async fn test_no_reviews_returns_sentinel_without_external_call() {
        let (pool, user_id) = test_pool_with_reviews(&[]).await;

        let mut generator = MockGenerator::new();
        generator.expect_generate().times(0);

        let records = generate(&pool, &generator, user_id, 10).await.unwrap();
        assert_eq!(records, vec![Recommendation::no_reviews()]);
    }

    #[tokio::test]
    async fn test_unparseable_response_returns_parse_failed_sentinel() {
        let (pool, user_id) = test_pool_with_reviews(&[("570", "Dota 2", "Endless.", 4)]).await;

        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_| Ok("Sorry, I cannot help with that.".to_string()));

        let records = generate(&pool, &generator, user_id, 10).await.unwrap();
        assert_eq!(records, vec![Recommendation::parse_failed()]);
    }

    #[tokio::test]
    async fn test_generation_failure_returns_error_sentinel() {
        let (pool, user_id) = test_pool_with_reviews(&[("570", "Dota 2", "Endless.", 4)]).await;

        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_| Err(AppError::ExternalApi("model overloaded".to_string())));

        let records = generate(&pool, &generator, user_id, 10).await.unwrap();
        assert_eq!(records, vec![Recommendation::generation_failed()]);
    }

    #[tokio::test]
    async fn test_results_truncated_to_limit() {
        let (pool, user_id) = test_pool_with_reviews(&[("570", "Dota 2", "Endless.", 4)]).await;

        let mut generator = MockGenerator::new();
        generator.expect_generate().returning(|_| {
            Ok("A\nda\nGenres: X\n\nB\ndb\nGenres: Y\n\nC\ndc\nGenres: Z".to_string())
        });

        let records = generate(&pool, &generator, user_id, 2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "A");
        assert_eq!(records[1].name, "B");
    }
}
