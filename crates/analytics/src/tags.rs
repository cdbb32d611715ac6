//! User tags: vocabulary queries and per-movie tag lists.

use crate::movies::Catalog;
use crate::ranking::{OrderedGroups, checked_limit, count_in_order, top_n};
use crate::ratings::RatingStore;
use crate::stats::{mean, round_to};
use data_loader::{MovieId, TagRecord, parser};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Loaded tags.csv rows
#[derive(Debug, Clone, Default)]
pub struct TagStore {
    /// Distinct tags, alphabetical
    vocabulary: BTreeSet<String>,
    /// Every tag occurrence in file order
    tag_list: Vec<String>,
    /// Tags of each movie, movies in first-seen order
    movie_tags: Vec<(MovieId, Vec<String>)>,
}

fn word_count(tag: &str) -> usize {
    tag.split_whitespace().count()
}

fn char_len(tag: &str) -> usize {
    tag.chars().count()
}

impl TagStore {
    pub fn new(records: Vec<TagRecord>) -> Self {
        let mut vocabulary = BTreeSet::new();
        let mut tag_list = Vec::with_capacity(records.len());
        let mut groups = OrderedGroups::new();
        for record in records {
            vocabulary.insert(record.tag.clone());
            tag_list.push(record.tag.clone());
            groups.push(record.movie_id, record.tag);
        }
        Self {
            vocabulary,
            tag_list,
            movie_tags: groups.into_vec(),
        }
    }

    /// Load tags.csv, keeping only tags on `admissible` movies when given
    pub fn load(
        path: &Path,
        max_rows: Option<usize>,
        admissible: Option<&HashSet<MovieId>>,
    ) -> data_loader::Result<Self> {
        Ok(Self::new(parser::load_tags(path, max_rows, admissible)?))
    }

    pub fn len(&self) -> usize {
        self.tag_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tag_list.is_empty()
    }

    /// Tags of every tagged movie, movies in first-seen order
    pub fn movie_tags(&self) -> &[(MovieId, Vec<String>)] {
        &self.movie_tags
    }

    fn tags_of(&self, movie_id: MovieId) -> Option<&[String]> {
        self.movie_tags
            .iter()
            .find(|(id, _)| *id == movie_id)
            .map(|(_, tags)| tags.as_slice())
    }

    /// Distinct tags with the most words; ties alphabetical
    pub fn most_words(&self, n: i64) -> Vec<(String, usize)> {
        let Some(n) = checked_limit(n, "most_words") else {
            return Vec::new();
        };
        // The vocabulary is already alphabetical, so a stable sort keeps ties in order
        let counts = self
            .vocabulary
            .iter()
            .map(|tag| (tag.clone(), word_count(tag)))
            .collect();
        top_n(counts, n)
    }

    /// Longest distinct tags by character count; ties alphabetical
    pub fn longest(&self, n: i64) -> Vec<String> {
        let Some(n) = checked_limit(n, "longest") else {
            return Vec::new();
        };
        let lengths = self
            .vocabulary
            .iter()
            .map(|tag| (tag.clone(), char_len(tag)))
            .collect();
        top_n(lengths, n).into_iter().map(|(tag, _)| tag).collect()
    }

    /// Tags that are both among the `n` wordiest and the `n` longest
    pub fn most_words_and_longest(&self, n: i64) -> Vec<String> {
        let wordiest: HashSet<String> = self
            .most_words(n)
            .into_iter()
            .map(|(tag, _)| tag)
            .collect();
        let mut both: Vec<String> = self
            .longest(n)
            .into_iter()
            .filter(|tag| wordiest.contains(tag))
            .collect();
        both.sort_by(|a, b| {
            word_count(b)
                .cmp(&word_count(a))
                .then_with(|| char_len(b).cmp(&char_len(a)))
                .then_with(|| a.cmp(b))
        });
        both
    }

    /// Most used tags by number of occurrences
    pub fn most_popular(&self, n: i64) -> Vec<(String, usize)> {
        let Some(n) = checked_limit(n, "most_popular") else {
            return Vec::new();
        };
        top_n(count_in_order(self.tag_list.iter().cloned()), n)
    }

    /// Distinct tags containing `word`, ignoring case, sorted
    pub fn tags_with(&self, word: &str) -> Vec<String> {
        let needle = word.to_lowercase();
        self.vocabulary
            .iter()
            .filter(|tag| tag.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Number of tags per catalog movie, as (title, count), most tagged first
    pub fn tag_statistics(&self, catalog: &Catalog) -> Vec<(String, usize)> {
        let counts = self
            .movie_tags
            .iter()
            .filter_map(|(id, tags)| catalog.title(*id).map(|t| (t.to_string(), tags.len())))
            .collect();
        top_n(counts, usize::MAX)
    }

    /// Tags attached to the movie titled `title`
    pub fn tags_for_movie(&self, title: &str, catalog: &Catalog) -> Vec<String> {
        let Some(movie_id) = catalog.movie_id_by_title(title) else {
            info!("Movie '{}' not found", title);
            return Vec::new();
        };
        self.tags_of(movie_id).map(<[String]>::to_vec).unwrap_or_default()
    }

    /// Best rated movies carrying a tag that contains `tag`, ignoring case.
    ///
    /// Each movie is scored by the mean of all its ratings, rounded to 2
    /// decimals. Movies without ratings are left out.
    pub fn top_movies_by_tag(
        &self,
        tag: &str,
        ratings: &RatingStore,
        catalog: &Catalog,
        n: i64,
    ) -> Vec<(String, f64)> {
        let Some(n) = checked_limit(n, "top_movies_by_tag") else {
            return Vec::new();
        };
        let needle = tag.to_lowercase();

        let mut scores = Vec::new();
        for (movie_id, tags) in &self.movie_tags {
            if !tags.iter().any(|t| t.to_lowercase().contains(&needle)) {
                continue;
            }
            let Some(title) = catalog.title(*movie_id) else {
                continue;
            };
            let values = ratings.ratings_for_movies(&[*movie_id]);
            if values.is_empty() {
                debug!("No ratings for tagged movie {}", movie_id);
                continue;
            }
            scores.push((title.to_string(), round_to(mean(&values), 2)));
        }
        top_n(scores, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{MovieRecord, RatingEvent};
    use std::sync::Arc;

    fn tag(user_id: u32, movie_id: MovieId, tag: &str) -> TagRecord {
        TagRecord {
            user_id,
            movie_id,
            tag: tag.to_string(),
            timestamp: 1_445_714_994,
        }
    }

    fn create_test_store() -> TagStore {
        TagStore::new(vec![
            tag(2, 60756, "funny"),
            tag(2, 60756, "Highly quotable"),
            tag(2, 60756, "will ferrell"),
            tag(2, 89774, "Boxing story"),
            tag(2, 89774, "MMA"),
            tag(7, 48516, "way too long"),
            tag(18, 431, "Al Pacino"),
            tag(18, 431, "gangster"),
            tag(18, 431, "funny"),
            tag(21, 1, "music"),
            tag(21, 1, "Musical score"),
            tag(62, 2, "great soundtrack music"),
        ])
    }

    fn create_test_catalog() -> Catalog {
        let movie = |id, title: &str| MovieRecord {
            id,
            title: title.to_string(),
            genres: vec!["Comedy".to_string()],
        };
        Catalog::new(vec![
            movie(1, "Toy Story (1995)"),
            movie(2, "Jumanji (1995)"),
            movie(431, "Carlito's Way (1993)"),
            movie(60756, "Step Brothers (2008)"),
        ])
    }

    #[test]
    fn test_most_words_ties_alphabetical() {
        let store = create_test_store();
        let top = store.most_words(3);
        assert_eq!(
            top,
            vec![
                ("great soundtrack music".to_string(), 3),
                ("way too long".to_string(), 3),
                ("Al Pacino".to_string(), 2)
            ]
        );
        assert!(store.most_words(-1).is_empty());
    }

    #[test]
    fn test_longest() {
        let store = create_test_store();
        assert_eq!(
            store.longest(2),
            vec!["great soundtrack music".to_string(), "Highly quotable".to_string()]
        );
    }

    #[test]
    fn test_most_words_and_longest() {
        let store = create_test_store();
        // Wordiest 3: "great soundtrack music", "way too long", "Al Pacino"
        // Longest 3: "great soundtrack music", "Highly quotable", "Musical score"
        assert_eq!(
            store.most_words_and_longest(3),
            vec!["great soundtrack music".to_string()]
        );
    }

    #[test]
    fn test_most_words_and_longest_orders_by_words_then_length() {
        let store = TagStore::new(vec![
            tag(3, 1, "gory horror film"),
            tag(3, 1, "slow burning thriller"),
            tag(3, 2, "one two three four"),
            tag(3, 2, "cinematography"),
            tag(3, 2, "ok"),
        ]);
        // Longest 3: "slow burning thriller" (21), "one two three four" (18),
        // "gory horror film" (16); all three are also the wordiest.
        assert_eq!(
            store.most_words_and_longest(3),
            vec![
                "one two three four".to_string(),
                "slow burning thriller".to_string(),
                "gory horror film".to_string()
            ]
        );
    }

    #[test]
    fn test_most_popular_ties_first_seen() {
        let store = create_test_store();
        assert_eq!(
            store.most_popular(2),
            vec![("funny".to_string(), 2), ("Highly quotable".to_string(), 1)]
        );
    }

    #[test]
    fn test_tags_with_is_sorted_and_case_insensitive() {
        let store = create_test_store();
        let found = store.tags_with("MUSIC");
        assert_eq!(
            found,
            vec![
                "Musical score".to_string(),
                "great soundtrack music".to_string(),
                "music".to_string()
            ]
        );
        assert!(found.windows(2).all(|w| w[0] <= w[1]));
        assert!(store.tags_with("opera").is_empty());
    }

    #[test]
    fn test_tag_statistics_only_catalog_movies() {
        let store = create_test_store();
        let catalog = create_test_catalog();
        assert_eq!(
            store.tag_statistics(&catalog),
            vec![
                ("Step Brothers (2008)".to_string(), 3),
                ("Carlito's Way (1993)".to_string(), 3),
                ("Toy Story (1995)".to_string(), 2),
                ("Jumanji (1995)".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_tags_for_movie() {
        let store = create_test_store();
        let catalog = create_test_catalog();
        assert_eq!(
            store.tags_for_movie("carlito's way (1993)", &catalog),
            vec!["Al Pacino", "gangster", "funny"]
        );
        assert!(store.tags_for_movie("Unknown (2000)", &catalog).is_empty());
        // Known movie without tags
        let mut bare = create_test_catalog().get_movies().to_vec();
        bare.push(MovieRecord {
            id: 5,
            title: "Heat (1995)".to_string(),
            genres: Vec::new(),
        });
        assert!(store.tags_for_movie("Heat (1995)", &Catalog::new(bare)).is_empty());
    }

    #[test]
    fn test_top_movies_by_tag() {
        let store = create_test_store();
        let catalog = Arc::new(create_test_catalog());
        let rating = |movie_id, rating| RatingEvent {
            user_id: 1,
            movie_id,
            rating,
            timestamp: 964_982_703,
        };
        let ratings = RatingStore::new(
            vec![
                rating(60756, 3.0),
                rating(60756, 4.0),
                rating(431, 4.5),
                rating(1, 5.0),
            ],
            Arc::clone(&catalog),
        );

        assert_eq!(
            store.top_movies_by_tag("FUNNY", &ratings, &catalog, 10),
            vec![
                ("Carlito's Way (1993)".to_string(), 4.5),
                ("Step Brothers (2008)".to_string(), 3.5)
            ]
        );
        // Jumanji is tagged "great soundtrack music" but has no ratings
        assert_eq!(
            store.top_movies_by_tag("music", &ratings, &catalog, 10),
            vec![("Toy Story (1995)".to_string(), 5.0)]
        );
        assert!(store.top_movies_by_tag("funny", &ratings, &catalog, -5).is_empty());
    }
}
