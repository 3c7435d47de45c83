//! Keyword counting over the aggregated catalog text.
//!
//! Every thread's subject and body are joined with newlines into one
//! lower-cased haystack. Substring mode counts non-overlapping literal
//! matches left to right; whole-word mode counts literal matches with a
//! word boundary on both sides.

use regex::Regex;

use crate::catalog::Catalog;
use crate::error::Result;

/// How keyword occurrences are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Substring,
    WholeWord,
}

/// Counts keyword occurrences in a catalog.
#[derive(Debug, Clone)]
pub struct KeywordCounter {
    needle: String,
    mode: MatchMode,
    /// Compiled `\b<escaped needle>\b`, only in whole-word mode.
    pattern: Option<Regex>,
}

impl KeywordCounter {
    pub fn new(keyword: &str, whole_word: bool) -> Result<Self> {
        let needle = keyword.to_lowercase();
        let (mode, pattern) = if whole_word && !needle.is_empty() {
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(&needle)))?;
            (MatchMode::WholeWord, Some(re))
        } else if whole_word {
            (MatchMode::WholeWord, None)
        } else {
            (MatchMode::Substring, None)
        };
        Ok(Self {
            needle,
            mode,
            pattern,
        })
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Count occurrences across all subjects and bodies of the catalog.
    pub fn count(&self, catalog: &Catalog) -> usize {
        self.count_lowered(&build_haystack(catalog))
    }

    /// Count occurrences in arbitrary text (lower-cased first).
    pub fn count_in(&self, text: &str) -> usize {
        self.count_lowered(&text.to_lowercase())
    }

    fn count_lowered(&self, haystack: &str) -> usize {
        if self.needle.is_empty() {
            return 0;
        }
        match &self.pattern {
            Some(re) => re.find_iter(haystack).count(),
            None => haystack.matches(self.needle.as_str()).count(),
        }
    }
}

/// Newline-joined, lower-cased subjects and bodies in page then thread order.
pub fn build_haystack(catalog: &Catalog) -> String {
    catalog.text_fields().collect::<Vec<_>>().join("\n").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Page, Thread};

    fn thread(sub: Option<&str>, com: Option<&str>) -> Thread {
        Thread {
            no: None,
            sub: sub.map(String::from),
            com: com.map(String::from),
        }
    }

    fn catalog(pages: Vec<Vec<Thread>>) -> Catalog {
        Catalog {
            pages: pages
                .into_iter()
                .map(|threads| Page {
                    page: None,
                    threads,
                })
                .collect(),
        }
    }

    #[test]
    fn substring_matches_do_not_overlap() {
        let counter = KeywordCounter::new("aa", false).unwrap();
        assert_eq!(counter.count_in("aaaa"), 2);
        assert_eq!(counter.count_in("aaa"), 1);
    }

    #[test]
    fn substring_counts_inside_words() {
        let counter = KeywordCounter::new("happen", false).unwrap();
        assert_eq!(counter.count_in("the happening is happening now"), 2);
    }

    #[test]
    fn whole_word_requires_boundaries() {
        let counter = KeywordCounter::new("happening", true).unwrap();
        assert_eq!(counter.count_in("the happening is happening now"), 2);

        let partial = KeywordCounter::new("happen", true).unwrap();
        assert_eq!(partial.count_in("the happening is happening now"), 0);
    }

    #[test]
    fn whole_word_rejects_underscore_and_digit_neighbours() {
        let counter = KeywordCounter::new("happening", true).unwrap();
        assert_eq!(counter.count_in("_happening happening2 (happening)"), 1);
    }

    #[test]
    fn whole_word_treats_keyword_literally() {
        let counter = KeywordCounter::new("a.b", true).unwrap();
        assert_eq!(counter.count_in("a.b axb a.b"), 2);

        let plus = KeywordCounter::new("c+", false).unwrap();
        assert_eq!(plus.count_in("c++ and c+"), 2);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let counter = KeywordCounter::new("Happening", false).unwrap();
        assert_eq!(counter.count_in("IT IS HAPPENING, happening!"), 2);

        let whole = KeywordCounter::new("Happening", true).unwrap();
        assert_eq!(whole.count_in("...HAPPENING..."), 1);
    }

    #[test]
    fn empty_keyword_counts_zero() {
        assert_eq!(KeywordCounter::new("", false).unwrap().count_in("abc"), 0);
        assert_eq!(KeywordCounter::new("", true).unwrap().count_in("abc"), 0);
    }

    #[test]
    fn empty_catalog_counts_zero() {
        let counter = KeywordCounter::new("happening", false).unwrap();
        assert_eq!(counter.count(&Catalog::default()), 0);
    }

    #[test]
    fn counts_subjects_and_bodies_across_pages() {
        let cat = catalog(vec![
            vec![
                thread(Some("Happening thread"), Some("it is happening")),
                thread(None, Some("nothing here")),
            ],
            vec![thread(Some("HAPPENING"), None)],
        ]);
        let counter = KeywordCounter::new("happening", false).unwrap();
        assert_eq!(counter.count(&cat), 3);
    }

    #[test]
    fn fields_are_separated_by_newlines() {
        // "happen" + "ing" split across subject/body must not join into a match.
        let cat = catalog(vec![vec![thread(Some("happen"), Some("ing"))]]);
        let counter = KeywordCounter::new("happening", false).unwrap();
        assert_eq!(counter.count(&cat), 0);
        assert_eq!(build_haystack(&cat), "happen\ning");
    }
}
