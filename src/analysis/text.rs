// src/analysis/text.rs
// =============================================================================
// Turns page markup into words.
//
// Steps:
// 1. Replace every <...> tag with a space
// 2. Lower-case the rest
// 3. Keep whole runs of ASCII letters (so "don't" gives "don" and "t",
//    and "abc123" gives nothing)
//
// Every token counts toward the page length. Only tokens longer than two
// letters that are not stopwords count toward word frequencies.
// =============================================================================

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const ENGLISH_STOPWORDS: &str = "a about above after again against all am an and any are aren't as at be \
because been before being below between both but by can't cannot could couldn't did didn't do does doesn't \
doing don't down during each few for from further had hadn't has hasn't have haven't having he he'd he'll \
he's her here here's hers herself him himself his how how's i i'd i'll i'm i've if in into is isn't it it's \
its itself let's me more most mustn't my myself no nor not of off on once only or other ought our ours \
ourselves out over own same shan't she she'd she'll she's should shouldn't so some such than that that's \
the their theirs them themselves then there there's these they they'd they'll they're they've this those \
through to under until up very was wasn't we we'd we'll we're we've were weren't what what's when when's \
where where's which while who who's whom why why's with won't would wouldn't you you'd you'll you're \
you've your yours yourself yourselves";

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is a valid regex"))
}

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\b[a-z]+\b").expect("word pattern is a valid regex"))
}

#[derive(Debug, Clone)]
pub struct Stopwords(HashSet<String>);

impl Stopwords {
    pub fn english() -> Self {
        ENGLISH_STOPWORDS.split_whitespace().collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::english()
    }
}

impl<'a> FromIterator<&'a str> for Stopwords {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_lowercase).collect())
    }
}

// The words of one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageWords {
    /// Every alphabetic token, stopwords included
    pub total: usize,
    /// Tokens that count toward word frequencies, in document order
    pub counted: Vec<String>,
}

impl PageWords {
    pub fn analyze(content: &str, stopwords: &Stopwords) -> Self {
        let text = tag_pattern().replace_all(content, " ").to_lowercase();

        let mut words = Self::default();
        for token in word_pattern().find_iter(&text).map(|m| m.as_str()) {
            words.total += 1;
            if token.len() > 2 && !stopwords.contains(token) {
                words.counted.push(token.to_string());
            }
        }
        words
    }
}
