// Job Match: scores catalog profiles against form selections and picks the
// closest one. Two policies behind `ProfileMatcher`: TF-IDF cosine (default)
// and weighted keyword overlap.

pub mod cache;
pub mod engine;
pub mod handlers;
pub mod keyword;
pub mod query;
pub mod text;
pub mod tfidf;
