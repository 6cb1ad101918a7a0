//! Client-facing search: the `search-data.json` document set and the scorer
//! that ranks it.

mod index;
mod scorer;

pub use index::{EXCERPT_MAX_CHARS, SearchData, SearchDocument, build_search_data};
pub use scorer::{DEFAULT_MAX_RESULTS, SearchResult, normalize_query, score_document, search};
