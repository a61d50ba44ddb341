//! Movie corpus loading.
//!
//! A corpus is an ordered, immutable list of [`MovieRecord`]s. Each record gets a
//! generated [`MovieId`] at load time; every downstream structure addresses movies
//! by that id.

use crate::error::{DataLoadError, LoadResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Stable identifier for a movie within one corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u32);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Genre metadata as it arrives from the source: either free text or a list of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Genres {
    Tags(Vec<String>),
    Text(String),
}

impl Default for Genres {
    fn default() -> Self { Genres::Text(String::new()) }
}

impl Genres {
    /// Text contributed to `combined_text`.
    pub fn text(&self) -> String {
        match self {
            Genres::Text(s) => s.clone(),
            Genres::Tags(tags) => tags.join(" "),
        }
    }

    /// Normalized tag set used for genre overlap.
    ///
    /// Free text is split on `|`, `,` or `/` when any of them is present, otherwise on
    /// whitespace. Tags are trimmed, lowercased, sorted and deduplicated.
    pub fn tags(&self) -> Vec<String> {
        let mut out: Vec<String> = match self {
            Genres::Tags(tags) => tags.iter().map(|t| t.trim().to_lowercase()).collect(),
            Genres::Text(s) => {
                let delimited = s.contains(['|', ',', '/']);
                let parts: Vec<&str> = if delimited {
                    s.split(['|', ',', '/']).collect()
                } else {
                    s.split_whitespace().collect()
                };
                parts.into_iter().map(|t| t.trim().to_lowercase()).collect()
            }
        };
        out.retain(|t| !t.is_empty());
        out.sort();
        out.dedup();
        out
    }
}

/// One input record, before validation. Shared by every source format and by the
/// remote catalog fetcher's JSONL output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMovie {
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Genres>,
    #[serde(default, alias = "poster_path", alias = "poster_url", skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    pub overview: String,
    pub genres: Genres,
    pub poster: Option<String>,
    #[serde(skip)]
    combined_text: String,
}

impl MovieRecord {
    /// `genres + " " + overview`.
    pub fn combined_text(&self) -> &str { &self.combined_text }
}

/// SHA-1 of the corpus content, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CorpusDigest(String);

impl CorpusDigest {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CorpusDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone)]
pub struct Corpus {
    records: Vec<MovieRecord>,
    by_title: HashMap<String, MovieId>,
    digest: CorpusDigest,
}

impl Corpus {
    /// Validate raw records and assign ids in input order.
    ///
    /// Every record needs a non-empty title and titles must be unique.
    pub fn from_raw(raw: Vec<RawMovie>) -> LoadResult<Self> {
        let mut records = Vec::with_capacity(raw.len());
        let mut by_title: HashMap<String, MovieId> = HashMap::with_capacity(raw.len());
        for (index, movie) in raw.into_iter().enumerate() {
            let title = movie.title.unwrap_or_default();
            if title.trim().is_empty() {
                return Err(DataLoadError::EmptyTitle { index });
            }
            let id = MovieId(index as u32);
            if let Some(first) = by_title.get(&title) {
                return Err(DataLoadError::DuplicateTitle { title, first: first.0 as usize, second: index });
            }
            by_title.insert(title.clone(), id);

            let overview = movie.overview.unwrap_or_default();
            let genres = movie.genres.unwrap_or_default();
            let combined_text = format!("{} {}", genres.text(), overview);
            records.push(MovieRecord { id, title, overview, genres, poster: movie.poster, combined_text });
        }
        let digest = digest_records(&records);
        Ok(Self { records, by_title, digest })
    }

    /// Load from a `.csv`, `.json` or `.jsonl` file, or a directory of them.
    pub fn load<P: AsRef<Path>>(source: P) -> LoadResult<Self> {
        let path = source.as_ref();
        let raw = if path.is_dir() {
            let mut files: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|e| e.into_path())
                .filter(|p| p.is_file() && SourceFormat::of(p).is_some())
                .collect();
            files.sort();
            let mut all = Vec::new();
            for file in files {
                all.extend(read_file(&file)?);
            }
            all
        } else if path.is_file() {
            read_file(path)?
        } else {
            return Err(DataLoadError::Missing(path.to_path_buf()));
        };
        let corpus = Self::from_raw(raw)?;
        tracing::info!(source = %path.display(), movies = corpus.len(), digest = %corpus.digest, "loaded corpus");
        Ok(corpus)
    }

    pub fn records(&self) -> &[MovieRecord] { &self.records }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
    pub fn digest(&self) -> &CorpusDigest { &self.digest }

    pub fn get(&self, id: MovieId) -> Option<&MovieRecord> {
        self.records.get(id.0 as usize).filter(|r| r.id == id)
    }

    /// Exact title lookup.
    pub fn id_of(&self, title: &str) -> Option<MovieId> { self.by_title.get(title).copied() }

    pub fn titles(&self) -> impl Iterator<Item = &str> { self.records.iter().map(|r| r.title.as_str()) }
}

fn digest_records(records: &[MovieRecord]) -> CorpusDigest {
    fn field(hasher: &mut Sha1, value: &str) {
        hasher.update((value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    }

    let mut hasher = Sha1::new();
    for r in records {
        field(&mut hasher, &r.title);
        field(&mut hasher, &r.overview);
        // tag lists and free text split differently, so the shape is part of the content
        match &r.genres {
            Genres::Text(text) => {
                hasher.update([0u8]);
                field(&mut hasher, text);
            }
            Genres::Tags(tags) => {
                hasher.update([1u8]);
                hasher.update((tags.len() as u64).to_le_bytes());
                for tag in tags {
                    field(&mut hasher, tag);
                }
            }
        }
        match &r.poster {
            Some(poster) => {
                hasher.update([1u8]);
                field(&mut hasher, poster);
            }
            None => hasher.update([0u8]),
        }
    }
    CorpusDigest(format!("{:x}", hasher.finalize()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFormat {
    Csv,
    Json,
    JsonLines,
}

impl SourceFormat {
    fn of(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("csv") => Some(SourceFormat::Csv),
            Some("json") => Some(SourceFormat::Json),
            Some("jsonl") => Some(SourceFormat::JsonLines),
            _ => None,
        }
    }
}

fn read_file(path: &Path) -> LoadResult<Vec<RawMovie>> {
    match SourceFormat::of(path) {
        Some(SourceFormat::Csv) => read_csv(path),
        Some(SourceFormat::Json) => read_json(path),
        Some(SourceFormat::JsonLines) => read_jsonl(path),
        None => Err(DataLoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn read_csv(path: &Path) -> LoadResult<Vec<RawMovie>> {
    let csv_err = |source| DataLoadError::Csv { path: path.to_path_buf(), source };
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path).map_err(csv_err)?;
    let headers: Vec<String> = reader.headers().map_err(csv_err)?.iter().map(|h| h.trim().to_lowercase()).collect();
    let column = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    let title_col = column(&["title"]).ok_or(DataLoadError::MissingColumn("title"))?;
    let overview_col = column(&["overview"]).ok_or(DataLoadError::MissingColumn("overview"))?;
    let genres_col = column(&["genres", "genre"]);
    let poster_col = column(&["poster", "poster_path", "poster_url"]);

    let mut out = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        let cell = |col: Option<usize>| {
            col.and_then(|c| row.get(c)).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
        };
        out.push(RawMovie {
            title: cell(Some(title_col)),
            overview: cell(Some(overview_col)),
            genres: cell(genres_col).map(Genres::Text),
            poster: cell(poster_col),
        });
    }
    Ok(out)
}

fn read_json(path: &Path) -> LoadResult<Vec<RawMovie>> {
    let malformed = |detail| DataLoadError::Malformed { path: path.to_path_buf(), detail };
    let file = File::open(path).map_err(|source| DataLoadError::Io { path: path.to_path_buf(), source })?;
    let json: Value = serde_json::from_reader(BufReader::new(file))
        .map_err(|source| DataLoadError::Json { path: path.to_path_buf(), source })?;
    let items = match json {
        Value::Array(arr) => arr,
        Value::Object(mut obj) => match obj.remove("results") {
            Some(Value::Array(arr)) => arr,
            Some(_) => return Err(malformed("`results` is not an array")),
            None => vec![Value::Object(obj)],
        },
        _ => return Err(malformed("top-level value is not an array or object")),
    };
    records_from_values(path, items)
}

fn read_jsonl(path: &Path) -> LoadResult<Vec<RawMovie>> {
    let io_err = |source| DataLoadError::Io { path: path.to_path_buf(), source };
    let reader = BufReader::new(File::open(path).map_err(io_err)?);
    let mut items = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() { continue; }
        let value: Value = serde_json::from_str(&line)
            .map_err(|source| DataLoadError::Json { path: path.to_path_buf(), source })?;
        items.push(value);
    }
    records_from_values(path, items)
}

/// A JSON source is missing a column when no record carries the key at all.
fn records_from_values(path: &Path, items: Vec<Value>) -> LoadResult<Vec<RawMovie>> {
    if !items.is_empty() {
        let has_key = |key: &str| items.iter().any(|v| v.get(key).is_some());
        if !has_key("title") { return Err(DataLoadError::MissingColumn("title")); }
        if !has_key("overview") { return Err(DataLoadError::MissingColumn("overview")); }
    }
    items
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(|source| DataLoadError::Json { path: path.to_path_buf(), source }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, overview: Option<&str>, genres: Option<Genres>) -> RawMovie {
        RawMovie { title: Some(title.into()), overview: overview.map(Into::into), genres, poster: None }
    }

    #[test]
    fn combined_text_substitutes_empty_strings() {
        let corpus = Corpus::from_raw(vec![
            raw("A", Some("space adventure"), Some(Genres::Text("SciFi".into()))),
            raw("B", None, None),
            raw("C", Some("heist"), Some(Genres::Tags(vec!["Crime".into(), "Thriller".into()]))),
        ])
        .unwrap();
        let texts: Vec<&str> = corpus.records().iter().map(|r| r.combined_text()).collect();
        assert_eq!(texts, vec!["SciFi space adventure", " ", "Crime Thriller heist"]);
    }

    #[test]
    fn ids_follow_input_order() {
        let corpus = Corpus::from_raw(vec![raw("X", None, None), raw("Y", None, None)]).unwrap();
        assert_eq!(corpus.id_of("Y"), Some(MovieId(1)));
        assert_eq!(corpus.get(MovieId(0)).map(|r| r.title.as_str()), Some("X"));
        assert!(corpus.get(MovieId(7)).is_none());
    }

    #[test]
    fn duplicate_titles_are_rejected() {
        let err = Corpus::from_raw(vec![raw("Dup", None, None), raw("Other", None, None), raw("Dup", None, None)])
            .unwrap_err();
        match err {
            DataLoadError::DuplicateTitle { title, first, second } => {
                assert_eq!((title.as_str(), first, second), ("Dup", 0, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_title_is_rejected() {
        let err = Corpus::from_raw(vec![raw("Ok", None, None), RawMovie::default()]).unwrap_err();
        assert!(matches!(err, DataLoadError::EmptyTitle { index: 1 }));
    }

    #[test]
    fn genre_tags_split_on_delimiters_or_whitespace() {
        assert_eq!(Genres::Text("Action|Sci-Fi".into()).tags(), vec!["action", "sci-fi"]);
        assert_eq!(Genres::Text("Drama, Romance ,".into()).tags(), vec!["drama", "romance"]);
        assert_eq!(Genres::Text("Comedy Drama comedy".into()).tags(), vec!["comedy", "drama"]);
        assert_eq!(Genres::Tags(vec![" Horror ".into(), "".into()]).tags(), vec!["horror"]);
    }

    #[test]
    fn digest_changes_with_content() {
        let a = Corpus::from_raw(vec![raw("A", Some("x"), None)]).unwrap();
        let b = Corpus::from_raw(vec![raw("A", Some("x"), None)]).unwrap();
        let c = Corpus::from_raw(vec![raw("A", Some("y"), None)]).unwrap();
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
    }

    #[test]
    fn digest_distinguishes_genre_shape() {
        let text = Corpus::from_raw(vec![raw("A", None, Some(Genres::Text("Science Fiction".into())))]).unwrap();
        let tags = Corpus::from_raw(vec![raw("A", None, Some(Genres::Tags(vec!["Science Fiction".into()])))]).unwrap();
        let split = Corpus::from_raw(vec![raw("A", None, Some(Genres::Tags(vec!["Science".into(), "Fiction".into()])))])
            .unwrap();
        assert_eq!(text.records()[0].combined_text(), tags.records()[0].combined_text());
        assert_ne!(text.digest(), tags.digest());
        assert_ne!(tags.digest(), split.digest());
    }
}
