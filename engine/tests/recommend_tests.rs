use engine::{Corpus, EngineConfig, Genres, IdfMode, MovieId, RawMovie, Scoring, SimilarityEngine, DEFAULT_K};
use std::sync::Arc;

fn movie(title: &str, overview: &str, genres: &str) -> RawMovie {
    RawMovie {
        title: Some(title.into()),
        overview: Some(overview.into()),
        genres: Some(Genres::Text(genres.into())),
        poster: Some(format!("/posters/{}.jpg", title.to_lowercase().replace(' ', "_"))),
    }
}

fn abc() -> Arc<Corpus> {
    Arc::new(
        Corpus::from_raw(vec![
            movie("A", "space adventure", "SciFi"),
            movie("B", "space war", "SciFi"),
            movie("C", "romantic comedy", "Romance"),
        ])
        .unwrap(),
    )
}

fn catalog() -> Arc<Corpus> {
    Arc::new(
        Corpus::from_raw(vec![
            movie("Star Voyage", "A crew travels through space to find a new home planet", "SciFi|Adventure"),
            movie("Galaxy Raiders", "Pirates raid cargo ships across the galaxy", "SciFi|Action"),
            movie("Love in Paris", "Two strangers fall in love in Paris", "Romance|Drama"),
            movie("Paris Nights", "A romantic comedy of errors set in Paris", "Romance|Comedy"),
            movie("Silent Case", "A detective hunts a killer in a rainy city", "Crime|Thriller"),
            movie("Blank", "", ""),
            movie("Also Blank", "", ""),
            movie("Deep Space", "Astronauts stranded in deep space fight to survive", "SciFi|Thriller"),
        ])
        .unwrap(),
    )
}

fn build(corpus: Arc<Corpus>) -> SimilarityEngine {
    SimilarityEngine::build(corpus, EngineConfig::default()).unwrap()
}

#[test]
fn shared_vocabulary_ranks_first() {
    let engine = build(abc());
    assert_eq!(engine.recommend_titles("A", 2).unwrap(), vec!["B", "C"]);
}

#[test]
fn shared_vocabulary_ranks_first_under_every_weighting() {
    for idf in [IdfMode::Plain, IdfMode::Smoothed] {
        for sublinear in [true, false] {
            for stemming in [true, false] {
                let cfg = EngineConfig::new().with_idf(idf).with_sublinear_tf(sublinear).with_stemming(stemming);
                let engine = SimilarityEngine::build(abc(), cfg).unwrap();
                assert_eq!(engine.recommend_titles("A", 2).unwrap(), vec!["B", "C"], "{cfg:?}");
            }
        }
    }
}

#[test]
fn query_movie_is_never_recommended() {
    let engine = build(catalog());
    for record in engine.corpus().records() {
        let titles = engine.recommend_titles(&record.title, 100).unwrap();
        assert!(!titles.contains(&record.title), "{} recommended itself", record.title);
    }
}

#[test]
fn result_length_is_min_of_k_and_n_minus_one() {
    let engine = build(catalog());
    let n = engine.corpus().len();
    for k in 1..=n + 2 {
        let got = engine.recommend("Star Voyage", k).unwrap();
        assert_eq!(got.len(), k.min(n - 1));
    }
    assert!(engine.recommend("Star Voyage", 0).unwrap().is_empty());
}

#[test]
fn default_k_is_five() {
    let engine = build(catalog());
    assert_eq!(engine.recommend("Deep Space", DEFAULT_K).unwrap().len(), 5);
}

#[test]
fn matrix_has_unit_diagonal_and_is_symmetric() {
    for scoring in [Scoring::Combined, Scoring::hybrid()] {
        let engine = SimilarityEngine::build(catalog(), EngineConfig::new().with_scoring(scoring)).unwrap();
        let m = engine.matrix();
        assert_eq!(m.len(), engine.corpus().len());
        for &a in m.ids() {
            assert!((m.score(a, a).unwrap() - 1.0).abs() < 1e-6);
            for &b in m.ids() {
                let s = m.score(a, b).unwrap();
                assert_eq!(s, m.score(b, a).unwrap());
                assert!((0.0..=1.0 + 1e-6).contains(&s), "score {s} out of range");
            }
        }
    }
}

#[test]
fn builds_are_deterministic() {
    let first = build(catalog());
    let second = build(catalog());
    assert_eq!(first.matrix(), second.matrix());
    for record in first.corpus().records() {
        assert_eq!(first.recommend(&record.title, 7).unwrap(), second.recommend(&record.title, 7).unwrap());
    }
}

#[test]
fn unknown_title_is_not_found() {
    let engine = build(catalog());
    let err = engine.recommend("Movie Not In Corpus", 5).unwrap_err();
    assert_eq!(err.title, "Movie Not In Corpus");
    // the engine stays usable afterwards
    assert!(engine.recommend("Blank", 5).is_ok());
}

#[test]
fn empty_text_yields_zero_vector_and_zero_scores() {
    let engine = build(catalog());
    let blank = engine.corpus().id_of("Blank").unwrap();
    let also_blank = engine.corpus().id_of("Also Blank").unwrap();
    assert!(engine.vector(blank).unwrap().is_zero());
    assert_eq!(engine.matrix().score(blank, also_blank), Some(0.0));
    assert_eq!(engine.matrix().score(blank, blank), Some(1.0));

    let recs = engine.recommend("Blank", 10).unwrap();
    assert_eq!(recs.len(), engine.corpus().len() - 1);
    assert!(recs.iter().all(|r| r.score == 0.0 && !r.score.is_nan()));
    // all ties: corpus order
    let order: Vec<MovieId> = recs.iter().map(|r| r.id).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[test]
fn ties_keep_corpus_order() {
    let corpus = Arc::new(
        Corpus::from_raw(vec![
            movie("Q", "heist", ""),
            movie("Z", "heist", ""),
            movie("M", "heist", ""),
            movie("Other", "unrelated", ""),
        ])
        .unwrap(),
    );
    let engine = build(corpus);
    assert_eq!(engine.recommend_titles("Other", 3).unwrap(), vec!["Q", "Z", "M"]);
    assert_eq!(engine.recommend_titles("M", 3).unwrap(), vec!["Q", "Z", "Other"]);
}

#[test]
fn recommendations_carry_display_metadata() {
    let engine = build(catalog());
    let top = &engine.recommend("Love in Paris", 1).unwrap()[0];
    assert_eq!(top.title, "Paris Nights");
    assert_eq!(top.poster.as_deref(), Some("/posters/paris_nights.jpg"));
    assert_eq!(top.genres, vec!["comedy", "romance"]);
    assert!(top.score > 0.0);
}

#[test]
fn hybrid_scoring_weights_genre_overlap() {
    let corpus = Arc::new(
        Corpus::from_raw(vec![
            movie("Query", "a lonely robot", "Animation|Family"),
            movie("Same Words", "a lonely robot", "Horror"),
            movie("Same Genres", "talking cars race", "Animation|Family"),
        ])
        .unwrap(),
    );
    let overview_heavy = EngineConfig::new().with_scoring(Scoring::Hybrid { overview_weight: 0.9, genre_weight: 0.1 });
    let genre_heavy = EngineConfig::new().with_scoring(Scoring::Hybrid { overview_weight: 0.1, genre_weight: 0.9 });

    let a = SimilarityEngine::build(corpus.clone(), overview_heavy).unwrap();
    assert_eq!(a.recommend_titles("Query", 1).unwrap(), vec!["Same Words"]);
    let b = SimilarityEngine::build(corpus, genre_heavy).unwrap();
    assert_eq!(b.recommend_titles("Query", 1).unwrap(), vec!["Same Genres"]);

    let q = b.corpus().id_of("Query").unwrap();
    let g = b.corpus().id_of("Same Genres").unwrap();
    assert!((b.matrix().score(q, g).unwrap() - 0.9).abs() < 1e-6);
}

#[test]
fn single_movie_corpus_has_no_recommendations() {
    let corpus = Arc::new(Corpus::from_raw(vec![movie("Alone", "solitary", "Drama")]).unwrap());
    let engine = build(corpus);
    assert!(engine.recommend("Alone", 5).unwrap().is_empty());
    assert_eq!(engine.matrix().score(MovieId(0), MovieId(0)), Some(1.0));
}

#[test]
fn empty_corpus_builds() {
    let engine = build(Arc::new(Corpus::from_raw(Vec::new()).unwrap()));
    assert!(engine.matrix().is_empty());
    assert!(engine.recommend("anything", 5).is_err());
}

#[test]
fn sample_dataset_recommends_across_every_title() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../sample_data/movies.csv");
    let corpus = Arc::new(Corpus::load(path).unwrap());
    let engine = build(corpus);
    assert_eq!(engine.recommend_titles("Dragon School", 1).unwrap(), vec!["Kingdom of Ash"]);
    for record in engine.corpus().records() {
        assert_eq!(engine.recommend(&record.title, 3).unwrap().len(), 3);
    }
}
