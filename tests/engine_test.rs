//! End-to-end tests of learning and ranking through the public API.
//!
//! Text is written pre-tagged (`surface/pos1/pos2` words) and read back by a
//! fixture tokenizer, so no MeCab install is needed.

use bayes_core::core::scorer::{order_by_score, word_likelihood};
use bayes_core::store::{FileStore, MemoryStore, VocabularyStore};
use bayes_core::tokenizer::{TokenizeError, Tokenizer};
use bayes_core::{BayesEngine, Message, MessageId, Token, WordVector};

struct TaggedTokenizer;

impl Tokenizer for TaggedTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Vec<Token>>, TokenizeError> {
        Ok(text
            .lines()
            .map(|line| {
                line.split_whitespace()
                    .filter_map(|word| {
                        let fields: Vec<&str> = word.split('/').collect();
                        Token::from_fields(&fields[..])
                    })
                    .collect()
            })
            .collect())
    }
}

const KITTEN: &str = "子猫/名詞/一般";
const PUPPY: &str = "子犬/名詞/一般";
const TRAIN: &str = "電車/名詞/一般";

fn memory_engine() -> BayesEngine<MemoryStore, TaggedTokenizer> {
    BayesEngine::new(MemoryStore::new(), TaggedTokenizer)
}

fn add(engine: &BayesEngine<MemoryStore, TaggedTokenizer>, id: MessageId, author: &str, text: &str) {
    assert!(engine.add_message(Message::new(id, author, text)).unwrap());
}

/// Author A: 10 messages, 4 learned, vocabulary {子猫: 3, 子犬: 1}.
/// Author B: 10 messages, none learned.
fn scenario() -> BayesEngine<MemoryStore, TaggedTokenizer> {
    let engine = memory_engine();
    let learned_texts = [
        format!("{KITTEN} {KITTEN}"),
        KITTEN.to_string(),
        PUPPY.to_string(),
        "が/助詞/格助詞".to_string(),
    ];
    for (i, text) in learned_texts.iter().enumerate() {
        add(&engine, i as MessageId + 1, "a", text);
    }
    assert_eq!(engine.learn("a", 10).unwrap(), 4);
    for id in 5..=10 {
        add(&engine, id, "a", TRAIN);
    }
    for id in 11..=20 {
        add(&engine, id, "b", TRAIN);
    }
    engine
}

#[test]
fn end_to_end_scenario_matches_hand_computed_scores() {
    let engine = scenario();
    let model_a = engine.store().get_model("a").unwrap().unwrap();
    assert_eq!(model_a.messages_total, 10);
    assert_eq!(model_a.messages_incorporated, 4);
    assert_eq!(model_a.word_count("子猫"), 3);
    assert_eq!(model_a.word_count("子犬"), 1);

    let scorer = engine.scorer();
    assert_eq!(scorer.author_prior("a").unwrap(), Some(0.5));
    let likelihood = scorer.word_likelihood("a", "子猫").unwrap().unwrap();
    assert!((likelihood - 0.8).abs() < 1e-12);
    assert_eq!(scorer.word_likelihood("b", "子猫").unwrap(), Some(1.0));

    let results = engine.rank(KITTEN, &["a", "b"]).unwrap();
    assert_eq!(results[0].author_id, "a");
    assert_eq!(results[1].author_id, "b");
    let score_a = results[0].score.unwrap();
    let score_b = results[1].score.unwrap();
    assert!((score_a - (0.5f64.ln() + 0.8f64.ln())).abs() < 1e-12);
    assert!((score_a - -0.916).abs() < 1e-3);
    assert!((score_b - -0.693).abs() < 1e-3);
    // message-count smoothing lets the author with no learned data win
    assert!(score_b > score_a);
}

#[test]
fn rank_keeps_unscorable_and_unknown_authors() {
    let engine = scenario();
    engine.register_author("newcomer").unwrap();

    let mut results = engine.rank(KITTEN, &["newcomer", "a", "ghost", "b"]).unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.author_id.as_str()).collect();
    assert_eq!(ids, vec!["newcomer", "a", "ghost", "b"]);
    assert_eq!(results[0].score, None);
    assert_eq!(results[2].score, None);

    order_by_score(&mut results);
    let ids: Vec<&str> = results.iter().map(|r| r.author_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "newcomer", "ghost"]);
}

#[test]
fn empty_store_cannot_classify() {
    let engine = memory_engine();
    engine.register_author("a").unwrap();
    let results = engine.rank_all(KITTEN).unwrap();
    assert_eq!(results.len(), 1);
    assert!(!results[0].is_scorable());
    assert_eq!(engine.scorer().author_prior("a").unwrap(), None);
}

#[test]
fn additional_occurrence_adds_exactly_one_log_likelihood() {
    let engine = scenario();
    let scorer = engine.scorer();
    for word in [KITTEN, PUPPY, TRAIN] {
        let base = scorer.text_score("a", KITTEN).unwrap().unwrap();
        let extended = scorer
            .text_score("a", &format!("{KITTEN} {word}"))
            .unwrap()
            .unwrap();
        let surface = word.split('/').next().unwrap();
        let likelihood = scorer.word_likelihood("a", surface).unwrap().unwrap();
        assert!((extended - base - likelihood.ln()).abs() < 1e-12);
    }
}

#[test]
fn separate_batches_add_up_to_one_batch() {
    let first = format!("{KITTEN} {PUPPY}\n{KITTEN}");
    let second = format!("{TRAIN} {KITTEN}");

    let split = memory_engine();
    add(&split, 1, "a", &first);
    assert_eq!(split.learn("a", 1).unwrap(), 1);
    add(&split, 2, "a", &second);
    assert_eq!(split.learn("a", 1).unwrap(), 1);

    let together = memory_engine();
    add(&together, 1, "a", &format!("{first}\n{second}"));
    together.learn("a", 1).unwrap();

    let split_model = split.store().get_model("a").unwrap().unwrap();
    let together_model = together.store().get_model("a").unwrap().unwrap();
    assert_eq!(split_model.vocabulary, together_model.vocabulary);

    let mut expected = split.vectorize(&first);
    expected.merge(&split.vectorize(&second));
    assert_eq!(split_model.vocabulary, expected);
    assert_eq!(split_model.vocabulary.total(), 5);
}

#[test]
fn repeated_learning_never_recounts_messages() {
    let engine = memory_engine();
    for id in 1..=7 {
        add(&engine, id, "a", KITTEN);
    }

    let mut learned = Vec::new();
    loop {
        let count = engine.learn("a", 3).unwrap();
        learned.push(count);
        let model = engine.store().get_model("a").unwrap().unwrap();
        assert!(model.messages_incorporated <= model.messages_total);
        if count == 0 {
            break;
        }
    }
    assert_eq!(learned, vec![3, 3, 1, 0]);

    let model = engine.store().get_model("a").unwrap().unwrap();
    assert_eq!(model.messages_incorporated, 7);
    assert_eq!(model.word_count("子猫"), 7);
}

#[test]
fn nothing_pending_leaves_model_untouched() {
    let engine = scenario();
    let before = engine.store().get_model("a").unwrap().unwrap();
    engine.learn("a", 10).unwrap();
    let after_first = engine.store().get_model("a").unwrap().unwrap();
    assert_eq!(engine.learn("a", 10).unwrap(), 0);
    let after_second = engine.store().get_model("a").unwrap().unwrap();

    assert_eq!(before.messages_total, after_second.messages_total);
    assert_eq!(after_first, after_second);
    assert!(engine.vectorize("").is_empty());
    assert!(engine.vectorize("a/名詞/一般 123/名詞/数").is_empty());
}

#[test]
fn unseen_word_likelihood_stays_in_unit_interval() {
    let engine = scenario();
    let scorer = engine.scorer();
    for author in ["a", "b"] {
        let p = scorer.word_likelihood(author, "見たことない").unwrap().unwrap();
        assert!(p > 0.0 && p <= 1.0);
    }
    let model = engine.store().get_model("a").unwrap().unwrap();
    assert!((word_likelihood(&model, "見たことない") - 0.2).abs() < 1e-12);
}

#[test]
fn concurrent_learning_of_one_author_counts_each_message_once() {
    let engine = memory_engine();
    for id in 1..=40 {
        add(&engine, id, "a", &format!("{KITTEN} {PUPPY}"));
    }
    for id in 41..=60 {
        add(&engine, id, "b", TRAIN);
    }

    let totals: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = &engine;
                let author = if i % 2 == 0 { "a" } else { "b" };
                scope.spawn(move || {
                    let mut learned = 0;
                    loop {
                        let count = engine.learn(author, 3).unwrap();
                        if count == 0 {
                            return learned;
                        }
                        learned += count;
                    }
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(totals.iter().sum::<usize>(), 60);

    let a = engine.store().get_model("a").unwrap().unwrap();
    assert_eq!(a.messages_incorporated, 40);
    assert_eq!(a.word_count("子猫"), 40);
    assert_eq!(a.word_count("子犬"), 40);
    let b = engine.store().get_model("b").unwrap().unwrap();
    assert_eq!(b.messages_incorporated, 20);
    assert_eq!(b.vocabulary.total(), 20);
}

#[test]
fn file_store_engine_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.bin");

    {
        let engine = BayesEngine::new(FileStore::open(&path).unwrap(), TaggedTokenizer);
        engine.add_message(Message::new(1, "a", KITTEN)).unwrap();
        engine.add_message(Message::new(2, "b", TRAIN)).unwrap();
        let learned = engine.learn_all().unwrap();
        assert_eq!(learned, vec![("a".to_string(), 1), ("b".to_string(), 1)]);
    }

    let engine = BayesEngine::new(FileStore::open(&path).unwrap(), TaggedTokenizer);
    let results = engine.rank_all(KITTEN).unwrap();
    assert!(results[0].score.unwrap() > results[1].score.unwrap());
    let stats = engine.authors().unwrap();
    assert_eq!(stats[0].messages_incorporated, 1);
    assert_eq!(stats[0].vocabulary_size, 1);
    assert_eq!(engine.learn_all().unwrap(), vec![("a".to_string(), 0), ("b".to_string(), 0)]);
}

#[test]
fn fewest_messages_author_is_polled_next() {
    let engine = memory_engine();
    add(&engine, 1, "a", KITTEN);
    add(&engine, 2, "a", KITTEN);
    add(&engine, 3, "b", KITTEN);
    assert_eq!(
        engine.store().author_with_fewest_messages().unwrap(),
        Some("b".to_string())
    );
    let vector: WordVector = engine.vectorize(KITTEN);
    assert_eq!(vector.get("子猫"), 1);
}
