use proptest::prelude::*;
use wordsim_vector::{score, score_detailed, EmbeddingStore, EmbeddingStoreBuilder, Similarity};

const VOCAB: [&str; 6] = ["king", "queen", "dog", "cat", "apple", "phone"];

fn store_from(vectors: &[Vec<f32>]) -> EmbeddingStore {
    let dim = vectors[0].len();
    let mut builder = EmbeddingStoreBuilder::new(dim);
    for (word, vector) in VOCAB.iter().zip(vectors) {
        builder.push(*word, vector).unwrap();
    }
    builder.build().unwrap()
}

fn vectors_strategy() -> impl Strategy<Value = Vec<Vec<f32>>> {
    (2usize..8).prop_flat_map(|dim| {
        prop::collection::vec(prop::collection::vec(0.05f32..1.0, dim), VOCAB.len())
    })
}

fn text_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(
        prop::sample::select(vec!["king", "queen", "dog", "cat", "apple", "phone", "xyzzy", "the"]),
        0..6,
    )
}

proptest! {
    #[test]
    fn prop_score_symmetric(vectors in vectors_strategy(), a in text_strategy(), b in text_strategy()) {
        let store = store_from(&vectors);
        let (a, b) = (a.join(" "), b.join(" "));
        prop_assert_eq!(score(&a, &b, &store), score(&b, &a, &store));
    }

    #[test]
    fn prop_score_bounded(vectors in vectors_strategy(), a in text_strategy(), b in text_strategy()) {
        let store = store_from(&vectors);
        let s = score(&a.join(" "), &b.join(" "), &store);
        prop_assert!((-1.0..=1.0).contains(&s));
    }

    #[test]
    fn prop_word_order_invariant(vectors in vectors_strategy(), a in text_strategy(), b in text_strategy()) {
        let store = store_from(&vectors);
        let reversed: Vec<&str> = a.iter().rev().copied().collect();
        let forward = score(&a.join(" "), &b.join(" "), &store);
        let backward = score(&reversed.join(" "), &b.join(" "), &store);
        prop_assert!((forward - backward).abs() < 1e-5);
    }

    #[test]
    fn prop_identical_texts_score_one(vectors in vectors_strategy(), a in prop::collection::vec(prop::sample::select(VOCAB.to_vec()), 1..6)) {
        let store = store_from(&vectors);
        let text = a.join(" ");
        prop_assert!((score(&text, &text, &store) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn prop_unknown_only_is_undefined(vectors in vectors_strategy(), a in text_strategy()) {
        let store = store_from(&vectors);
        let detail = score_detailed("xyzzy the", &a.join(" "), &store);
        prop_assert_eq!(detail.similarity, Similarity::Undefined);
        prop_assert_eq!(detail.similarity.value(), 0.0);
    }
}
