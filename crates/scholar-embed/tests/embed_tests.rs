use scholar_core::config::EmbeddingSettings;
use scholar_core::traits::Embedder;
use scholar_embed::tokenize::{configure_truncation, tokenize_batch};
use scholar_embed::{load_embedder, FakeEmbedder};
use std::str::FromStr;
use tokenizers::Tokenizer;

#[test]
fn fake_embedder_shapes_and_determinism() {
    let settings = EmbeddingSettings { use_fake: true, ..EmbeddingSettings::default() };
    let embedder = load_embedder(&settings).expect("embedder");
    let texts = vec!["merit scholarship".to_string(), "merit scholarship".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 384, "embedding dim is 384");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
    assert_eq!(embedder.embed("merit scholarship").unwrap(), *v1);
}

#[test]
fn batch_preserves_order_and_count() {
    let embedder = FakeEmbedder::new(64);
    let texts: Vec<String> = ["fellowship", "pension yojana", "girl child", ""].iter().map(ToString::to_string).collect();
    let batch = embedder.embed_batch(&texts).unwrap();
    assert_eq!(batch.len(), texts.len());
    for (text, vector) in texts.iter().zip(&batch) {
        assert_eq!(&embedder.embed(text).unwrap(), vector);
    }
    assert!(embedder.embed_batch(&[]).unwrap().is_empty());
}

#[test]
fn shared_words_are_closer_than_disjoint_ones() {
    let e = FakeEmbedder::new(256);
    let q = e.embed("engineering scholarship").unwrap();
    let near = e.embed("scholarship for engineering students").unwrap();
    let far = e.embed("pension scheme for farmers").unwrap();
    let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    assert!(dot(&q, &near) > dot(&q, &far));
}

#[test]
fn missing_model_dir_is_an_error() {
    let settings = EmbeddingSettings {
        model_dir: Some("/definitely/not/a/model/dir".into()),
        ..EmbeddingSettings::default()
    };
    if std::env::var("APP_USE_FAKE_EMBEDDINGS").is_err() {
        assert!(load_embedder(&settings).is_err());
    }
}

const WORD_LEVEL_TOKENIZER: &str = r#"{
    "version": "1.0",
    "truncation": null,
    "padding": null,
    "added_tokens": [],
    "normalizer": null,
    "pre_tokenizer": {"type": "Whitespace"},
    "post_processor": {"type": "BertProcessing", "sep": ["[SEP]", 3], "cls": ["[CLS]", 2]},
    "decoder": null,
    "model": {
        "type": "WordLevel",
        "vocab": {"[PAD]": 0, "[UNK]": 1, "[CLS]": 2, "[SEP]": 3, "a": 4, "b": 5},
        "unk_token": "[UNK]"
    }
}"#;

#[test]
fn truncated_rows_keep_cls_and_sep() {
    let mut tokenizer = Tokenizer::from_str(WORD_LEVEL_TOKENIZER).expect("tokenizer json");
    configure_truncation(&mut tokenizer, 5).expect("truncation");
    let texts = vec!["a b a b a b a b".to_string(), "b".to_string()];
    let (ids, mask) = tokenize_batch(&tokenizer, &texts, 0, &candle_core::Device::Cpu).expect("tokenize");
    let ids = ids.to_vec2::<u32>().unwrap();
    let mask = mask.to_vec2::<u32>().unwrap();

    assert_eq!(ids[0], vec![2, 4, 5, 4, 3]);
    assert_eq!(mask[0], vec![1, 1, 1, 1, 1]);
    assert_eq!(ids[1], vec![2, 5, 3, 0, 0]);
    assert_eq!(mask[1], vec![1, 1, 1, 0, 0]);
}
