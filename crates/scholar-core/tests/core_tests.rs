use std::fs;
use std::io::Write;
use tempfile::TempDir;

use figment::providers::{Format, Toml};
use figment::Figment;
use scholar_core::config::{Config, IndexBackend};
use scholar_core::corpus::CorpusLoader;
use scholar_core::error::Error;
use scholar_core::segment::{segment_paragraphs, SegmentMode, Segmenter};
use scholar_core::types::Metric;

#[test]
fn load_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let file_path = dir.join("a.txt");
    let mut f = fs::File::create(&file_path).unwrap();
    writeln!(f, "Short text").unwrap();

    let chunks = CorpusLoader::default().load(dir).expect("load");

    assert_eq!(chunks.len(), 1, "one small paragraph becomes one chunk");
    assert_eq!(chunks[0].text, "Short text");
    assert_eq!(chunks[0].id, "a:0");
    assert_eq!(chunks[0].source_id, "a");
}

#[test]
fn load_walks_directory_in_sorted_order_and_ignores_other_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("nested/b.txt"), "bravo one\n\nbravo two").unwrap();
    fs::write(dir.join("a.txt"), "alpha").unwrap();
    fs::write(dir.join("notes.md"), "ignored").unwrap();

    let loader = CorpusLoader::new(Segmenter::Paragraph { max_chars: 5 });
    let chunks = loader.load(dir).expect("load");

    let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a:0", "b:0", "b:1"]);
    for c in &chunks {
        assert!(c.chunk_index < c.total_chunks);
    }
    assert_eq!(chunks[2].total_chunks, 2);
}

#[test]
fn missing_corpus_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = CorpusLoader::default().load(&tmp.path().join("absent")).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))));
}

#[test]
fn paragraphs_are_preserved_in_order_without_loss_or_duplication() {
    let paragraphs: Vec<String> = (0..25).map(|i| format!("paragraph {i}{}", "z".repeat(i * 7 % 60))).collect();
    let text = paragraphs.join("\n\n\n");
    for max in [1usize, 30, 80, 200, 10_000] {
        let chunks = segment_paragraphs(&text, max);
        let rebuilt: Vec<String> = chunks
            .iter()
            .flat_map(|c| c.split("\n\n").map(str::to_string))
            .collect();
        assert_eq!(rebuilt, paragraphs, "max={max}");
    }
}

#[test]
fn chunks_exceed_cap_only_by_their_last_paragraph() {
    let paragraphs: Vec<String> = (0..40).map(|i| "w".repeat(5 + (i * 13) % 70)).collect();
    let text = paragraphs.join("\n\n");
    let max = 120;
    for chunk in segment_paragraphs(&text, max) {
        let parts: Vec<&str> = chunk.split("\n\n").collect();
        let len = chunk.chars().count();
        let last_len = parts.last().map_or(0, |p| p.chars().count());
        if parts.len() > 1 {
            // the check runs before the joining separator is added
            assert!(len <= max + 2, "multi-paragraph chunk is {len} chars");
        }
        assert!(len <= max + last_len);
    }
}

#[test]
fn settings_default_when_config_is_empty() {
    let config = Config::from_figment(Figment::new());
    let settings = config.settings().expect("settings");
    assert_eq!(settings.recommend.top_n, 3);
    assert_eq!(settings.recommend.candidates, 5);
    assert_eq!(settings.segment.max_chars, 500);
    assert_eq!(settings.index.backend, IndexBackend::Memory);
    assert_eq!(settings.index.metric, Metric::L2);
    assert_eq!(settings.extraction.default_category, "General");
    settings.validate().expect("defaults are valid");
}

#[test]
fn settings_read_from_toml() {
    let toml = r#"
        [segment]
        mode = "words"
        window_words = 120
        overlap_words = 20

        [index]
        backend = "lance"
        metric = "cosine"

        [extraction]
        title_keywords = ["Yojana"]
    "#;
    let config = Config::from_figment(Figment::new().merge(Toml::string(toml)));
    let settings = config.settings().expect("settings");
    assert_eq!(settings.segment.mode, SegmentMode::Words);
    assert_eq!(settings.index.backend, IndexBackend::Lance);
    assert_eq!(settings.index.metric, Metric::Cosine);
    assert_eq!(settings.extraction.title_keywords, vec!["Yojana".to_string()]);
    // untouched rules keep their defaults
    assert_eq!(settings.extraction.eligibility_follow_lines, 3);
    assert_eq!(config.get::<usize>("segment.window_words").unwrap(), 120);
}

#[test]
fn invalid_window_overlap_fails_validation() {
    let toml = "[segment]\nmode = \"words\"\nwindow_words = 10\noverlap_words = 12\n";
    let settings = Config::from_figment(Figment::new().merge(Toml::string(toml))).settings().unwrap();
    assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
}
