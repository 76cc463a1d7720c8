use scholar_core::extract::{ExtractionRules, FieldExtractor};

#[test]
fn merit_scholarship_example() {
    let fx = FieldExtractor::new(ExtractionRules::default()).unwrap();
    let text = "Merit Scholarship for Engineering\nEligibility: Must be enrolled in engineering, income below Rs. 2,50,000";
    let record = fx.extract(text);

    assert_eq!(record.name, "Merit Scholarship for Engineering");
    assert!((record.amount - 250_000.0).abs() < f64::EPSILON);
    assert!(record.eligibility.contains("Must be enrolled in engineering"));
    assert_eq!(record.category, "General");
    assert_eq!(record.source_text, text);
    assert_eq!(record.similarity_score, None);
}

#[test]
fn no_currency_means_zero_amount() {
    let fx = FieldExtractor::new(ExtractionRules::default()).unwrap();
    let record = fx.extract("National Fellowship\nAwarded to 120 students every year");
    assert_eq!(record.amount, 0.0);
}

#[test]
fn misses_leave_defaults() {
    let fx = FieldExtractor::new(ExtractionRules::default()).unwrap();
    let record = fx.extract("Table of contents\nPage 4");
    assert_eq!(record.name, "");
    assert_eq!(record.eligibility, "");
    assert_eq!(record.amount, 0.0);
    assert!(!fx.looks_relevant("Table of contents\nPage 4"));
}

#[test]
fn rupee_symbol_takes_precedence_over_later_patterns() {
    let fx = FieldExtractor::new(ExtractionRules::default()).unwrap();
    let text = "Up to INR 10,000 for books and ₹ 36,000.00 per annum";
    assert_eq!(fx.detect_amount(text), Some(36_000.0));
}

#[test]
fn eligibility_joins_at_most_three_following_lines() {
    let fx = FieldExtractor::new(ExtractionRules::default()).unwrap();
    let text = "Post Matric Scholarship\nEligibility criteria:\nline one\nline two\nline three\nline four";
    assert_eq!(
        fx.detect_eligibility(text).as_deref(),
        Some("Eligibility criteria: line one line two line three")
    );
}

#[test]
fn eligibility_respects_length_cap() {
    let fx = FieldExtractor::new(ExtractionRules::default()).unwrap();
    let filler = "y".repeat(150);
    let text = format!("Qualification: {filler}\n{filler}\nshort");
    let eligibility = fx.detect_eligibility(&text).unwrap();
    assert_eq!(eligibility, format!("Qualification: {filler}"));
}

#[test]
fn source_text_preview_is_200_chars_plus_ellipsis() {
    let fx = FieldExtractor::new(ExtractionRules::default()).unwrap();
    let text = "a".repeat(250);
    let record = fx.extract(&text);
    assert_eq!(record.source_text.chars().count(), 203);
    assert!(record.source_text.ends_with("..."));
}

#[test]
fn custom_rules_are_case_insensitive() {
    let rules = ExtractionRules {
        title_keywords: vec!["YOJANA".into()],
        relevance_keywords: vec!["Pension".into()],
        default_category: "Welfare".into(),
        ..ExtractionRules::default()
    };
    let fx = FieldExtractor::new(rules).unwrap();
    let record = fx.extract("Atal Pension Yojana\nsubscribers aged 18-40");
    assert_eq!(record.name, "Atal Pension Yojana");
    assert_eq!(record.category, "Welfare");
    assert!(fx.looks_relevant("ATAL PENSION"));
}
