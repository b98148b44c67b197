use ttrunc_core::{EncodingRef, ModelLimits, Strategy, Tokenizer, TruncateError};
use ttrunc_tokens::{TiktokenTokenizer, count_tokens, truncate, truncate_to_model_limit, truncator_for};

fn encodings() -> Vec<EncodingRef> {
    vec![
        EncodingRef::encoding("cl100k_base"),
        EncodingRef::encoding("o200k_base"),
        EncodingRef::model("text-embedding-3-large"),
    ]
}

fn sample_texts() -> Vec<String> {
    vec![
        "The quick brown fox jumps over the lazy dog. ".repeat(20),
        "fn main() {\n    let xs: Vec<u32> = (0..10).collect();\n    println!(\"{xs:?}\");\n}\n"
            .repeat(5),
        "naïve café, Straße, 東京タワー, Привет мир, 🦀🦀🦀 ".repeat(8),
        "a".to_string(),
    ]
}

#[test]
fn test_within_budget_is_unchanged() {
    for encoding in encodings() {
        for text in sample_texts() {
            let natural = count_tokens(&text, &encoding).unwrap();
            for budget in [natural, natural + 1, natural * 3] {
                let result = truncate(&text, budget as i64, &encoding).unwrap();
                assert_eq!(result, text, "{encoding} at {budget}");
            }
        }
    }
}

#[test]
fn test_zero_budget_and_empty_text() {
    for encoding in encodings() {
        for text in sample_texts() {
            assert_eq!(truncate(&text, 0, &encoding).unwrap(), "");
        }
        assert_eq!(truncate("", 100, &encoding).unwrap(), "");
    }
}

#[test]
fn test_negative_budget_is_invalid_argument() {
    let encoding = EncodingRef::encoding("cl100k_base");
    assert!(matches!(
        truncate("some text", -1, &encoding),
        Err(TruncateError::InvalidArgument(_))
    ));

    // Rejected before the encoding is even looked at
    let bogus = EncodingRef::encoding("bogus_base");
    assert!(matches!(
        truncate("some text", -5, &bogus),
        Err(TruncateError::InvalidArgument(_))
    ));
}

#[test]
fn test_unknown_encoding_is_configuration_error() {
    for encoding in [
        EncodingRef::encoding("bogus_base"),
        EncodingRef::model("definitely-not-a-model"),
    ] {
        assert!(matches!(
            truncate("some text", 5, &encoding),
            Err(TruncateError::UnknownEncoding(_))
        ));
    }
}

#[test]
fn test_results_fit_budget_for_both_strategies() {
    for encoding in encodings() {
        let tokenizer = TiktokenTokenizer::for_ref(&encoding).unwrap();
        for strategy in [Strategy::Decode, Strategy::Bisect] {
            let truncator = truncator_for(&encoding, strategy).unwrap();
            for text in sample_texts() {
                let natural = tokenizer.count(&text);
                for budget in (0..=natural).step_by(3) {
                    let result = truncator.truncate(&text, budget).unwrap();
                    assert!(text.starts_with(result));
                    assert!(
                        tokenizer.count(result) <= budget,
                        "{strategy:?} {encoding} over budget {budget}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_bisect_stops_at_the_first_overflow() {
    let encoding = EncodingRef::encoding("cl100k_base");
    let tokenizer = TiktokenTokenizer::for_ref(&encoding).unwrap();
    let truncator = truncator_for(&encoding, Strategy::Bisect).unwrap();

    for text in sample_texts() {
        for budget in 1..tokenizer.count(&text) {
            let result = truncator.truncate(&text, budget).unwrap();
            let next = text[result.len()..].chars().next().unwrap();
            let extended = &text[..result.len() + next.len_utf8()];
            assert!(tokenizer.count(extended) > budget);
        }
    }
}

#[test]
fn test_decode_keeps_leading_tokens_in_order() {
    let encoding = EncodingRef::encoding("cl100k_base");
    let text = "The quick brown fox jumps over the lazy dog. ".repeat(20);

    let mut previous = String::new();
    let mut previous_count = 0;
    for budget in 1..=40 {
        let result = truncate(&text, budget, &encoding).unwrap();
        let count = count_tokens(&result, &encoding).unwrap();
        assert!(result.starts_with(&previous));
        assert!(count >= previous_count);
        assert_eq!(count, budget as usize);
        previous = result;
        previous_count = count;
    }

    assert_eq!(
        truncate(&text, 4, &encoding).unwrap(),
        "The quick brown fox"
    );
}

#[test]
fn test_multibyte_text_never_split() {
    let encoding = EncodingRef::encoding("cl100k_base");
    let text = "東京タワー🦀".repeat(10);
    let natural = count_tokens(&text, &encoding).unwrap();

    for budget in 1..natural {
        let result = truncate(&text, budget as i64, &encoding).unwrap();
        assert!(text.is_char_boundary(result.len()));
        assert!(text.starts_with(&result));
        assert!(count_tokens(&result, &encoding).unwrap() <= budget);
    }
}

#[test]
fn test_model_limit_truncation() {
    let mut limits = ModelLimits::builtin();
    limits.insert("text-embedding-3-large", 16);

    let text = "The quick brown fox jumps over the lazy dog. ".repeat(50);
    let result = truncate_to_model_limit(&text, "text-embedding-3-large", &limits).unwrap();
    let encoding = EncodingRef::model("text-embedding-3-large");

    assert!(text.starts_with(&result));
    assert!(result.len() < text.len());
    assert!(count_tokens(&result, &encoding).unwrap() <= 16);

    let short = "hello";
    assert_eq!(
        truncate_to_model_limit(short, "text-embedding-3-large", &limits).unwrap(),
        short
    );
}

#[test]
fn test_model_limit_errors() {
    let mut limits = ModelLimits::empty();
    assert!(matches!(
        truncate_to_model_limit("text", "gpt-4", &limits),
        Err(TruncateError::UnknownModel(_))
    ));

    limits.insert("my-local-model", 512);
    assert!(matches!(
        truncate_to_model_limit("text", "my-local-model", &limits),
        Err(TruncateError::UnknownEncoding(_))
    ));
}

/// Inputs where some prefix encodes to more tokens than the whole text
fn uneven_prefix_texts() -> Vec<String> {
    let fragments = [
        "Straße",
        "   ",
        "xHTTPRequestHandler",
        " parse_config_v2",
        " internationalization",
        "東京",
        "🦀",
        "!==",
        " 3.14159",
        "\n\n",
    ];

    let mut texts = vec![
        "Straße   xHTTPRequestHandler".to_string(),
        "HTTPRequestHandler parse_config_v2 internationalization".to_string(),
    ];
    for (i, first) in fragments.iter().enumerate() {
        for (j, second) in fragments.iter().enumerate() {
            let third = fragments[(i * 7 + j * 3) % fragments.len()];
            texts.push(format!("{first}{second}{third}"));
        }
    }
    texts
}

#[test]
fn test_bisect_keeps_text_that_fits_exactly() {
    for encoding in encodings() {
        let tokenizer = TiktokenTokenizer::for_ref(&encoding).unwrap();
        let truncator = truncator_for(&encoding, Strategy::Bisect).unwrap();

        for text in uneven_prefix_texts().into_iter().chain(sample_texts()) {
            let natural = tokenizer.count(&text);
            assert_eq!(
                truncator.truncate(&text, natural).unwrap(),
                text,
                "{encoding} cut {text:?} at its own length {natural}"
            );
        }
    }

    let cl100k = EncodingRef::encoding("cl100k_base");
    let text = "Straße   xHTTPRequestHandler";
    let natural = count_tokens(text, &cl100k).unwrap();
    let mut limits = ModelLimits::empty();
    limits.insert("gpt-4", natural);
    assert_eq!(truncate_to_model_limit(text, "gpt-4", &limits).unwrap(), text);
}

#[test]
fn test_bisect_extends_decode_result() {
    for encoding in encodings() {
        let tokenizer = TiktokenTokenizer::for_ref(&encoding).unwrap();
        let decode = truncator_for(&encoding, Strategy::Decode).unwrap();
        let bisect = truncator_for(&encoding, Strategy::Bisect).unwrap();

        for text in uneven_prefix_texts().into_iter().chain(sample_texts()) {
            for budget in 0..=tokenizer.count(&text).min(40) {
                let decoded = decode.truncate(&text, budget).unwrap();
                let searched = bisect.truncate(&text, budget).unwrap();
                assert!(
                    searched.starts_with(decoded),
                    "{encoding} budget {budget}: {searched:?} is shorter than {decoded:?}"
                );
                assert!(tokenizer.count(searched) <= budget);
            }
        }
    }

    let cl100k = EncodingRef::encoding("cl100k_base");
    let bisect = truncator_for(&cl100k, Strategy::Bisect).unwrap();
    let text = "HTTPRequestHandler parse_config_v2 internationalization";
    for budget in 1..=2 {
        let decoded = truncate(text, budget, &cl100k).unwrap();
        assert!(bisect.truncate(text, budget as usize).unwrap().starts_with(&decoded));
    }
}
