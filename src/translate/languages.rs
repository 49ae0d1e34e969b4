use tracing::warn;

/// Supported target languages as (code, English name)
pub const LANGUAGES: &[(&str, &str)] = &[
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("fr", "French"),
    ("de", "German"),
    ("es", "Spanish"),
    ("ru", "Russian"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("pl", "Polish"),
    ("nl", "Dutch"),
    ("tr", "Turkish"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("th", "Thai"),
    ("vi", "Vietnamese"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("no", "Norwegian"),
    ("fi", "Finnish"),
    ("he", "Hebrew"),
    ("hu", "Hungarian"),
    ("cs", "Czech"),
    ("sk", "Slovak"),
    ("bg", "Bulgarian"),
    ("hr", "Croatian"),
    ("sl", "Slovenian"),
    ("et", "Estonian"),
    ("lv", "Latvian"),
    ("lt", "Lithuanian"),
    ("mt", "Maltese"),
    ("ga", "Irish"),
    ("cy", "Welsh"),
    ("eu", "Basque"),
    ("ca", "Catalan"),
    ("gl", "Galician"),
    ("is", "Icelandic"),
    ("mk", "Macedonian"),
    ("sq", "Albanian"),
    ("be", "Belarusian"),
    ("uk", "Ukrainian"),
    ("az", "Azerbaijani"),
    ("kk", "Kazakh"),
    ("ky", "Kyrgyz"),
    ("uz", "Uzbek"),
    ("tg", "Tajik"),
    ("am", "Amharic"),
    ("ka", "Georgian"),
    ("hy", "Armenian"),
    ("ne", "Nepali"),
    ("si", "Sinhala"),
    ("my", "Burmese"),
    ("km", "Khmer"),
    ("lo", "Lao"),
    ("gu", "Gujarati"),
    ("pa", "Punjabi"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("kn", "Kannada"),
    ("ml", "Malayalam"),
    ("bn", "Bengali"),
    ("as", "Assamese"),
    ("or", "Odia"),
    ("mr", "Marathi"),
    ("en", "English"),
];

/// Keyword selecting every catalogue language
pub const ALL_LANGUAGES: &str = "all";

/// English name for a language code, or the code itself if unknown
pub fn language_name(code: &str) -> String {
    let code = code.to_lowercase();
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or(code)
}

pub fn is_known_language(code: &str) -> bool {
    let code = code.to_lowercase();
    LANGUAGES.iter().any(|(c, _)| *c == code)
}

pub fn all_language_codes() -> Vec<String> {
    LANGUAGES.iter().map(|(code, _)| code.to_string()).collect()
}

/// Parse a comma-separated language list, or `all`.
///
/// Entries are trimmed and lowercased, empties dropped, duplicates removed
/// keeping the first occurrence. Unknown codes are kept; the endpoint
/// decides whether it can serve them.
pub fn parse_language_list(input: &str) -> Vec<String> {
    if input.trim().eq_ignore_ascii_case(ALL_LANGUAGES) {
        return all_language_codes();
    }

    let mut languages: Vec<String> = Vec::new();
    for code in input.split(',').map(|s| s.trim().to_lowercase()) {
        if code.is_empty() || languages.contains(&code) {
            continue;
        }
        if !is_known_language(&code) {
            warn!("Language code '{}' is not in the catalogue, passing it through", code);
        }
        languages.push(code);
    }
    languages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_name_lookup() {
        assert_eq!(language_name("fr"), "French");
        assert_eq!(language_name("JA"), "Japanese");
        assert_eq!(language_name("xx"), "xx");
    }

    #[test]
    fn test_parse_language_list_dedups_and_trims() {
        assert_eq!(parse_language_list(" fr, de ,,FR,ja "), vec!["fr", "de", "ja"]);
        assert!(parse_language_list("").is_empty());
    }

    #[test]
    fn test_parse_language_list_all() {
        let all = parse_language_list("ALL");
        assert_eq!(all.len(), LANGUAGES.len());
        assert!(all.contains(&"en".to_string()));
    }

    #[test]
    fn test_unknown_codes_pass_through() {
        assert_eq!(parse_language_list("tlh"), vec!["tlh"]);
    }
}
