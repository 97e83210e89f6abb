/// Locale codes the provider accepts, keyed by normalized prefix.
const SUPPORTED_LOCALES: &[(&str, &str)] = &[
    ("en", "en_US"),
    ("en_gb", "en_GB"),
    ("es", "es_ES"),
    ("es_mx", "es_MX"),
    ("pt", "pt_BR"),
    ("pt_pt", "pt_PT"),
    ("fr", "fr_FR"),
    ("de", "de_DE"),
    ("it", "it_IT"),
    ("nl", "nl_NL"),
    ("hi", "hi_IN"),
    ("id", "id_ID"),
    ("ja", "ja_JP"),
    ("ko", "ko_KR"),
    ("zh", "zh_CN"),
    ("zh_tw", "zh_TW"),
    ("ar", "ar_SA"),
    ("ru", "ru_RU"),
    ("tr", "tr_TR"),
];

pub const DEFAULT_LOCALE: &str = "en_US";

/// Normalize an arbitrary locale string into the provider's supported set.
///
/// Matching is case-insensitive and tolerant of `-` vs `_` separators; both
/// the full tag and its language prefix are tried. Unknown or empty input
/// maps to `en_US` rather than failing; callers that need strict validation
/// must check the result against `supported_locales()` themselves.
pub fn normalize_language(input: &str) -> &'static str {
    let normalized = input.trim().to_ascii_lowercase().replace('-', "_");
    if normalized.is_empty() {
        return DEFAULT_LOCALE;
    }

    // Exact tag first, then the bare language prefix.
    if let Some((_, code)) = SUPPORTED_LOCALES.iter().find(|(key, _)| *key == normalized) {
        return code;
    }

    // Already-canonical codes like "en_US" pass through.
    if let Some((_, code)) = SUPPORTED_LOCALES
        .iter()
        .find(|(_, code)| code.to_ascii_lowercase() == normalized)
    {
        return code;
    }

    let prefix = normalized.split('_').next().unwrap_or("");
    if let Some((_, code)) = SUPPORTED_LOCALES.iter().find(|(key, _)| *key == prefix) {
        return code;
    }

    DEFAULT_LOCALE
}

/// The full set of provider locale codes, for callers that want to reject
/// unsupported locales instead of defaulting.
pub fn supported_locales() -> impl Iterator<Item = &'static str> {
    SUPPORTED_LOCALES.iter().map(|(_, code)| *code)
}
