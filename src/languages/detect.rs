use whatlang::Lang;

/// Best-effort language identification for a whole document.
///
/// Returns the two-letter code for languages the catalog knows about and the
/// ISO 639-3 code otherwise, so callers can report what was seen.
pub fn detect_language(text: &str) -> Option<String> {
    let info = whatlang::detect(text)?;
    Some(lang_code(info.lang()).to_string())
}

fn lang_code(lang: Lang) -> &'static str {
    match lang {
        Lang::Fra => "fr",
        Lang::Eng => "en",
        Lang::Deu => "de",
        Lang::Spa => "es",
        Lang::Ita => "it",
        Lang::Cmn => "zh",
        Lang::Ara => "ar",
        Lang::Por => "pt",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        other => other.code(),
    }
}
