use regex::Regex;

/// Turns raw vendor strings into the grouping key used by every later stage.
///
/// Two raw strings that normalize to the same key are treated as one vendor.
pub struct Normalizer {
    ampersand: String,
    whitespace: Regex,
    disallowed: Regex,
}

impl Normalizer {
    pub fn new(ampersand_word: &str) -> Self {
        Self {
            ampersand: format!(" {} ", ampersand_word.trim().to_lowercase()),
            whitespace: Regex::new(r"\s+").expect("static regex"),
            disallowed: Regex::new(r"[^a-z0-9äöüßàèéìòù \-\.]").expect("static regex"),
        }
    }

    pub fn normalize(&self, raw: Option<&str>) -> String {
        let Some(raw) = raw else {
            return String::new();
        };
        let v = raw.trim().to_lowercase();
        let v = self.whitespace.replace_all(&v, " ");
        let v = v.replace('&', &self.ampersand);
        let v = self.disallowed.replace_all(&v, "");
        self.whitespace.replace_all(v.trim(), " ").into_owned()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new("und")
    }
}
