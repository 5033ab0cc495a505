use serde::Serialize;

/// Two vendor keys that look like spellings of the same vendor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarPair {
    pub left: String,
    pub right: String,
    pub score: f64,
}

/// Informational only. Nothing in the analysis reads these results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FuzzyStatus {
    Unavailable,
    Available { similar: Vec<SimilarPair> },
}

impl FuzzyStatus {
    pub fn footer(&self) -> String {
        match self {
            Self::Unavailable => "Fuzzy vendor matching: not available".to_string(),
            Self::Available { similar } if similar.is_empty() => {
                "Fuzzy vendor matching: available, no similar vendor names".to_string()
            }
            Self::Available { similar } => format!(
                "Fuzzy vendor matching: available, {} possibly duplicated vendor name(s)",
                similar.len()
            ),
        }
    }
}

pub struct FuzzyMatcher {
    threshold: f64,
}

impl FuzzyMatcher {
    pub const DEFAULT_THRESHOLD: f64 = 0.92;

    /// `None` when the crate was built without the `fuzzy` feature.
    pub fn probe() -> Option<Self> {
        if cfg!(feature = "fuzzy") {
            Some(Self {
                threshold: Self::DEFAULT_THRESHOLD,
            })
        } else {
            None
        }
    }

    #[cfg(feature = "fuzzy")]
    fn similarity(a: &str, b: &str) -> f64 {
        strsim::jaro_winkler(a, b)
    }

    #[cfg(not(feature = "fuzzy"))]
    fn similarity(_a: &str, _b: &str) -> f64 {
        0.0
    }

    /// Pairs of distinct keys scoring at or above the threshold, strongest first.
    pub fn similar_pairs(&self, keys: &[String]) -> Vec<SimilarPair> {
        let mut pairs = Vec::new();
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                if a.is_empty() || b.is_empty() || a == b {
                    continue;
                }
                let score = Self::similarity(a, b);
                if score >= self.threshold {
                    pairs.push(SimilarPair {
                        left: a.clone(),
                        right: b.clone(),
                        score,
                    });
                }
            }
        }
        pairs.sort_by(|x, y| y.score.total_cmp(&x.score));
        pairs
    }

    pub fn status(matcher: Option<&Self>, keys: &[String]) -> FuzzyStatus {
        match matcher {
            Some(m) => FuzzyStatus::Available {
                similar: m.similar_pairs(keys),
            },
            None => FuzzyStatus::Unavailable,
        }
    }
}
