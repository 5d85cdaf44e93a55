/// Upper-cased keywords matched by case-insensitive containment.
///
/// Needles are folded once at construction; haystacks are folded per check
/// with Unicode upper-casing, which does not depend on the process locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    needles: Vec<String>,
}

impl KeywordSet {
    /// Blank keywords are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let needles = keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().trim().to_uppercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        Self { needles }
    }

    pub fn single(keyword: &str) -> Self {
        Self::new([keyword])
    }

    /// Technical/vocational designations in the school type column.
    pub fn technical() -> Self {
        Self::new(["TVET", "TECHNICAL"])
    }

    /// Science-track designations in the programmes column.
    pub fn stem() -> Self {
        Self::new(["SCIENCE", "STEM"])
    }

    pub fn is_empty(&self) -> bool {
        self.needles.is_empty()
    }

    /// True when any keyword occurs in `haystack`. An empty set matches nothing.
    pub fn matches(&self, haystack: &str) -> bool {
        if self.needles.is_empty() || haystack.is_empty() {
            return false;
        }
        let folded = haystack.to_uppercase();
        self.needles
            .iter()
            .any(|needle| folded.contains(needle.as_str()))
    }

    /// Like [`matches`](Self::matches), but an empty set imposes no constraint.
    pub fn permits(&self, haystack: &str) -> bool {
        self.needles.is_empty() || self.matches(haystack)
    }
}
