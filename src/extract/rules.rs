//! Prioritized fallback rules
//!
//! The target markup drifts: ids get renamed, cards lose their wrapping
//! anchor, lazy images move their URL to another attribute. Each value that
//! has more than one place to come from is read through a [`RuleChain`],
//! an ordered list of named extractors tried until one yields a value.

/// A single named extractor
type Rule<'r, I, T> = (&'static str, Box<dyn Fn(I) -> Option<T> + 'r>);

/// An ordered list of extraction rules over a `Copy` input
///
/// # Example
///
/// ```
/// use adsweep::extract::RuleChain;
///
/// let chain = RuleChain::new()
///     .rule("exact", |s: &str| (s == "id").then(|| "exact".to_string()))
///     .rule("prefix", |s: &str| s.starts_with("id").then(|| "prefix".to_string()));
///
/// assert_eq!(chain.first_match("id-2").as_deref(), Some("prefix"));
/// assert_eq!(chain.first_match("other"), None);
/// ```
pub struct RuleChain<'r, I, T> {
    rules: Vec<Rule<'r, I, T>>,
}

impl<'r, I: Copy, T> RuleChain<'r, I, T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule with lower priority than every rule already present
    pub fn rule(mut self, name: &'static str, extract: impl Fn(I) -> Option<T> + 'r) -> Self {
        self.rules.push((name, Box::new(extract)));
        self
    }

    /// Evaluates the rules in order and returns the first value produced
    pub fn first_match(&self, input: I) -> Option<T> {
        self.rules.iter().find_map(|(name, extract)| {
            let value = extract(input)?;
            tracing::trace!(rule = *name, "extraction rule matched");
            Some(value)
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'r, I: Copy, T> Default for RuleChain<'r, I, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a string only if it has visible content
pub(crate) fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
