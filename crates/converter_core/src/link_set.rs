/// Smallest number of link fields the form ever shows.
pub const MIN_LINKS: usize = 1;

/// Largest number of link fields the form will allocate. Bigger requests are clamped.
pub const MAX_LINKS: usize = 100;

/// What happens to already typed links when the link count changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizePolicy {
    /// Every resize starts over with empty fields.
    #[default]
    Discard,
    /// Fields that exist both before and after the resize keep their text.
    Preserve,
}

/// Ordered link fields. Always holds between [`MIN_LINKS`] and [`MAX_LINKS`] entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSet {
    entries: Vec<String>,
    policy: ResizePolicy,
}

impl Default for LinkSet {
    fn default() -> Self {
        Self::with_policy(ResizePolicy::default())
    }
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ResizePolicy) -> Self {
        Self {
            entries: vec![String::new(); MIN_LINKS],
            policy,
        }
    }

    pub fn policy(&self) -> ResizePolicy {
        self.policy
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Resize to `requested` entries (clamped to `MIN_LINKS..=MAX_LINKS`) and return the new count.
    pub fn resize(&mut self, requested: usize) -> usize {
        let count = requested.clamp(MIN_LINKS, MAX_LINKS);
        match self.policy {
            ResizePolicy::Discard => self.entries = vec![String::new(); count],
            ResizePolicy::Preserve => self.entries.resize(count, String::new()),
        }
        count
    }

    /// Replace the entry at `index`. Returns `false` when `index` is out of range.
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                *entry = value.into();
                true
            }
            None => false,
        }
    }

    /// Entries exactly as typed, empty ones included.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.clone()
    }
}

/// Read a link count from free text.
///
/// Takes the leading run of digits after optional whitespace and sign, so
/// `"3 links"` reads as 3. Anything without digits, zero and negatives
/// become [`MIN_LINKS`]. Counts above [`MAX_LINKS`], including digit runs too
/// long for `usize`, become [`MAX_LINKS`].
pub fn parse_link_count(raw: &str) -> usize {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = unsigned
        .bytes()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if negative || digits_len == 0 {
        return MIN_LINKS;
    }
    // The run is all ASCII digits, so parsing only fails on overflow.
    unsigned[..digits_len]
        .parse::<usize>()
        .map_or(MAX_LINKS, |count| count.clamp(MIN_LINKS, MAX_LINKS))
}
