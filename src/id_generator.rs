/// Prefixed alphanumeric ID generator for nodes and edges
/// Generates ids like "message-00", "message-01", "edge-0A".
/// Expands to more digits when the namespace is exhausted, so an id is never handed out twice.

const CHARS: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J',
    'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T',
    'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Widest counter whose full range still fits in a u64 (36^12 < 2^64 < 36^13)
const MAX_LENGTH: usize = 12;

#[derive(Debug, Clone)]
pub struct IdGenerator {
    /// Type tag placed before the counter
    prefix: String,
    /// Current counter length (starts at 2)
    length: usize,
    /// Counter for next ID
    counter: u64,
    /// Maximum value before needing to expand
    max_value: u64,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_length(prefix, 2)
    }

    /// Widths past `MAX_LENGTH` are clamped to it
    pub fn with_length(prefix: impl Into<String>, length: usize) -> Self {
        let length = length.clamp(1, MAX_LENGTH);
        Self {
            prefix: prefix.into(),
            length,
            counter: 0,
            max_value: Self::capacity(length),
        }
    }

    /// Number of distinct counters of the given width
    fn capacity(length: usize) -> u64 {
        u32::try_from(length)
            .ok()
            .and_then(|exp| (CHARS.len() as u64).checked_pow(exp))
            .unwrap_or(u64::MAX)
    }

    /// Generate the next ID
    pub fn next_id(&mut self) -> String {
        if self.counter >= self.max_value {
            self.expand();
        }

        let id = format!("{}-{}", self.prefix, self.encode(self.counter));
        self.counter += 1;
        id
    }

    /// Encode a number to a fixed-width base-36 string
    fn encode(&self, mut num: u64) -> String {
        let base = CHARS.len() as u64;
        let mut result = Vec::with_capacity(self.length);

        for _ in 0..self.length {
            let digit = (num % base) as usize;
            result.push(CHARS[digit]);
            num /= base;
        }

        result.reverse();
        result.into_iter().collect()
    }

    /// Move to the next length; ids of different widths never collide
    fn expand(&mut self) {
        self.length += 1;
        self.max_value = Self::capacity(self.length);
        self.counter = 0;
    }

    /// Build a generator that continues after the ids already in use.
    /// Ids without this generator's prefix, or wider than `MAX_LENGTH`, are ignored.
    pub fn from_existing_ids<'a>(
        prefix: impl Into<String>,
        existing_ids: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let prefix = prefix.into();
        let tag = format!("{}-", prefix);

        let suffixes: Vec<&str> = existing_ids
            .into_iter()
            .filter_map(|id| id.strip_prefix(tag.as_str()))
            .filter(|suffix| suffix.len() <= MAX_LENGTH && Self::decode(suffix).is_some())
            .collect();

        let Some(max_len) = suffixes.iter().map(|s| s.len()).max() else {
            return Self::new(prefix);
        };
        let max_len = max_len.max(2);

        let max_counter = suffixes
            .iter()
            .filter(|s| s.len() == max_len)
            .filter_map(|s| Self::decode(s))
            .max();

        let mut generator = Self::with_length(prefix, max_len);
        if let Some(counter) = max_counter {
            generator.counter = counter + 1;
        }
        generator
    }

    /// Decode a counter suffix back to its value
    fn decode(suffix: &str) -> Option<u64> {
        if suffix.is_empty() {
            return None;
        }

        let base = CHARS.len() as u64;
        let mut result = 0u64;

        for c in suffix.chars() {
            let digit = CHARS.iter().position(|&ch| ch == c.to_ascii_uppercase())?;
            result = result.checked_mul(base)?.checked_add(digit as u64)?;
        }

        Some(result)
    }
}
