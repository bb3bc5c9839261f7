//! Ordered comparisons backing `min`, `max`, `len`, `gt`, `gte`, `lt`, `lte`

/// Comparison requested by a bound rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `min` / `gte`: value >= limit
    AtLeast,
    /// `max` / `lte`: value <= limit
    AtMost,
    /// `len` / `eq` on numbers: value == limit
    Exactly,
    /// `gt`: value > limit
    Above,
    /// `lt`: value < limit
    Below,
}

impl Bound {
    /// Returns true when `value` satisfies the bound against `limit`
    pub fn holds(self, value: f64, limit: f64) -> bool {
        match self {
            Bound::AtLeast => value >= limit,
            Bound::AtMost => value <= limit,
            Bound::Exactly => value == limit,
            Bound::Above => value > limit,
            Bound::Below => value < limit,
        }
    }
}

/// Number of characters (not bytes) in a string, as compared by length rules
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Length check used for collections (`min_items` / `max_items`)
pub fn count_within(count: usize, min: Option<usize>, max: Option<usize>) -> bool {
    min.map_or(true, |min| count >= min) && max.map_or(true, |max| count <= max)
}
