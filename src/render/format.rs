//! Label template rendering with a small memo cache

use std::num::NonZeroUsize;

use lru::LruCache;

/// Renders label templates with `{value}`, `{percent}`, `{min}`, `{max}`
/// tokens. Frames repeating the same value reuse the cached string.
pub struct LabelFormatter {
    template: String,
    min: f64,
    max: f64,
    cache: LruCache<u64, String>,
}

impl LabelFormatter {
    pub fn new(cache_size: usize) -> Self {
        let cache_size = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            template: String::new(),
            min: 0.0,
            max: 100.0,
            cache: LruCache::new(cache_size),
        }
    }

    /// Rebind template and range; the memo is dropped when anything
    /// changed since cached strings bake all three in
    pub fn configure(&mut self, template: &str, min: f64, max: f64) {
        if self.template != template || self.min != min || self.max != max {
            self.template = template.to_string();
            self.min = min;
            self.max = max;
            self.cache.clear();
        }
    }

    /// Render the label for a value
    pub fn format(&mut self, value: f64, percent: f64) -> String {
        let key = value.to_bits();
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }
        let rendered = render_template(&self.template, value, percent, self.min, self.max);
        self.cache.put(key, rendered.clone());
        rendered
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl Default for LabelFormatter {
    fn default() -> Self {
        Self::new(256)
    }
}

fn render_template(template: &str, value: f64, percent: f64, min: f64, max: f64) -> String {
    template
        .replace("{value}", &format_number(value))
        .replace("{percent}", &format_number(percent))
        .replace("{min}", &format_number(min))
        .replace("{max}", &format_number(max))
}

/// Whole numbers print bare, fractional ones with a single decimal
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        let mut formatter = LabelFormatter::default();
        formatter.configure("{value}/{max} ({percent}%)", 0.0, 200.0);
        assert_eq!(formatter.format(50.0, 25.0), "50/200 (25%)");
    }

    #[test]
    fn test_fractional_values() {
        let mut formatter = LabelFormatter::default();
        formatter.configure("{percent}%", 0.0, 100.0);
        assert_eq!(formatter.format(33.333, 33.333), "33.3%");
    }

    #[test]
    fn test_memoizes_per_value() {
        let mut formatter = LabelFormatter::default();
        formatter.configure("{percent}%", 0.0, 100.0);

        formatter.format(10.0, 10.0);
        formatter.format(10.0, 10.0);
        formatter.format(20.0, 20.0);
        assert_eq!(formatter.cache_len(), 2);
    }

    #[test]
    fn test_configure_drops_stale_cache() {
        let mut formatter = LabelFormatter::default();
        formatter.configure("{percent}%", 0.0, 100.0);
        assert_eq!(formatter.format(50.0, 50.0), "50%");

        formatter.configure("{value} of {max}", 0.0, 100.0);
        assert_eq!(formatter.format(50.0, 50.0), "50 of 100");

        // Same template and range: cache survives
        formatter.configure("{value} of {max}", 0.0, 100.0);
        assert_eq!(formatter.cache_len(), 1);
    }

    #[test]
    fn test_eviction_respects_capacity() {
        let mut formatter = LabelFormatter::new(2);
        formatter.configure("{value}", 0.0, 100.0);
        formatter.format(1.0, 1.0);
        formatter.format(2.0, 2.0);
        formatter.format(3.0, 3.0);
        assert_eq!(formatter.cache_len(), 2);
    }
}
