//! Widget configuration: typed options, partial patches, and the manager
//! that owns merging, validation, and value normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WidgetError;

fn default_value() -> f64 {
    0.0
}

fn default_min() -> f64 {
    0.0
}

fn default_max() -> f64 {
    100.0
}

fn default_animated() -> bool {
    true
}

/// Default tween duration in milliseconds.
fn default_duration() -> u64 {
    300
}

fn default_easing() -> String {
    "ease_in_out".to_string()
}

fn default_format() -> String {
    "{percent}%".to_string()
}

fn default_shape() -> String {
    "linear".to_string()
}

/// Full option set for a widget. Unrecognized keys are carried in `extra`
/// for plugins and renderers; the core never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetOptions {
    /// Initial value; patch resolution defaults this to `min`
    #[serde(default = "default_value")]
    pub value: f64,
    /// Lower bound of the range
    #[serde(default = "default_min")]
    pub min: f64,
    /// Upper bound of the range, must exceed `min`
    #[serde(default = "default_max")]
    pub max: f64,
    /// Whether value changes tween by default
    #[serde(default = "default_animated")]
    pub animated: bool,
    /// Tween duration in milliseconds
    #[serde(default = "default_duration")]
    pub duration: u64,
    /// Registered easing function name
    #[serde(default = "default_easing")]
    pub easing: String,
    /// Whether the renderer should draw a text label
    #[serde(default, alias = "showText")]
    pub show_text: bool,
    /// Label template with `{value}`, `{percent}`, `{min}`, `{max}` tokens
    #[serde(default = "default_format")]
    pub format: String,
    /// Theme name applied as a surface attribute
    #[serde(default)]
    pub theme: Option<String>,
    /// Extra class attribute for the mount surface
    #[serde(default, alias = "className")]
    pub class_name: Option<String>,
    /// Registered shape renderer name
    #[serde(default = "default_shape")]
    pub shape: String,
    /// Unrecognized keys, preserved verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            value: default_value(),
            min: default_min(),
            max: default_max(),
            animated: default_animated(),
            duration: default_duration(),
            easing: default_easing(),
            show_text: false,
            format: default_format(),
            theme: None,
            class_name: None,
            shape: default_shape(),
            extra: BTreeMap::new(),
        }
    }
}

impl WidgetOptions {
    /// Resolve a partial patch against the defaults. An absent `value`
    /// falls back to the resolved `min`, not to the default value.
    pub fn resolve(patch: OptionsPatch) -> Self {
        let value_given = patch.value.is_some();
        let mut options = Self::default();
        patch.apply(&mut options);
        if !value_given {
            options.value = options.min;
        }
        options
    }
}

/// Partial option set used for merges and builder/JSON ingestion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsPatch {
    pub value: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub animated: Option<bool>,
    pub duration: Option<u64>,
    pub easing: Option<String>,
    #[serde(default, alias = "showText")]
    pub show_text: Option<bool>,
    pub format: Option<String>,
    pub theme: Option<String>,
    #[serde(default, alias = "className")]
    pub class_name: Option<String>,
    pub shape: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl OptionsPatch {
    /// Shallow-merge this patch into an option set
    pub fn apply(&self, options: &mut WidgetOptions) {
        if let Some(v) = self.value {
            options.value = v;
        }
        if let Some(v) = self.min {
            options.min = v;
        }
        if let Some(v) = self.max {
            options.max = v;
        }
        if let Some(v) = self.animated {
            options.animated = v;
        }
        if let Some(v) = self.duration {
            options.duration = v;
        }
        if let Some(v) = &self.easing {
            options.easing = v.clone();
        }
        if let Some(v) = self.show_text {
            options.show_text = v;
        }
        if let Some(v) = &self.format {
            options.format = v.clone();
        }
        if let Some(v) = &self.theme {
            options.theme = Some(v.clone());
        }
        if let Some(v) = &self.class_name {
            options.class_name = Some(v.clone());
        }
        if let Some(v) = &self.shape {
            options.shape = v.clone();
        }
        for (key, value) in &self.extra {
            options.extra.insert(key.clone(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Owns the live options plus a defaults snapshot taken at construction.
/// The widget keeps `value` synced here so `get_all` snapshots stay truthful.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    options: WidgetOptions,
    defaults: WidgetOptions,
}

impl ConfigManager {
    pub fn new(options: WidgetOptions) -> Self {
        Self {
            defaults: options.clone(),
            options,
        }
    }

    #[inline]
    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    /// Look up a single key as JSON, recognized or extra
    pub fn get(&self, key: &str) -> Option<Value> {
        let o = &self.options;
        match key {
            "value" => Some(Value::from(o.value)),
            "min" => Some(Value::from(o.min)),
            "max" => Some(Value::from(o.max)),
            "animated" => Some(Value::from(o.animated)),
            "duration" => Some(Value::from(o.duration)),
            "easing" => Some(Value::from(o.easing.clone())),
            "show_text" | "showText" => Some(Value::from(o.show_text)),
            "format" => Some(Value::from(o.format.clone())),
            "theme" => o.theme.clone().map(Value::from),
            "class_name" | "className" => o.class_name.clone().map(Value::from),
            "shape" => Some(Value::from(o.shape.clone())),
            _ => o.extra.get(key).cloned(),
        }
    }

    /// Set a single key. Recognized keys parse into their typed field and
    /// reject mismatched JSON; anything else lands in the extras map.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), WidgetError> {
        let o = &mut self.options;
        match key {
            "value" => o.value = parse_key(key, value)?,
            "min" => o.min = parse_key(key, value)?,
            "max" => o.max = parse_key(key, value)?,
            "animated" => o.animated = parse_key(key, value)?,
            "duration" => o.duration = parse_key(key, value)?,
            "easing" => o.easing = parse_key(key, value)?,
            "show_text" | "showText" => o.show_text = parse_key(key, value)?,
            "format" => o.format = parse_key(key, value)?,
            "theme" => o.theme = parse_key(key, value)?,
            "class_name" | "className" => o.class_name = parse_key(key, value)?,
            "shape" => o.shape = parse_key(key, value)?,
            _ => {
                o.extra.insert(key.to_string(), value);
            }
        }
        Ok(())
    }

    /// Shallow-merge a JSON object through `set`
    pub fn set_multiple(
        &mut self,
        entries: &serde_json::Map<String, Value>,
    ) -> Result<(), WidgetError> {
        for (key, value) in entries {
            self.set(key, value.clone())?;
        }
        Ok(())
    }

    /// Typed shallow merge
    pub fn merge(&mut self, patch: &OptionsPatch) {
        patch.apply(&mut self.options);
    }

    /// Snapshot of the full option set
    pub fn get_all(&self) -> WidgetOptions {
        self.options.clone()
    }

    /// Restore the options captured at construction
    pub fn reset(&mut self) {
        self.options = self.defaults.clone();
    }

    pub fn validate(&self) -> Result<(), WidgetError> {
        let o = &self.options;
        if !(o.min < o.max) {
            return Err(WidgetError::InvalidConfig {
                reason: format!("min ({}) must be less than max ({})", o.min, o.max),
            });
        }
        if o.value < o.min || o.value > o.max {
            return Err(WidgetError::InvalidConfig {
                reason: format!(
                    "value ({}) outside range [{}, {}]",
                    o.value, o.min, o.max
                ),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Clamp a value into the configured range.
    /// NaN cannot be ordered; it maps to `min`.
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.options.min;
        }
        value.clamp(self.options.min, self.options.max)
    }

    /// Map a value (default: the stored one) to 0..100.
    /// A non-positive span yields 0 rather than dividing by zero.
    pub fn percentage(&self, value: Option<f64>) -> f64 {
        let span = self.options.max - self.options.min;
        if span <= 0.0 {
            return 0.0;
        }
        let v = value.unwrap_or(self.options.value);
        ((v - self.options.min) / span * 100.0).clamp(0.0, 100.0)
    }

    /// Keep the stored value in step with the live widget value
    pub(crate) fn store_value(&mut self, value: f64) {
        self.options.value = value;
    }

    pub(crate) fn restore(&mut self, options: WidgetOptions) {
        self.options = options;
    }
}

fn parse_key<T: serde::de::DeserializeOwned>(key: &str, value: Value) -> Result<T, WidgetError> {
    serde_json::from_value(value).map_err(|err| WidgetError::InvalidConfig {
        reason: format!("{key}: {err}"),
    })
}
