//! Character-format model.

use crate::api::{ApiModel, bag_f64, bag_i64, bag_string, push_f64, push_i64, push_str};
use crate::automation::constants::tri;
use crate::automation::path::{Bag, read_bag, remove_invalidity, write_bag};
use crate::automation::Handle;
use crate::common::Result;
use serde::{Deserialize, Serialize};

/// Mirror of a `Font` sub-object.
///
/// The boolean-like attributes are tri-state on the host; a value outside
/// the three defined states (reported for mixed spans) is not captured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superscript: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscript: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<i64>,
    /// Packed RGB of `Color.RGB`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<i64>,
}

impl FontApi {
    const KEYS: [&'static str; 9] = [
        "Size",
        "Name",
        "Bold",
        "Italic",
        "Shadow",
        "Superscript",
        "Subscript",
        "Underline",
        "Color.RGB",
    ];

    const TRI_KEYS: [&'static str; 6] =
        ["Bold", "Italic", "Shadow", "Superscript", "Subscript", "Underline"];

    /// A convenience model that only sets the color.
    pub fn colored(rgb: i64) -> Self {
        Self { color: Some(rgb), ..Self::default() }
    }
}

impl ApiModel for FontApi {
    fn from_api(handle: &Handle) -> Result<Self> {
        let mut bag = read_bag(handle, &Self::KEYS)?;
        // Mixed spans report values outside the tri-state set; drop them.
        bag.retain(|(key, value)| {
            !Self::TRI_KEYS.contains(&key.as_str())
                || value.as_i64().map(tri::is_tri_state).unwrap_or(false)
        });
        let bag = remove_invalidity(handle, bag)?;
        Ok(Self {
            size: bag_f64(&bag, "Size"),
            name: bag_string(&bag, "Name"),
            bold: bag_i64(&bag, "Bold"),
            italic: bag_i64(&bag, "Italic"),
            shadow: bag_i64(&bag, "Shadow"),
            superscript: bag_i64(&bag, "Superscript"),
            subscript: bag_i64(&bag, "Subscript"),
            underline: bag_i64(&bag, "Underline"),
            color: bag_i64(&bag, "Color.RGB"),
        })
    }

    fn apply_api(&self, handle: &Handle) -> Result<()> {
        let mut bag = Bag::new();
        push_f64(&mut bag, "Size", self.size);
        push_str(&mut bag, "Name", self.name.as_deref());
        push_i64(&mut bag, "Bold", self.bold);
        push_i64(&mut bag, "Italic", self.italic);
        push_i64(&mut bag, "Shadow", self.shadow);
        push_i64(&mut bag, "Superscript", self.superscript);
        push_i64(&mut bag, "Subscript", self.subscript);
        push_i64(&mut bag, "Underline", self.underline);
        push_i64(&mut bag, "Color.RGB", self.color);
        write_bag(handle, &bag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    fn font_handle() -> Handle {
        let host = MockHost::new();
        let pres = host.add_presentation().unwrap();
        let slide = MockHost::add_slide(&pres).unwrap();
        let shape = MockHost::add_rectangle(&slide, 0.0, 0.0, 100.0, 40.0).unwrap();
        let range = shape.get_object("TextFrame.TextRange").unwrap();
        range.set("Text", "Hello").unwrap();
        shape.get_object("TextFrame.TextRange.Font").unwrap()
    }

    #[test]
    fn test_round_trip() {
        let font = font_handle();
        font.set("Size", 32.0).unwrap();
        font.set("Bold", tri::TRUE).unwrap();
        font.set("Color.RGB", 0x0000FF).unwrap();

        let model = FontApi::from_api(&font).unwrap();
        assert_eq!(model.size, Some(32.0));
        assert_eq!(model.bold, Some(tri::TRUE));
        assert_eq!(model.color, Some(0x0000FF));

        let other = font_handle();
        model.apply_api(&other).unwrap();
        assert_eq!(FontApi::from_api(&other).unwrap(), model);
    }

    #[test]
    fn test_unset_vs_default_equality() {
        let a = FontApi::default();
        let b = FontApi { bold: None, ..Default::default() };
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "{}");
    }
}
