//! Paragraph- and bullet-format models.

use crate::api::{ApiModel, bag_f64, bag_i64, bag_string, push_f64, push_i64, push_str};
use crate::automation::constants::bullet_type;
use crate::automation::path::{Bag, has, read_bag, remove_invalidity, write_bag};
use crate::automation::Handle;
use crate::common::Result;
use serde::{Deserialize, Serialize};

/// Mirror of a `ParagraphFormat` sub-object.
///
/// The host splits paragraph formatting over two interfaces: the classic
/// one carries alignment and spacing, the v2 one carries the indent
/// distances. Capture takes both handles when the caller has them;
/// fields of an absent interface stay unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphFormatApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hanging_punctuation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_before: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_after: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_within: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_rule_before: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_rule_after: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_rule_within: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_line_indent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_indent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_indent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet: Option<BulletFormatApi>,
}

impl ParagraphFormatApi {
    const V1_KEYS: [&'static str; 8] = [
        "Alignment",
        "HangingPunctuation",
        "SpaceBefore",
        "SpaceAfter",
        "SpaceWithin",
        "LineRuleBefore",
        "LineRuleAfter",
        "LineRuleWithin",
    ];

    const V2_KEYS: [&'static str; 3] = ["FirstLineIndent", "LeftIndent", "RightIndent"];

    /// Capture from the classic interface plus, when available, the v2
    /// interface reached through the shape's `TextFrame2`.
    pub fn from_api_pair(primary: &Handle, secondary: Option<&Handle>) -> Result<Self> {
        let bag = remove_invalidity(primary, read_bag(primary, &Self::V1_KEYS)?)?;
        let mut model = Self {
            alignment: bag_i64(&bag, "Alignment"),
            hanging_punctuation: bag_i64(&bag, "HangingPunctuation"),
            space_before: bag_f64(&bag, "SpaceBefore"),
            space_after: bag_f64(&bag, "SpaceAfter"),
            space_within: bag_f64(&bag, "SpaceWithin"),
            line_rule_before: bag_i64(&bag, "LineRuleBefore"),
            line_rule_after: bag_i64(&bag, "LineRuleAfter"),
            line_rule_within: bag_i64(&bag, "LineRuleWithin"),
            ..Default::default()
        };
        let v2 = secondary.unwrap_or(primary);
        if has(v2, Self::V2_KEYS[0]) {
            let bag2 = remove_invalidity(v2, read_bag(v2, &Self::V2_KEYS)?)?;
            model.first_line_indent = bag_f64(&bag2, "FirstLineIndent");
            model.left_indent = bag_f64(&bag2, "LeftIndent");
            model.right_indent = bag_f64(&bag2, "RightIndent");
        }
        if has(primary, "Bullet.Visible") {
            model.bullet = Some(BulletFormatApi::from_api(&primary.get_object("Bullet")?)?);
        }
        Ok(model)
    }

    /// Apply to the classic interface and, when provided, the v2 one.
    pub fn apply_api_pair(&self, primary: &Handle, secondary: Option<&Handle>) -> Result<()> {
        let mut bag = Bag::new();
        push_i64(&mut bag, "Alignment", self.alignment);
        push_i64(&mut bag, "HangingPunctuation", self.hanging_punctuation);
        push_f64(&mut bag, "SpaceBefore", self.space_before);
        push_f64(&mut bag, "SpaceAfter", self.space_after);
        push_f64(&mut bag, "SpaceWithin", self.space_within);
        push_i64(&mut bag, "LineRuleBefore", self.line_rule_before);
        push_i64(&mut bag, "LineRuleAfter", self.line_rule_after);
        push_i64(&mut bag, "LineRuleWithin", self.line_rule_within);
        write_bag(primary, &bag)?;

        let mut bag2 = Bag::new();
        push_f64(&mut bag2, "FirstLineIndent", self.first_line_indent);
        push_f64(&mut bag2, "LeftIndent", self.left_indent);
        push_f64(&mut bag2, "RightIndent", self.right_indent);
        if !bag2.is_empty() {
            write_bag(secondary.unwrap_or(primary), &bag2)?;
        }

        if let Some(bullet) = &self.bullet {
            bullet.apply_api(&primary.get_object("Bullet")?)?;
        }
        Ok(())
    }
}

impl ApiModel for ParagraphFormatApi {
    fn from_api(handle: &Handle) -> Result<Self> {
        Self::from_api_pair(handle, None)
    }

    fn apply_api(&self, handle: &Handle) -> Result<()> {
        self.apply_api_pair(handle, None)
    }
}

/// Mirror of a `BulletFormat` sub-object.
///
/// Key order is load-bearing: writing `Type` re-shows a bullet and
/// writing `Character` flips the type, so `Visible` goes last and
/// `Character` is only carried for character bullets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulletFormatApi {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_text_font: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_text_color: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<i64>,
}

impl ApiModel for BulletFormatApi {
    fn from_api(handle: &Handle) -> Result<Self> {
        let kind = handle.get_i64("Type")?;
        let mut bag = Bag::new();
        push_i64(&mut bag, "Type", Some(kind));
        if kind == bullet_type::UNNUMBERED {
            push_i64(&mut bag, "Character", handle.get_i64("Character").ok());
        }
        push_f64(&mut bag, "RelativeSize", handle.get_f64("RelativeSize").ok());
        push_i64(&mut bag, "UseTextFont", handle.get_i64("UseTextFont").ok());
        push_i64(&mut bag, "UseTextColor", handle.get_i64("UseTextColor").ok());
        push_str(&mut bag, "Font.Name", handle.get_string("Font.Name").ok().as_deref());
        push_i64(&mut bag, "Font.Color.RGB", handle.get_i64("Font.Color.RGB").ok());
        push_i64(&mut bag, "Visible", handle.get_i64("Visible").ok());
        let bag = remove_invalidity(handle, bag)?;
        Ok(Self {
            kind: bag_i64(&bag, "Type"),
            character: bag_i64(&bag, "Character"),
            relative_size: bag_f64(&bag, "RelativeSize"),
            use_text_font: bag_i64(&bag, "UseTextFont"),
            use_text_color: bag_i64(&bag, "UseTextColor"),
            font_name: bag_string(&bag, "Font.Name"),
            font_color: bag_i64(&bag, "Font.Color.RGB"),
            visible: bag_i64(&bag, "Visible"),
        })
    }

    fn apply_api(&self, handle: &Handle) -> Result<()> {
        let mut bag = Bag::new();
        push_i64(&mut bag, "Type", self.kind);
        push_i64(&mut bag, "Character", self.character);
        push_f64(&mut bag, "RelativeSize", self.relative_size);
        push_i64(&mut bag, "UseTextFont", self.use_text_font);
        push_i64(&mut bag, "UseTextColor", self.use_text_color);
        push_str(&mut bag, "Font.Name", self.font_name.as_deref());
        push_i64(&mut bag, "Font.Color.RGB", self.font_color);
        push_i64(&mut bag, "Visible", self.visible);
        write_bag(handle, &bag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::constants::{alignment, tri};
    use crate::mock::MockHost;

    fn paragraph_format() -> Handle {
        let host = MockHost::new();
        let pres = host.add_presentation().unwrap();
        let slide = MockHost::add_slide(&pres).unwrap();
        let shape = MockHost::add_rectangle(&slide, 0.0, 0.0, 200.0, 80.0).unwrap();
        let range = shape.get_object("TextFrame.TextRange").unwrap();
        range.set("Text", "Hello").unwrap();
        range.get_object("ParagraphFormat").unwrap()
    }

    #[test]
    fn test_round_trip() {
        let pf = paragraph_format();
        pf.set("Alignment", alignment::CENTER).unwrap();
        pf.set("SpaceAfter", 6.0).unwrap();
        let model = ParagraphFormatApi::from_api(&pf).unwrap();
        assert_eq!(model.alignment, Some(alignment::CENTER));
        assert_eq!(model.space_after, Some(6.0));

        let other = paragraph_format();
        model.apply_api(&other).unwrap();
        assert_eq!(ParagraphFormatApi::from_api(&other).unwrap(), model);
    }

    #[test]
    fn test_bullet_visibility_survives_type_write() {
        let pf = paragraph_format();
        let bullet = pf.get_object("Bullet").unwrap();
        // A hidden character bullet: writing Type re-shows it, so the
        // declared order must end with Visible.
        bullet.set("Type", bullet_type::UNNUMBERED).unwrap();
        bullet.set("Visible", tri::FALSE).unwrap();
        let model = BulletFormatApi::from_api(&bullet).unwrap();
        assert_eq!(model.visible, Some(tri::FALSE));

        let other = paragraph_format().get_object("Bullet").unwrap();
        model.apply_api(&other).unwrap();
        assert_eq!(other.get_i64("Type").unwrap(), bullet_type::UNNUMBERED);
        assert_eq!(other.get_i64("Visible").unwrap(), tri::FALSE);
    }

    #[test]
    fn test_character_only_captured_for_character_bullets() {
        let pf = paragraph_format();
        let bullet = pf.get_object("Bullet").unwrap();
        let model = BulletFormatApi::from_api(&bullet).unwrap();
        assert_eq!(model.kind, Some(bullet_type::NONE));
        assert_eq!(model.character, None);
    }
}
