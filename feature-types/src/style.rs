use serde::{Deserialize, Serialize};

/// Feature rendering style.
///
/// Colors are packed ARGB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    /// Simple dot marker.
    BasicPoint { color: u32, size: f32 },
    /// Icon marker loaded from a URI.
    Icon { uri: String, color: u32, scale: f32 },
    /// Text label.
    Label { text: String, color: u32, size: f32 },
    /// Line stroke.
    BasicStroke { color: u32, width: f32 },
    /// Area fill.
    BasicFill { color: u32 },
    /// Several styles applied together.
    Composite(Vec<Style>),
}

impl Style {
    pub fn point(color: u32, size: f32) -> Self {
        Style::BasicPoint { color, size }
    }

    pub fn icon(uri: impl Into<String>, color: u32, scale: f32) -> Self {
        Style::Icon {
            uri: uri.into(),
            color,
            scale,
        }
    }

    pub fn label(text: impl Into<String>, color: u32, size: f32) -> Self {
        Style::Label {
            text: text.into(),
            color,
            size,
        }
    }

    pub fn stroke(color: u32, width: f32) -> Self {
        Style::BasicStroke { color, width }
    }

    pub fn fill(color: u32) -> Self {
        Style::BasicFill { color }
    }

    /// Combine styles, flattening nested composites.
    pub fn composite(styles: impl IntoIterator<Item = Style>) -> Self {
        let mut flat = Vec::new();
        for style in styles {
            match style {
                Style::Composite(children) => flat.extend(children),
                other => flat.push(other),
            }
        }
        Style::Composite(flat)
    }

    /// The individual styles making up this style.
    pub fn components(&self) -> &[Style] {
        match self {
            Style::Composite(children) => children,
            single => std::slice::from_ref(single),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_flattens() {
        let inner = Style::composite([Style::stroke(0xFF00FF00, 2.0), Style::fill(0x8000FF00)]);
        let outer = Style::composite([inner, Style::point(0xFFFFFFFF, 4.0)]);

        assert_eq!(outer.components().len(), 3);
    }

    #[test]
    fn test_single_style_components() {
        let style = Style::label("HQ", 0xFFFFFFFF, 12.0);
        assert_eq!(style.components(), &[style.clone()]);
    }
}
