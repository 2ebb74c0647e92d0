// Deterministic category/bin -> color assignment, shared by every chart

/// Fixed color palette; indices wrap around when there are more categories
/// than colors.
pub struct ColorPalette {
    colors: Vec<String>,
}

impl ColorPalette {
    /// The dashboard palette used across all five charts.
    pub fn dashboard() -> Self {
        ColorPalette {
            colors: vec![
                "#78D5D7".to_string(),
                "#FFA69E".to_string(),
                "#D4E157".to_string(),
                "#C3A6FF".to_string(),
                "#FFC5A1".to_string(),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The color key for a category/bin position: index modulo palette length.
    pub fn color_index(&self, index: usize) -> usize {
        index % self.colors.len()
    }

    /// Get the color for a specific index (wraps around).
    pub fn color(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }
}
