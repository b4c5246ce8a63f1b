//! Inline style declarations (the `style` attribute)

/// Ordered list of `property: value` declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(Box<str>, String)>,
}

impl InlineStyle {
    /// Parse inline style string into property-value pairs
    pub fn parse(style: &str) -> Self {
        let declarations = style
            .split(';')
            .filter_map(|decl| {
                let decl = decl.trim();
                if decl.is_empty() {
                    return None;
                }

                let mut parts = decl.splitn(2, ':');
                let name = parts.next()?.trim();
                let value = parts.next()?.trim();

                if name.is_empty() || value.is_empty() {
                    return None;
                }

                Some((name.to_ascii_lowercase().into_boxed_str(), value.to_string()))
            })
            .collect();
        Self { declarations }
    }

    /// Get a property value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, replacing any existing value in place
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.declarations.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value,
            None => self
                .declarations
                .push((name.to_ascii_lowercase().into_boxed_str(), value)),
        }
    }

    /// Remove a property, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self
            .declarations
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))?;
        Some(self.declarations.remove(pos).1)
    }

    /// `display: none` declared inline
    pub fn is_display_none(&self) -> bool {
        self.get("display")
            .map(|v| {
                let v = v.trim_end_matches("!important").trim();
                v.eq_ignore_ascii_case("none")
            })
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Iterate declarations in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(n, v)| (&**n, v.as_str()))
    }

    /// Serialize as `a: b; c: d`
    pub fn to_css_text(&self) -> String {
        self.iter()
            .map(|(n, v)| format!("{n}: {v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
