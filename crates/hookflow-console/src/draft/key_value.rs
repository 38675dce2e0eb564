//! Ordered key/value row editors for headers and query parameters.

use indexmap::IndexMap;

/// One editable row. Either side may be blank while editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueRow {
    pub key: String,
    pub value: String,
}

impl KeyValueRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Draft rows that collapse to a map on submit. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueEditor {
    rows: Vec<KeyValueRow>,
}

impl Default for KeyValueEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueEditor {
    /// A single blank row.
    pub fn new() -> Self {
        Self {
            rows: vec![KeyValueRow::default()],
        }
    }

    /// Rows for `map`; an empty map gives one blank row.
    pub fn from_map(map: &IndexMap<String, String>) -> Self {
        if map.is_empty() {
            return Self::new();
        }
        Self {
            rows: map
                .iter()
                .map(|(key, value)| KeyValueRow::new(key, value))
                .collect(),
        }
    }

    pub fn rows(&self) -> &[KeyValueRow] {
        &self.rows
    }

    /// Append a blank row.
    pub fn add_row(&mut self) {
        self.rows.push(KeyValueRow::default());
    }

    /// Remove row `index`. The last remaining row cannot be removed.
    pub fn remove_row(&mut self, index: usize) -> bool {
        if self.rows.len() <= 1 || index >= self.rows.len() {
            return false;
        }
        self.rows.remove(index);
        true
    }

    pub fn set_key(&mut self, index: usize, key: impl Into<String>) {
        if let Some(row) = self.rows.get_mut(index) {
            row.key = key.into();
        }
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(row) = self.rows.get_mut(index) {
            row.value = value.into();
        }
    }

    /// Append a filled row, reusing a trailing blank placeholder.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let row = KeyValueRow::new(key, value);
        match self.rows.last_mut() {
            Some(last) if last.key.is_empty() && last.value.is_empty() => *last = row,
            _ => self.rows.push(row),
        }
    }

    /// Collapse to a map in row order. Blank keys are dropped, keys are
    /// trimmed and the later of two equal keys wins, keeping the first
    /// key's position.
    pub fn to_map(&self) -> IndexMap<String, String> {
        self.rows
            .iter()
            .filter_map(|row| {
                let key = row.key.trim();
                (!key.is_empty()).then(|| (key.to_string(), row.value.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor(rows: &[(&str, &str)]) -> KeyValueEditor {
        let mut editor = KeyValueEditor::new();
        for (key, value) in rows {
            editor.push(*key, *value);
        }
        editor
    }

    #[test]
    fn test_empty_map_gives_one_blank_row() {
        let editor = KeyValueEditor::from_map(&IndexMap::new());
        assert_eq!(editor.rows(), &[KeyValueRow::default()]);
    }

    #[test]
    fn test_to_map_trims_and_drops_blank_keys() {
        let mut editor = editor(&[(" Authorization ", "Bearer x"), ("", "orphan")]);
        editor.add_row();
        let map = editor.to_map();

        assert_eq!(map.len(), 1);
        assert_eq!(map["Authorization"], "Bearer x");
    }

    #[test]
    fn test_later_duplicate_wins() {
        let map = editor(&[("page", "1"), ("limit", "5"), ("page", "2")]).to_map();
        assert_eq!(map["page"], "2");
        assert_eq!(map.keys().collect::<Vec<_>>(), ["page", "limit"]);
    }

    fn keys(editor: &KeyValueEditor) -> Vec<&str> {
        editor.rows().iter().map(|row| row.key.as_str()).collect()
    }

    #[test]
    fn test_round_trip_keeps_row_order() {
        let original = editor(&[("X-Trace", "on"), ("Authorization", "Bearer x")]);
        let reopened = KeyValueEditor::from_map(&original.to_map());

        assert_eq!(keys(&reopened), ["X-Trace", "Authorization"]);
    }

    #[test]
    fn test_round_trip_is_idempotent() {
        let original = editor(&[("b", "2"), ("a", "1"), ("", "x")]);
        let once = KeyValueEditor::from_map(&original.to_map());
        let twice = KeyValueEditor::from_map(&once.to_map());

        assert_eq!(once, twice);
        assert_eq!(once.to_map(), original.to_map());
        assert_eq!(keys(&once), ["b", "a"]);
    }

    #[test]
    fn test_last_row_cannot_be_removed() {
        let mut editor = KeyValueEditor::new();
        assert!(!editor.remove_row(0));

        editor.add_row();
        assert!(editor.remove_row(1));
        assert!(!editor.remove_row(5));
        assert_eq!(editor.rows().len(), 1);
    }

    #[test]
    fn test_set_key_and_value() {
        let mut editor = KeyValueEditor::new();
        editor.set_key(0, "limit");
        editor.set_value(0, "10");
        editor.set_value(3, "ignored");
        assert_eq!(editor.to_map()["limit"], "10");
    }
}
