/// Ordered, duplicate-free list of lowercase ingredient names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientList {
    items: Vec<String>,
}

impl IngredientList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` lowercased and trimmed. Returns `false` for blank input or
    /// a name already present in any casing.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        if name.is_empty() || self.items.contains(&name) {
            return false;
        }
        self.items.push(name);
        true
    }

    /// Remove the item at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn remove_named(&mut self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        let before = self.items.len();
        self.items.retain(|item| *item != name);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// "a, b, c" for spoken responses and the query string.
    pub fn joined(&self, separator: &str) -> String {
        self.items.join(separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_dedup() {
        let mut list = IngredientList::new();
        assert!(list.add("Chicken"));
        assert!(!list.add("chicken"));
        assert_eq!(list.as_slice(), &["chicken".to_string()]);
    }

    #[test]
    fn add_remove_re_add() {
        let mut list = IngredientList::new();
        list.add("tomato");
        assert_eq!(list.remove(0).as_deref(), Some("tomato"));
        assert!(list.is_empty());
        list.add("tomato");
        assert_eq!(list.as_slice(), &["tomato".to_string()]);
    }

    #[test]
    fn insertion_order_is_kept() {
        let mut list = IngredientList::new();
        for name in ["rice", "Egg", "scallion"] {
            list.add(name);
        }
        assert_eq!(list.joined(", "), "rice, egg, scallion");
        assert!(list.remove_named("EGG"));
        assert_eq!(list.joined(","), "rice,scallion");
    }

    #[test]
    fn blank_and_out_of_range_are_ignored() {
        let mut list = IngredientList::new();
        assert!(!list.add("   "));
        assert_eq!(list.remove(3), None);
        assert!(!list.remove_named("basil"));
        list.add("basil");
        list.clear();
        assert_eq!(list.len(), 0);
    }
}
