use crate::styles::Color;

/// Representation of a drawing layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    pub name: String,
    pub color: Color,
    pub visible: bool,
    pub locked: bool,
    pub order: usize,
}

impl Layer {
    /// Creates a new visible, unlocked layer.
    pub fn new(name: &str, color: Color) -> Self {
        Self {
            name: name.to_string(),
            color,
            visible: true,
            locked: false,
            order: 0,
        }
    }
}

/// Ordered collection of uniquely named layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerManager {
    layers: Vec<Layer>,
}

impl LayerManager {
    /// Creates an empty layer manager.
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Layers every new survey drawing starts with.
    pub fn with_survey_defaults() -> Self {
        let mut lm = Self::new();
        lm.add_layer(Layer::new("Boundary", Color::WHITE));
        lm.add_layer(Layer::new("Offset", Color::ORANGE));
        lm.add_layer(Layer::new("Partition", Color::CYAN));
        lm.add_layer(Layer::new("Pegs", Color::RED));
        lm.add_layer(Layer::new("Station", Color::GREEN));
        lm
    }

    /// Appends a layer; returns `false` if the name is already taken.
    pub fn add_layer(&mut self, mut layer: Layer) -> bool {
        if self.layer(&layer.name).is_some() {
            return false;
        }
        layer.order = self.layers.len();
        self.layers.push(layer);
        true
    }

    /// Adds a default layer for `name` unless one exists.
    pub fn ensure_layer(&mut self, name: &str, color: Color) -> bool {
        self.add_layer(Layer::new(name, color))
    }

    /// Removes and returns the named layer, renumbering the remaining order.
    pub fn remove_layer(&mut self, name: &str) -> Option<Layer> {
        let idx = self.layers.iter().position(|l| l.name == name)?;
        let removed = self.layers.remove(idx);
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.order = i;
        }
        Some(removed)
    }

    /// Renames a layer; fails if `old` is missing or `new` is taken.
    pub fn rename_layer(&mut self, old: &str, new: &str) -> bool {
        if old == new || self.layer(new).is_some() {
            return false;
        }
        match self.layer_mut(old) {
            Some(layer) => {
                layer.name = new.to_string();
                true
            }
            None => false,
        }
    }

    /// Retrieves a layer by name.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Retrieves a mutable reference to a layer by name.
    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    /// Entities on unknown layers are treated as visible.
    pub fn is_visible(&self, name: &str) -> bool {
        self.layer(name).map_or(true, |l| l.visible)
    }

    pub fn is_locked(&self, name: &str) -> bool {
        self.layer(name).map_or(false, |l| l.locked)
    }

    /// Returns all layers matching `predicate`.
    pub fn filter<F>(&self, predicate: F) -> Vec<&Layer>
    where
        F: Fn(&Layer) -> bool,
    {
        self.layers.iter().filter(|l| predicate(l)).collect()
    }

    /// Iterator over all layer names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.name.as_str())
    }

    /// Iterator over all layers in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_rejected() {
        let mut lm = LayerManager::new();
        assert!(lm.add_layer(Layer::new("A", Color::RED)));
        assert!(!lm.add_layer(Layer::new("A", Color::GREEN)));
        assert_eq!(lm.len(), 1);
        assert_eq!(lm.layer("A").unwrap().color, Color::RED);
    }

    #[test]
    fn removal_renumbers_order() {
        let mut lm = LayerManager::with_survey_defaults();
        lm.remove_layer("Offset").unwrap();
        let orders: Vec<usize> = lm.iter().map(|l| l.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
        assert!(lm.remove_layer("Offset").is_none());
    }

    #[test]
    fn unknown_layers_are_visible_and_unlocked() {
        let lm = LayerManager::new();
        assert!(lm.is_visible("nope"));
        assert!(!lm.is_locked("nope"));
    }
}
