//! Hyperparameter grid enumeration
//!
//! Named value lists expanded as a Cartesian product in key insertion order,
//! so a given grid always enumerates its combinations in the same order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
    Text(String),
}

impl ParamValue {
    /// Get as float (converts int to float if needed)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Text(_) => None,
        }
    }

    /// Get as int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) => Some(*v as i64),
            ParamValue::Text(_) => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One grid point: an ordered set of named hyperparameter values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParamSet {
    entries: Vec<(String, ParamValue)>,
}

impl ParamSet {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_float)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Short descriptor for artifact names: the first three characters of
    /// each key followed by its value, joined with underscores.
    pub fn descriptor(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| {
                let prefix: String = k.chars().take(3).collect();
                format!("{prefix}_{v}")
            })
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> =
            self.entries.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{{{}}}", rendered.join(", "))
    }
}

/// Hyperparameter grid: named value lists expanded as a Cartesian product
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamGrid {
    params: Vec<(String, Vec<ParamValue>)>,
}

impl ParamGrid {
    /// Create an empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter and its candidate values. Re-adding a name replaces
    /// its values without changing its position in the enumeration order.
    pub fn add(&mut self, name: &str, values: Vec<ParamValue>) {
        if let Some(slot) = self.params.iter_mut().find(|(k, _)| k == name) {
            slot.1 = values;
        } else {
            self.params.push((name.to_string(), values));
        }
    }

    /// Convenience: add a float-valued parameter.
    pub fn floats(&mut self, name: &str, values: &[f64]) {
        self.add(name, values.iter().map(|&v| ParamValue::Float(v)).collect());
    }

    /// Convenience: add an int-valued parameter.
    pub fn ints(&mut self, name: &str, values: &[i64]) {
        self.add(name, values.iter().map(|&v| ParamValue::Int(v)).collect());
    }

    /// Number of parameters in the grid.
    pub fn n_params(&self) -> usize {
        self.params.len()
    }

    /// Number of combinations the grid expands to.
    pub fn len(&self) -> usize {
        self.params.iter().map(|(_, v)| v.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expand every combination, earliest-added parameter varying slowest.
    pub fn combinations(&self) -> Vec<ParamSet> {
        Self::product(&self.params)
    }

    fn product(params: &[(String, Vec<ParamValue>)]) -> Vec<ParamSet> {
        let Some((name, values)) = params.first() else {
            return vec![ParamSet::default()];
        };
        let rest = Self::product(&params[1..]);

        values
            .iter()
            .flat_map(|v| {
                rest.iter().map(move |tail| {
                    let mut entries = Vec::with_capacity(tail.entries.len() + 1);
                    entries.push((name.clone(), v.clone()));
                    entries.extend(tail.entries.iter().cloned());
                    ParamSet { entries }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spatiotemporal_grid() -> ParamGrid {
        let mut grid = ParamGrid::new();
        grid.floats("weight_decay", &[0.005, 0.5]);
        grid.floats("lr", &[1e-4, 1e-5]);
        grid.floats("dropout", &[0.0, 0.5]);
        grid
    }

    #[test]
    fn test_grid_len_is_product() {
        assert_eq!(spatiotemporal_grid().len(), 8);
    }

    #[test]
    fn test_grid_empty_param_list_yields_no_combinations() {
        let mut grid = ParamGrid::new();
        grid.floats("lr", &[]);
        assert_eq!(grid.len(), 0);
        assert!(grid.combinations().is_empty());
    }

    #[test]
    fn test_grid_no_params_yields_one_empty_combination() {
        let grid = ParamGrid::new();
        assert_eq!(grid.combinations(), vec![ParamSet::default()]);
    }

    #[test]
    fn test_grid_enumeration_order_is_stable() {
        let grid = spatiotemporal_grid();
        let combos = grid.combinations();
        // First key varies slowest: the first half all carry weight_decay 0.005.
        for combo in &combos[..4] {
            assert_eq!(combo.float("weight_decay"), Some(0.005));
        }
        for combo in &combos[4..] {
            assert_eq!(combo.float("weight_decay"), Some(0.5));
        }
        // Last key varies fastest.
        assert_eq!(combos[0].float("dropout"), Some(0.0));
        assert_eq!(combos[1].float("dropout"), Some(0.5));
    }

    #[test]
    fn test_grid_enumeration_is_deterministic() {
        let grid = spatiotemporal_grid();
        assert_eq!(grid.combinations(), grid.combinations());
    }

    #[test]
    fn test_grid_re_add_replaces_values_in_place() {
        let mut grid = spatiotemporal_grid();
        grid.floats("lr", &[1e-6]);
        assert_eq!(grid.len(), 4);
        let combos = grid.combinations();
        // lr still enumerates between weight_decay and dropout.
        assert_eq!(combos[0].iter().map(|(k, _)| k).collect::<Vec<_>>(),
                   vec!["weight_decay", "lr", "dropout"]);
    }

    #[test]
    fn test_param_set_accessors() {
        let combos = spatiotemporal_grid().combinations();
        let first = &combos[0];
        assert_eq!(first.len(), 3);
        assert_eq!(first.float("lr"), Some(1e-4));
        assert!(first.get("missing").is_none());
    }

    #[test]
    fn test_param_set_descriptor() {
        let mut grid = ParamGrid::new();
        grid.ints("min_child_weight", &[1]);
        grid.floats("gamma", &[0.5]);
        let combo = &grid.combinations()[0];
        assert_eq!(combo.descriptor(), "min_1_gam_0.5");
    }

    #[test]
    fn test_param_value_conversions() {
        assert_eq!(ParamValue::Int(3).as_float(), Some(3.0));
        assert_eq!(ParamValue::Float(2.7).as_int(), Some(2));
        assert_eq!(ParamValue::Text("relu".into()).as_str(), Some("relu"));
        assert_eq!(ParamValue::Text("relu".into()).as_float(), None);
    }

    #[test]
    fn test_param_set_display() {
        let mut grid = ParamGrid::new();
        grid.floats("lr", &[0.001]);
        let combo = &grid.combinations()[0];
        assert_eq!(format!("{combo}"), "{lr=0.001}");
    }

    #[test]
    fn test_grid_serde_round_trip() {
        let grid = spatiotemporal_grid();
        let json = serde_json::to_string(&grid).unwrap();
        let parsed: ParamGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.combinations(), grid.combinations());
    }
}
