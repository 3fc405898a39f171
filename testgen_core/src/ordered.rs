use std::fmt;
use std::marker::PhantomData;

use serde::Deserialize;
use serde::Deserializer;
use serde::de::MapAccess;
use serde::de::Visitor;

/// A string-keyed map that remembers the order its entries were declared in.
///
/// Deserializes from any mapping by reading entries straight off the
/// parser's map stream, so the declaration order of YAML, JSON and TOML
/// documents is preserved. Duplicate keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
	entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
	fn default() -> Self {
		Self {
			entries: Vec::new(),
		}
	}
}

impl<V> OrderedMap<V> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, key: &str) -> Option<&V> {
		self.entries
			.iter()
			.find(|(existing, _)| existing == key)
			.map(|(_, value)| value)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	/// Insert or replace an entry. A replaced entry keeps its original
	/// position; a new entry is appended.
	pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
		let key = key.into();
		if let Some(slot) = self
			.entries
			.iter_mut()
			.find(|(existing, _)| *existing == key)
		{
			return Some(std::mem::replace(&mut slot.1, value));
		}

		self.entries.push((key, value));
		None
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
		self.entries
			.iter()
			.map(|(key, value)| (key.as_str(), value))
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(key, _)| key.as_str())
	}

	pub fn values(&self) -> impl Iterator<Item = &V> {
		self.entries.iter().map(|(_, value)| value)
	}
}

impl<V: Clone> OrderedMap<V> {
	/// Shallow right-biased merge: entries of `overrides` replace entries of
	/// `self` with the same key in place, unknown keys are appended in the
	/// order `overrides` declares them.
	#[must_use]
	pub fn overlay(&self, overrides: &OrderedMap<V>) -> OrderedMap<V> {
		let mut merged = self.clone();
		for (key, value) in overrides.iter() {
			merged.insert(key, value.clone());
		}
		merged
	}
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut map = Self::new();
		for (key, value) in iter {
			map.insert(key, value);
		}
		map
	}
}

impl<V> IntoIterator for OrderedMap<V> {
	type IntoIter = std::vec::IntoIter<(String, V)>;
	type Item = (String, V);

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

struct OrderedMapVisitor<V> {
	marker: PhantomData<fn() -> OrderedMap<V>>,
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
	type Value = OrderedMap<V>;

	fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
		formatter.write_str("a mapping with unique string keys")
	}

	fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
		// An empty YAML section (`variants:` with nothing under it) is null.
		Ok(OrderedMap::new())
	}

	fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
		let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));

		while let Some((key, value)) = access.next_entry::<String, V>()? {
			if entries.iter().any(|(existing, _)| *existing == key) {
				return Err(serde::de::Error::custom(format!("duplicate key `{key}`")));
			}
			entries.push((key, value));
		}

		Ok(OrderedMap { entries })
	}
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_map(OrderedMapVisitor {
			marker: PhantomData,
		})
	}
}
