//! Bitmask-encoded UI object queries.
//!
//! A [`Selector`] is the agent's `UiSelector` payload: a set of attribute
//! predicates, an integer mask recording which predicates are present, and a
//! chain of nested selectors resolved remotely as child or sibling hops.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

/// Wire key carrying a resolved object reference.
pub const UID_KEY: &str = "__UID";
pub const MASK_KEY: &str = "mask";
pub const RELATIONS_KEY: &str = "childOrSibling";
pub const CHAIN_KEY: &str = "childOrSiblingSelector";

/// Shape a recognised key's value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Bool,
    Int,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Str => "string",
            ValueKind::Bool => "bool",
            ValueKind::Int => "integer",
        }
    }
}

macro_rules! selector_keys {
    ($($variant:ident => $name:literal, $mask:literal, $kind:ident;)+) => {
        /// Query keys understood by the agent, each owning one mask bit.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum SelectorKey {
            $($variant,)+
        }

        impl SelectorKey {
            pub const ALL: &'static [SelectorKey] = &[$(SelectorKey::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(SelectorKey::$variant => $name,)+
                }
            }

            pub fn mask(&self) -> u32 {
                match self {
                    $(SelectorKey::$variant => $mask,)+
                }
            }

            pub fn value_kind(&self) -> ValueKind {
                match self {
                    $(SelectorKey::$variant => ValueKind::$kind,)+
                }
            }
        }

        impl FromStr for SelectorKey {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(SelectorKey::$variant),)+
                    _ => Err(()),
                }
            }
        }
    };
}

selector_keys! {
    Text => "text", 0x01, Str;
    TextContains => "textContains", 0x02, Str;
    TextMatches => "textMatches", 0x04, Str;
    TextStartsWith => "textStartsWith", 0x08, Str;
    ClassName => "className", 0x10, Str;
    ClassNameMatches => "classNameMatches", 0x20, Str;
    Description => "description", 0x40, Str;
    DescriptionContains => "descriptionContains", 0x80, Str;
    DescriptionMatches => "descriptionMatches", 0x0100, Str;
    DescriptionStartsWith => "descriptionStartsWith", 0x0200, Str;
    Checkable => "checkable", 0x0400, Bool;
    Checked => "checked", 0x0800, Bool;
    Clickable => "clickable", 0x1000, Bool;
    LongClickable => "longClickable", 0x2000, Bool;
    Scrollable => "scrollable", 0x4000, Bool;
    Enabled => "enabled", 0x8000, Bool;
    Focusable => "focusable", 0x010000, Bool;
    Focused => "focused", 0x020000, Bool;
    Selected => "selected", 0x040000, Bool;
    PackageName => "packageName", 0x080000, Str;
    PackageNameMatches => "packageNameMatches", 0x100000, Str;
    ResourceId => "resourceId", 0x200000, Str;
    ResourceIdMatches => "resourceIdMatches", 0x400000, Str;
    Index => "index", 0x800000, Int;
    Instance => "instance", 0x01000000, Int;
}

impl fmt::Display for SelectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("selector must be a JSON object, got {found}")]
    NotAnObject { found: String },

    #[error("selector key '{key}' expects a {expected} value, got {found}")]
    InvalidValue {
        key: String,
        expected: &'static str,
        found: String,
    },

    #[error("unknown chain relation '{0}' (expected 'child' or 'sibling')")]
    InvalidRelation(String),

    #[error("chain has {relations} relations but {selectors} nested selectors")]
    ChainMismatch { relations: usize, selectors: usize },

    #[error("invalid selector JSON: {0}")]
    Parse(String),
}

/// A predicate value. Only these three shapes are accepted by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SelectorValue {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl SelectorValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            SelectorValue::Str(_) => ValueKind::Str,
            SelectorValue::Bool(_) => ValueKind::Bool,
            SelectorValue::Int(_) => ValueKind::Int,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SelectorValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SelectorValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SelectorValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    fn from_json(key: SelectorKey, value: &Value) -> Result<Self, SelectorError> {
        let parsed = match key.value_kind() {
            ValueKind::Str => value.as_str().map(|s| SelectorValue::Str(s.to_string())),
            ValueKind::Bool => value.as_bool().map(SelectorValue::Bool),
            ValueKind::Int => value.as_i64().map(SelectorValue::Int),
        };
        parsed.ok_or_else(|| SelectorError::InvalidValue {
            key: key.as_str().to_string(),
            expected: key.value_kind().as_str(),
            found: json_type_name(value).to_string(),
        })
    }

    fn to_json(&self) -> Value {
        match self {
            SelectorValue::Str(s) => Value::String(s.clone()),
            SelectorValue::Bool(b) => Value::Bool(*b),
            SelectorValue::Int(n) => Value::from(*n),
        }
    }
}

impl From<&str> for SelectorValue {
    fn from(value: &str) -> Self {
        SelectorValue::Str(value.to_string())
    }
}

impl From<String> for SelectorValue {
    fn from(value: String) -> Self {
        SelectorValue::Str(value)
    }
}

impl From<bool> for SelectorValue {
    fn from(value: bool) -> Self {
        SelectorValue::Bool(value)
    }
}

impl From<i64> for SelectorValue {
    fn from(value: i64) -> Self {
        SelectorValue::Int(value)
    }
}

impl From<i32> for SelectorValue {
    fn from(value: i32) -> Self {
        SelectorValue::Int(i64::from(value))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// How a nested chain entry relates to the selector before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Child,
    Sibling,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Child => "child",
            Relation::Sibling => "sibling",
        }
    }
}

impl FromStr for Relation {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "child" => Ok(Relation::Child),
            "sibling" => Ok(Relation::Sibling),
            other => Err(SelectorError::InvalidRelation(other.to_string())),
        }
    }
}

/// A query for a remote UI object.
///
/// The mask always equals the OR of the present keys' bits. Derivations
/// (`child`, `sibling`, `with_instance`) return deep copies, so a derived
/// selector never shares chain entries with the one it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    fields: BTreeMap<SelectorKey, SelectorValue>,
    mask: u32,
    child_or_sibling: Vec<Relation>,
    child_or_sibling_selector: Vec<Selector>,
    uid: Option<String>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A selector standing for an object the agent already resolved.
    pub fn resolved(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            ..Self::default()
        }
    }

    /// Parse a selector from loosely typed JSON.
    ///
    /// Unrecognised keys are dropped and `mask` is re-derived rather than
    /// trusted. A recognised key holding the wrong value shape is an error.
    pub fn from_json(value: &Value) -> Result<Self, SelectorError> {
        let Value::Object(map) = value else {
            return Err(SelectorError::NotAnObject {
                found: json_type_name(value).to_string(),
            });
        };

        let mut selector = Selector::new();
        for (key, raw) in map {
            match key.as_str() {
                MASK_KEY => {}
                UID_KEY => {
                    let uid = raw.as_str().ok_or_else(|| SelectorError::InvalidValue {
                        key: UID_KEY.to_string(),
                        expected: ValueKind::Str.as_str(),
                        found: json_type_name(raw).to_string(),
                    })?;
                    selector.uid = Some(uid.to_string());
                }
                RELATIONS_KEY => {
                    selector.child_or_sibling = parse_relations(raw)?;
                }
                CHAIN_KEY => {
                    selector.child_or_sibling_selector = parse_chain(raw)?;
                }
                other => {
                    if let Ok(known) = other.parse::<SelectorKey>() {
                        let parsed = SelectorValue::from_json(known, raw)?;
                        selector.fields.insert(known, parsed);
                    }
                }
            }
        }

        if selector.child_or_sibling.len() != selector.child_or_sibling_selector.len() {
            return Err(SelectorError::ChainMismatch {
                relations: selector.child_or_sibling.len(),
                selectors: selector.child_or_sibling_selector.len(),
            });
        }

        selector.normalize();
        Ok(selector)
    }

    /// Re-derive the mask from the present keys, recursively.
    pub fn normalize(&mut self) {
        self.mask = self.fields.keys().fold(0, |mask, key| mask | key.mask());
        for nested in &mut self.child_or_sibling_selector {
            nested.normalize();
        }
    }

    pub fn normalized(&self) -> Self {
        let mut copy = self.clone();
        copy.normalize();
        copy
    }

    /// Set a key after checking the value has the shape the key expects.
    pub fn set(
        &mut self,
        key: SelectorKey,
        value: impl Into<SelectorValue>,
    ) -> Result<(), SelectorError> {
        let value = value.into();
        if value.kind() != key.value_kind() {
            return Err(SelectorError::InvalidValue {
                key: key.as_str().to_string(),
                expected: key.value_kind().as_str(),
                found: value.kind().as_str().to_string(),
            });
        }
        self.insert(key, value);
        Ok(())
    }

    /// Builder form of [`Selector::set`].
    pub fn with(
        mut self,
        key: SelectorKey,
        value: impl Into<SelectorValue>,
    ) -> Result<Self, SelectorError> {
        self.set(key, value)?;
        Ok(self)
    }

    pub fn remove(&mut self, key: SelectorKey) -> Option<SelectorValue> {
        let removed = self.fields.remove(&key);
        self.mask &= !key.mask();
        removed
    }

    fn insert(&mut self, key: SelectorKey, value: SelectorValue) {
        self.fields.insert(key, value);
        self.mask |= key.mask();
    }

    fn with_str(mut self, key: SelectorKey, value: impl Into<String>) -> Self {
        self.insert(key, SelectorValue::Str(value.into()));
        self
    }

    fn with_bool(mut self, key: SelectorKey, value: bool) -> Self {
        self.insert(key, SelectorValue::Bool(value));
        self
    }

    pub fn text(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::Text, value)
    }

    pub fn text_contains(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::TextContains, value)
    }

    pub fn text_matches(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::TextMatches, value)
    }

    pub fn text_starts_with(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::TextStartsWith, value)
    }

    pub fn class_name(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::ClassName, value)
    }

    pub fn class_name_matches(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::ClassNameMatches, value)
    }

    pub fn description(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::Description, value)
    }

    pub fn description_contains(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::DescriptionContains, value)
    }

    pub fn description_matches(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::DescriptionMatches, value)
    }

    pub fn description_starts_with(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::DescriptionStartsWith, value)
    }

    pub fn package_name(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::PackageName, value)
    }

    pub fn package_name_matches(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::PackageNameMatches, value)
    }

    pub fn resource_id(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::ResourceId, value)
    }

    pub fn resource_id_matches(self, value: impl Into<String>) -> Self {
        self.with_str(SelectorKey::ResourceIdMatches, value)
    }

    pub fn checkable(self, value: bool) -> Self {
        self.with_bool(SelectorKey::Checkable, value)
    }

    pub fn checked(self, value: bool) -> Self {
        self.with_bool(SelectorKey::Checked, value)
    }

    pub fn clickable(self, value: bool) -> Self {
        self.with_bool(SelectorKey::Clickable, value)
    }

    pub fn long_clickable(self, value: bool) -> Self {
        self.with_bool(SelectorKey::LongClickable, value)
    }

    pub fn scrollable(self, value: bool) -> Self {
        self.with_bool(SelectorKey::Scrollable, value)
    }

    pub fn enabled(self, value: bool) -> Self {
        self.with_bool(SelectorKey::Enabled, value)
    }

    pub fn focusable(self, value: bool) -> Self {
        self.with_bool(SelectorKey::Focusable, value)
    }

    pub fn focused(self, value: bool) -> Self {
        self.with_bool(SelectorKey::Focused, value)
    }

    pub fn selected(self, value: bool) -> Self {
        self.with_bool(SelectorKey::Selected, value)
    }

    pub fn index(mut self, value: i64) -> Self {
        self.insert(SelectorKey::Index, SelectorValue::Int(value));
        self
    }

    pub fn instance(mut self, value: i64) -> Self {
        self.insert(SelectorKey::Instance, SelectorValue::Int(value));
        self
    }

    pub fn get(&self, key: SelectorKey) -> Option<&SelectorValue> {
        self.fields.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = SelectorKey> + '_ {
        self.fields.keys().copied()
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn relations(&self) -> &[Relation] {
        &self.child_or_sibling
    }

    pub fn chain(&self) -> &[Selector] {
        &self.child_or_sibling_selector
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.uid.is_some()
    }

    /// Append a child hop. The root predicates stay untouched.
    pub fn child(&self, selector: &Selector) -> Selector {
        let mut derived = self.clone();
        derived.child_or_sibling.push(Relation::Child);
        derived.child_or_sibling_selector.push(selector.normalized());
        derived
    }

    /// Replace the whole chain with a single sibling hop.
    pub fn sibling(&self, selector: &Selector) -> Selector {
        let mut derived = self.clone();
        derived.child_or_sibling = vec![Relation::Sibling];
        derived.child_or_sibling_selector = vec![selector.normalized()];
        derived
    }

    /// Select the `index`-th match of the most specific selector: the last
    /// chain entry when a chain exists, otherwise the root.
    pub fn with_instance(&self, index: i64) -> Selector {
        let mut derived = self.clone();
        match derived.child_or_sibling_selector.last_mut() {
            Some(last) => {
                last.insert(SelectorKey::Instance, SelectorValue::Int(index));
                last.normalize();
            }
            None => {
                derived.insert(SelectorKey::Instance, SelectorValue::Int(index));
                derived.normalize();
            }
        }
        derived
    }

    /// The full wire payload.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.fields {
            map.insert(key.as_str().to_string(), value.to_json());
        }
        map.insert(MASK_KEY.to_string(), Value::from(self.mask));
        map.insert(
            RELATIONS_KEY.to_string(),
            Value::Array(
                self.child_or_sibling
                    .iter()
                    .map(|r| Value::String(r.as_str().to_string()))
                    .collect(),
            ),
        );
        map.insert(
            CHAIN_KEY.to_string(),
            Value::Array(
                self.child_or_sibling_selector
                    .iter()
                    .map(Selector::to_json)
                    .collect(),
            ),
        );
        Value::Object(map)
    }

    /// What the agent receives as the object parameter: the resolved uid
    /// alone when present, the full payload otherwise.
    pub fn to_params(&self) -> Value {
        match &self.uid {
            Some(uid) => Value::String(uid.clone()),
            None => self.to_json(),
        }
    }
}

fn parse_relations(raw: &Value) -> Result<Vec<Relation>, SelectorError> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| SelectorError::InvalidRelation(item.to_string()))?
                    .parse()
            })
            .collect(),
        other => Err(SelectorError::InvalidValue {
            key: RELATIONS_KEY.to_string(),
            expected: "array",
            found: json_type_name(other).to_string(),
        }),
    }
}

fn parse_chain(raw: &Value) -> Result<Vec<Selector>, SelectorError> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(Selector::from_json).collect(),
        other => Err(SelectorError::InvalidValue {
            key: CHAIN_KEY.to_string(),
            expected: "array",
            found: json_type_name(other).to_string(),
        }),
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| SelectorError::Parse(e.to_string()))?;
        Selector::from_json(&value)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_id_mask_and_structural_keys() {
        let selector = Selector::from_json(&json!({"resourceId": "app:id/x"})).unwrap();
        assert_eq!(selector.mask(), 0x200000);

        let wire = selector.to_json();
        assert_eq!(wire["resourceId"], "app:id/x");
        assert_eq!(wire["mask"], 0x200000);
        assert_eq!(wire["childOrSibling"], json!([]));
        assert_eq!(wire["childOrSiblingSelector"], json!([]));
    }

    #[test]
    fn test_unrecognised_keys_are_dropped() {
        let selector = Selector::from_json(&json!({"colour": "red", "size": 3})).unwrap();
        assert_eq!(selector.mask(), 0);
        assert_eq!(selector.keys().count(), 0);
        let wire = selector.to_json();
        assert!(wire.get("colour").is_none());
        assert!(wire.get("size").is_none());
    }

    #[test]
    fn test_incoming_mask_is_not_trusted() {
        let selector = Selector::from_json(&json!({"text": "OK", "mask": 0xFFFF})).unwrap();
        assert_eq!(selector.mask(), SelectorKey::Text.mask());
    }

    #[test]
    fn test_mask_combines_keys() {
        let selector = Selector::new()
            .text("OK")
            .class_name("android.widget.Button")
            .clickable(true)
            .instance(2);
        assert_eq!(selector.mask(), 0x01 | 0x10 | 0x1000 | 0x01000000);
    }

    #[test]
    fn test_wrong_value_shape_is_rejected() {
        let err = Selector::from_json(&json!({"clickable": "yes"})).unwrap_err();
        assert_eq!(
            err,
            SelectorError::InvalidValue {
                key: "clickable".to_string(),
                expected: "bool",
                found: "string".to_string(),
            }
        );

        let err = Selector::from_json(&json!({"instance": 1.5})).unwrap_err();
        assert!(matches!(err, SelectorError::InvalidValue { .. }));
    }

    #[test]
    fn test_set_checks_value_kind() {
        let mut selector = Selector::new();
        assert!(selector.set(SelectorKey::Text, "Login").is_ok());
        assert!(selector.set(SelectorKey::Index, "first").is_err());
        assert_eq!(selector.mask(), SelectorKey::Text.mask());

        let built = Selector::new()
            .with(SelectorKey::Checked, true)
            .and_then(|s| s.with(SelectorKey::Index, 2i64))
            .unwrap();
        assert_eq!(built.mask(), 0x0800 | 0x800000);
    }

    #[test]
    fn test_remove_clears_mask_bit() {
        let mut selector = Selector::new().text("a").enabled(true);
        selector.remove(SelectorKey::Text);
        assert_eq!(selector.mask(), SelectorKey::Enabled.mask());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(matches!(
            Selector::from_json(&json!(["text"])),
            Err(SelectorError::NotAnObject { .. })
        ));
    }

    #[test]
    fn test_unknown_relation_is_rejected() {
        let err = Selector::from_json(&json!({
            "text": "a",
            "childOrSibling": ["parent"],
            "childOrSiblingSelector": [{"text": "b"}]
        }))
        .unwrap_err();
        assert_eq!(err, SelectorError::InvalidRelation("parent".to_string()));
    }

    #[test]
    fn test_chain_length_mismatch_is_rejected() {
        let err = Selector::from_json(&json!({
            "childOrSibling": ["child", "child"],
            "childOrSiblingSelector": [{"text": "b"}]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            SelectorError::ChainMismatch {
                relations: 2,
                selectors: 1
            }
        );
    }

    #[test]
    fn test_nested_chain_is_normalised() {
        let selector = Selector::from_json(&json!({
            "className": "android.widget.ListView",
            "childOrSibling": ["child"],
            "childOrSiblingSelector": [{"text": "Item", "mask": 99, "bogus": 1}]
        }))
        .unwrap();
        assert_eq!(selector.chain().len(), 1);
        assert_eq!(selector.chain()[0].mask(), SelectorKey::Text.mask());
        assert_eq!(selector.relations(), &[Relation::Child]);
    }

    #[test]
    fn test_child_appends_to_chain() {
        let root = Selector::new().class_name("android.widget.ScrollView");
        let derived = root
            .child(&Selector::new().class_name("android.view.ViewGroup"))
            .child(&Selector::new().text("Clock"));

        assert_eq!(derived.relations(), &[Relation::Child, Relation::Child]);
        assert_eq!(derived.chain().len(), 2);
        assert_eq!(
            derived.get(SelectorKey::ClassName),
            Some(&SelectorValue::Str("android.widget.ScrollView".to_string()))
        );
        assert!(root.chain().is_empty());
    }

    #[test]
    fn test_sibling_replaces_chain() {
        let root = Selector::new().text("Wi-Fi");
        let derived = root
            .child(&Selector::new().text("a"))
            .child(&Selector::new().text("b"))
            .sibling(&Selector::new().class_name("android.widget.Switch"));

        assert_eq!(derived.relations(), &[Relation::Sibling]);
        assert_eq!(derived.chain().len(), 1);
        assert_eq!(
            derived.chain()[0].get(SelectorKey::ClassName),
            Some(&SelectorValue::Str("android.widget.Switch".to_string()))
        );
    }

    #[test]
    fn test_with_instance_on_last_chain_entry() {
        let root = Selector::new().class_name("android.widget.ListView");
        let chained = root
            .child(&Selector::new().text("first"))
            .child(&Selector::new().class_name("android.widget.TextView"));

        let picked = chained.with_instance(3);

        assert!(picked.get(SelectorKey::Instance).is_none());
        assert!(picked.chain()[0].get(SelectorKey::Instance).is_none());
        assert_eq!(
            picked.chain()[1].get(SelectorKey::Instance),
            Some(&SelectorValue::Int(3))
        );
        assert_eq!(
            picked.chain()[1].mask(),
            SelectorKey::ClassName.mask() | SelectorKey::Instance.mask()
        );
        assert!(chained.chain()[1].get(SelectorKey::Instance).is_none());
    }

    #[test]
    fn test_with_instance_on_root_without_chain() {
        let root = Selector::new().text("OK");
        let picked = root.with_instance(1);
        assert_eq!(
            picked.get(SelectorKey::Instance),
            Some(&SelectorValue::Int(1))
        );
        assert_eq!(
            picked.mask(),
            SelectorKey::Text.mask() | SelectorKey::Instance.mask()
        );
        assert!(root.get(SelectorKey::Instance).is_none());
    }

    #[test]
    fn test_resolved_selector_sends_uid_only() {
        let selector = Selector::resolved("uid-42");
        assert_eq!(selector.to_params(), json!("uid-42"));

        let parsed = Selector::from_json(&json!({"__UID": "uid-7"})).unwrap();
        assert_eq!(parsed.uid(), Some("uid-7"));
        assert_eq!(parsed.to_params(), json!("uid-7"));
    }

    #[test]
    fn test_uid_survives_normalisation() {
        let selector = Selector::resolved("uid-1").normalized();
        assert!(selector.is_resolved());
    }

    #[test]
    fn test_from_str_parses_json() {
        let selector: Selector = r#"{"text": "Settings"}"#.parse().unwrap();
        assert_eq!(selector.mask(), SelectorKey::Text.mask());
        assert!(matches!(
            "not json".parse::<Selector>(),
            Err(SelectorError::Parse(_))
        ));
    }

    #[test]
    fn test_every_key_round_trips_through_from_str() {
        for key in SelectorKey::ALL {
            assert_eq!(key.as_str().parse::<SelectorKey>(), Ok(*key));
        }
        let combined = SelectorKey::ALL.iter().fold(0u32, |m, k| {
            assert_eq!(m & k.mask(), 0, "mask bit of {} overlaps", k);
            m | k.mask()
        });
        assert_eq!(combined, 0x01FF_FFFF);
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_value_for(key: SelectorKey) -> BoxedStrategy<Value> {
            match key.value_kind() {
                ValueKind::Str => "[a-zA-Z:/._ ]{0,12}".prop_map(Value::from).boxed(),
                ValueKind::Bool => any::<bool>().prop_map(Value::from).boxed(),
                ValueKind::Int => (0i64..50).prop_map(Value::from).boxed(),
            }
        }

        fn arb_flat_json() -> impl Strategy<Value = Value> {
            let entry = (0..SelectorKey::ALL.len())
                .prop_flat_map(|i| {
                    let key = SelectorKey::ALL[i];
                    (Just(key.as_str().to_string()), arb_value_for(key))
                });
            let junk = ("[a-z]{3,8}_x", any::<i32>().prop_map(Value::from));
            (
                prop::collection::vec(entry, 0..6),
                prop::collection::vec(junk, 0..3),
            )
                .prop_map(|(known, unknown)| {
                    let mut map = Map::new();
                    for (k, v) in known.into_iter().chain(unknown) {
                        map.insert(k, v);
                    }
                    Value::Object(map)
                })
        }

        fn arb_selector_json() -> impl Strategy<Value = Value> {
            (arb_flat_json(), prop::collection::vec(arb_flat_json(), 0..3)).prop_map(
                |(mut root, nested)| {
                    let relations: Vec<Value> =
                        nested.iter().map(|_| Value::from("child")).collect();
                    root["childOrSibling"] = Value::Array(relations);
                    root["childOrSiblingSelector"] = Value::Array(nested);
                    root
                },
            )
        }

        proptest! {
            #[test]
            fn normalize_is_idempotent(raw in arb_selector_json()) {
                let once = Selector::from_json(&raw).unwrap();
                let twice = once.normalized();
                prop_assert_eq!(&once, &twice);

                let reparsed = Selector::from_json(&once.to_json()).unwrap();
                prop_assert_eq!(&reparsed, &once);
            }

            #[test]
            fn mask_matches_present_keys(raw in arb_flat_json()) {
                let selector = Selector::from_json(&raw).unwrap();
                let expected = selector.keys().fold(0u32, |m, k| m | k.mask());
                prop_assert_eq!(selector.mask(), expected);
            }

            #[test]
            fn derived_selectors_do_not_alias(raw in arb_selector_json(), index in 0i64..10) {
                let original = Selector::from_json(&raw).unwrap();
                let snapshot = original.clone();

                let _ = original.with_instance(index);
                let _ = original.child(&Selector::new().text("x"));
                let _ = original.sibling(&Selector::new().text("y"));

                prop_assert_eq!(&original, &snapshot);
            }
        }
    }
}
