//! Serde helpers for SurrealDB Thing ids
//!
//! Serializes `Thing` as the string form "table:id" and accepts both the
//! native SurrealDB representation and that string on deserialization.

use serde::{de, Deserialize, Deserializer, Serializer};
use std::fmt;
use surrealdb::sql::Thing;

fn parse_thing_from_string(s: &str) -> Thing {
    if let Some((tb, id)) = s.split_once(':') {
        Thing::from((tb.to_string(), id.to_string()))
    } else {
        Thing::from(("".to_string(), s.to_string()))
    }
}

struct ThingVisitor;

impl<'de> de::Visitor<'de> for ThingVisitor {
    type Value = Thing;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a Thing or a string like 'table:id'")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(parse_thing_from_string(v))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(parse_thing_from_string(&v))
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        Thing::deserialize(de::value::MapAccessDeserializer::new(map))
    }

    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Thing::deserialize(deserializer)
    }
}

/// Serialize a Thing as "table:id"
pub fn serialize<S>(thing: &Thing, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&thing.to_string())
}

/// Deserialize a Thing from either form
pub fn deserialize<'de, D>(deserializer: D) -> Result<Thing, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ThingVisitor)
}

/// Serde helpers for `Option<Thing>`
pub mod option {
    use super::*;

    struct OptionThingVisitor;

    impl<'de> de::Visitor<'de> for OptionThingVisitor {
        type Value = Option<Thing>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("null, a Thing, or a string like 'table:id'")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(ThingVisitor).map(Some)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_empty() {
                Ok(None)
            } else {
                Ok(Some(parse_thing_from_string(v)))
            }
        }
    }

    pub fn serialize<S>(thing: &Option<Thing>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match thing {
            Some(t) => serializer.serialize_str(&t.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Thing>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(OptionThingVisitor)
    }
}

/// Extract the raw key of an optional record id ("offer:abc" -> "abc")
pub fn id_string(thing: &Option<Thing>) -> String {
    thing.as_ref().map(|t| t.id.to_raw()).unwrap_or_default()
}
