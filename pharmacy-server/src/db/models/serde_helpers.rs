//! 模型层的 serde 辅助
//!
//! SurrealDB SDK 对 RecordId 有两种外形：API JSON 里的 "table:id" 字符串，
//! 和数据库读回的原生 map 结构。这里统一成字符串对外、两种都能读入，
//! 另有把 null 归一化为默认布尔值的小工具。

use serde::{Deserialize, Deserializer, Serializer};
use surrealdb::RecordId;

/// null -> true（用于 `is_active` 一类默认开启的开关）
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<bool>::deserialize(deserializer)?;
    Ok(opt.unwrap_or(true))
}

/// null -> false（用于 `requires_prescription` 一类默认关闭的开关）
pub fn bool_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<bool>::deserialize(deserializer)?;
    Ok(opt.unwrap_or(false))
}

/// 同时接受字符串与原生两种 RecordId 外形
#[derive(Debug, Clone)]
struct FlexibleRecordId(RecordId);

impl<'de> Deserialize<'de> for FlexibleRecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct IdVisitor;

        impl<'de> Visitor<'de> for IdVisitor {
            type Value = FlexibleRecordId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a 'table:id' string or a native record id")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse::<RecordId>()
                    .map(FlexibleRecordId)
                    .map_err(|_| de::Error::custom(format!("invalid record id: {}", value)))
            }

            fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
            where
                M: de::MapAccess<'de>,
            {
                // 原生外形交给 SDK 自己解析
                RecordId::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(FlexibleRecordId)
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// 必填 RecordId 字段：写出 "table:id" 字符串
pub mod record_id {
    use super::*;

    pub fn serialize<S>(id: &RecordId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<RecordId, D::Error>
    where
        D: Deserializer<'de>,
    {
        FlexibleRecordId::deserialize(d).map(|flexible| flexible.0)
    }
}

/// 可空 RecordId 字段
pub mod option_record_id {
    use super::*;

    pub fn serialize<S>(id: &Option<RecordId>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id {
            Some(id) => s.serialize_some(&id.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<FlexibleRecordId>::deserialize(d)?;
        Ok(opt.map(|flexible| flexible.0))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use surrealdb::RecordId;

    #[derive(Serialize, Deserialize)]
    struct Sample {
        #[serde(default, with = "super::option_record_id")]
        id: Option<RecordId>,
        #[serde(default, deserialize_with = "super::bool_false")]
        flag: bool,
    }

    #[test]
    fn record_id_from_string() {
        let sample: Sample = serde_json::from_str(r#"{"id":"medicine:abc","flag":null}"#)
            .expect("deserialize");
        assert_eq!(sample.id.as_ref().map(|i| i.to_string()).as_deref(), Some("medicine:abc"));
        assert!(!sample.flag);
    }

    #[test]
    fn record_id_serializes_as_string() {
        let sample = Sample {
            id: Some(RecordId::from_table_key("medicine", "abc")),
            flag: true,
        };
        let json = serde_json::to_string(&sample).expect("serialize");
        assert!(json.contains(r#""medicine:abc""#));
    }
}
