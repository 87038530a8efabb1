//! ItemEntity 与 BSON 文档之间的转换
//!
//! 读取时 name、description、status、created_at 为必填字段，
//! 缺失即返回验证错误，不会构造出残缺的实体。

use bson::{Bson, Document};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use void_domain::{ItemEntity, ItemStatus};
use void_errors::{VoidError, VoidResult};

pub fn item_to_document(entity: &ItemEntity) -> VoidResult<Document> {
    let metadata = match &entity.metadata {
        Some(map) => bson::to_bson(&Value::Object(map.clone()))
            .map_err(|e| VoidError::Serialization(format!("序列化 metadata 失败: {e}")))?,
        None => Bson::Null,
    };

    Ok(bson::doc! {
        "name": entity.name.clone(),
        "description": entity.description.clone(),
        "status": entity.status.as_str(),
        "created_at": bson::DateTime::from_chrono(entity.created_at),
        "updated_at": entity.updated_at.map(bson::DateTime::from_chrono),
        "metadata": metadata,
    })
}

pub fn item_from_document(doc: &Document) -> VoidResult<ItemEntity> {
    let name = required_str(doc, "name")?;
    let description = required_str(doc, "description")?;
    let status: ItemStatus = required_str(doc, "status")?.parse()?;
    let created_at = match doc.get("created_at") {
        None | Some(Bson::Null) => return Err(missing("created_at")),
        Some(value) => to_datetime(value, "created_at")?,
    };
    let updated_at = match doc.get("updated_at") {
        None | Some(Bson::Null) => None,
        Some(value) => Some(to_datetime(value, "updated_at")?),
    };
    let metadata = match doc.get("metadata") {
        None | Some(Bson::Null) => None,
        Some(Bson::Document(d)) => Some(to_json_map(d)),
        Some(_) => {
            return Err(VoidError::validation_error(
                "Field 'metadata' must be a document",
            ))
        }
    };

    let entity = ItemEntity::new(name, description, status, created_at)?
        .with_updated_at(updated_at)
        .with_metadata(metadata);
    entity.validate()?;

    Ok(match doc.get("_id") {
        Some(Bson::ObjectId(oid)) => entity.with_id(oid.to_hex()),
        Some(Bson::String(s)) => entity.with_id(s.clone()),
        _ => entity,
    })
}

fn missing(field: &str) -> VoidError {
    VoidError::validation_error(format!("Field '{field}' is required"))
}

fn required_str<'a>(doc: &'a Document, field: &str) -> VoidResult<&'a str> {
    match doc.get(field) {
        None | Some(Bson::Null) => Err(missing(field)),
        Some(Bson::String(s)) => Ok(s.as_str()),
        Some(_) => Err(VoidError::validation_error(format!(
            "Field '{field}' must be a string"
        ))),
    }
}

/// 没有时区的时间按 UTC 处理
fn to_datetime(value: &Bson, field: &str) -> VoidResult<DateTime<Utc>> {
    match value {
        Bson::DateTime(dt) => Ok(dt.to_chrono()),
        Bson::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.with_timezone(&Utc));
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc())
                .map_err(|e| {
                    VoidError::validation_error(format!("Field '{field}' is not a timestamp: {e}"))
                })
        }
        _ => Err(VoidError::validation_error(format!(
            "Field '{field}' must be a datetime"
        ))),
    }
}

fn to_json_map(doc: &Document) -> Map<String, Value> {
    match Bson::Document(doc.clone()).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
