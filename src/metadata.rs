//! Metadata codec
//!
//! 商家合作请求把少量命名字段写进 `notes`：每行一个 `Key: value`。
//! 新记录同时落结构化列，这里的解析只用于读取旧数据和生成人类可读的 notes。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const KEY_BUSINESS: &str = "Business";
pub const KEY_CONTACT: &str = "Contact";
pub const KEY_PRODUCT: &str = "Product";
pub const KEY_COMMISSION_OFFER: &str = "Commission offer";
pub const KEY_ADDITIONAL_INFO: &str = "Additional info";
pub const KEY_CATEGORY: &str = "Category";

/// encode 输出顺序
pub const FIELD_ORDER: [&str; 6] = [
    KEY_BUSINESS,
    KEY_CONTACT,
    KEY_PRODUCT,
    KEY_COMMISSION_OFFER,
    KEY_ADDITIONAL_INFO,
    KEY_CATEGORY,
];

const SEPARATOR: &str = ": ";

pub type Metadata = HashMap<String, String>;

/// 编码为 `Key: value` 行
///
/// 已知字段按 `FIELD_ORDER` 输出，其余字段按 key 字典序追加在后面。
/// 空值（trim 后为空）视为缺失，不输出。
pub fn encode(fields: &Metadata) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(fields.len());

    for key in FIELD_ORDER {
        if let Some(value) = fields.get(key)
            && !value.trim().is_empty()
        {
            lines.push(format!("{}{}{}", key, SEPARATOR, value));
        }
    }

    let mut extra: Vec<(&String, &String)> = fields
        .iter()
        .filter(|(k, v)| !FIELD_ORDER.contains(&k.as_str()) && !v.trim().is_empty())
        .collect();
    extra.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in extra {
        lines.push(format!("{}{}{}", key, SEPARATOR, value));
    }

    lines.join("\n")
}

/// 解析 `Key: value` 行
///
/// 在第一个 `": "` 处切分，两侧 trim，缺 key 或缺 value 的行跳过，
/// 重复 key 以最后一次为准。`None` 和空串都返回空表。
pub fn decode<'a>(text: impl Into<Option<&'a str>>) -> Metadata {
    let mut out = Metadata::new();
    let Some(text) = text.into() else {
        return out;
    };

    for line in text.split('\n') {
        let Some((key, value)) = line.split_once(SEPARATOR) else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        out.insert(key.to_string(), value.to_string());
    }

    out
}

/// 商家合作请求的结构化字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_offer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl BusinessInfo {
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, v)| v.is_none())
    }

    fn fields(&self) -> [(&'static str, &Option<String>); 6] {
        [
            (KEY_BUSINESS, &self.business),
            (KEY_CONTACT, &self.contact),
            (KEY_PRODUCT, &self.product),
            (KEY_COMMISSION_OFFER, &self.commission_offer),
            (KEY_ADDITIONAL_INFO, &self.additional_info),
            (KEY_CATEGORY, &self.category),
        ]
    }

    pub fn to_metadata(&self) -> Metadata {
        self.fields()
            .into_iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), v.clone())))
            .collect()
    }

    pub fn from_metadata(meta: &Metadata) -> Self {
        let pick = |key: &str| meta.get(key).cloned();
        Self {
            business: pick(KEY_BUSINESS),
            contact: pick(KEY_CONTACT),
            product: pick(KEY_PRODUCT),
            commission_offer: pick(KEY_COMMISSION_OFFER),
            additional_info: pick(KEY_ADDITIONAL_INFO),
            category: pick(KEY_CATEGORY),
        }
    }

    pub fn to_notes(&self) -> String {
        encode(&self.to_metadata())
    }

    pub fn from_notes<'a>(notes: impl Into<Option<&'a str>>) -> Self {
        Self::from_metadata(&decode(notes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, &str)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_decode_basic() {
        let decoded = decode("Business: Acme\nContact: Jane");
        assert_eq!(decoded, meta(&[("Business", "Acme"), ("Contact", "Jane")]));
    }

    #[test]
    fn test_decode_empty_and_none() {
        assert!(decode("").is_empty());
        assert!(decode(None::<&str>).is_empty());
    }

    #[test]
    fn test_decode_skips_malformed_lines() {
        let decoded = decode("no separator here\n: orphan value\nKey:\nBusiness:   \n  Product :  Shoes  ");
        assert_eq!(decoded, meta(&[("Product", "Shoes")]));
    }

    #[test]
    fn test_decode_splits_on_first_separator() {
        let decoded = decode("Additional info: ratio: 3:1");
        assert_eq!(decoded.get("Additional info").map(String::as_str), Some("ratio: 3:1"));
    }

    #[test]
    fn test_decode_last_duplicate_wins() {
        let decoded = decode("Business: Old\r\nBusiness: New");
        assert_eq!(decoded.get("Business").map(String::as_str), Some("New"));
    }

    #[test]
    fn test_encode_declared_order() {
        let fields = meta(&[
            ("Additional info", "Ships worldwide"),
            ("Business", "Acme"),
            ("Commission offer", "15%"),
            ("Contact", "Jane"),
            ("Product", "Anvils"),
        ]);
        assert_eq!(
            encode(&fields),
            "Business: Acme\nContact: Jane\nProduct: Anvils\nCommission offer: 15%\nAdditional info: Ships worldwide"
        );
    }

    #[test]
    fn test_encode_skips_empty_and_appends_unknown_sorted() {
        let fields = meta(&[("Zeta", "z"), ("Business", "Acme"), ("Contact", " "), ("Alpha", "a")]);
        assert_eq!(encode(&fields), "Business: Acme\nAlpha: a\nZeta: z");
    }

    #[test]
    fn test_round_trip() {
        let fields = meta(&[
            ("Business", "Acme Corp"),
            ("Contact", "Jane Doe"),
            ("Product", "Rocket skates"),
            ("Commission offer", "20% first order"),
            ("Category", "Sports"),
        ]);
        assert_eq!(decode(encode(&fields).as_str()), fields);
    }

    #[test]
    fn test_business_info_notes() {
        let info = BusinessInfo {
            business: Some("Acme".to_string()),
            contact: Some("Jane".to_string()),
            product: Some("Anvils".to_string()),
            commission_offer: Some("10%".to_string()),
            additional_info: None,
            category: Some("Tools".to_string()),
        };
        let notes = info.to_notes();
        assert_eq!(
            notes,
            "Business: Acme\nContact: Jane\nProduct: Anvils\nCommission offer: 10%\nCategory: Tools"
        );
        assert_eq!(BusinessInfo::from_notes(notes.as_str()), info);
        assert!(BusinessInfo::from_notes(None::<&str>).is_empty());
        assert!(!info.is_empty());
    }
}
