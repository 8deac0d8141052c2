//! # 命令串编解码模块（QueryCodec）
//!
//! ## 设计思路
//!
//! 链接与请求体共用同一种扁平格式：`key=value` 以 `&` 连接，值不做转义。
//! 解码得到有序映射 `QueryMap`，在其之上再包一层 `Command`，
//! 保证“命令一定带有 `type`”这一不变量只需在构造处检查一次。
//!
//! ## 实现思路
//!
//! - 先按 `&` 切分，再对每段按**第一个** `=` 切分；切不出两部分的段直接丢弃。
//! - 重复 key 时后出现的值覆盖先出现的值，但保留首次出现的位置。
//! - `encode` 是 `decode` 的对偶：同样不转义 `&` / `=`（已知限制，不在此修复）。

/// 有序的 key → value 映射。
///
/// key 唯一；插入已存在的 key 时原地替换值。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    pairs: Vec<(String, String)>,
}

impl QueryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或覆盖一个键值对。
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// 链式插入，便于构造请求体。
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 以切片形式暴露键值对，可直接交给 `reqwest` 的表单序列化。
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = QueryMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// 解码命令串。
///
/// 畸形片段（没有 `=` 的段、空段）被静默丢弃，不视为错误。
///
/// ```
/// use nightweb_client::query::decode;
///
/// let map = decode("a=1&b");
/// assert_eq!(map.get("a"), Some("1"));
/// assert_eq!(map.len(), 1);
/// ```
pub fn decode(raw: &str) -> QueryMap {
    let mut map = QueryMap::new();
    for segment in raw.split('&') {
        let parts: Vec<&str> = segment.splitn(2, '=').collect();
        if parts.len() != 2 {
            log::trace!("丢弃畸形命令片段: {:?}", segment);
            continue;
        }
        map.insert(parts[0], parts[1]);
    }
    map
}

/// 编码为命令串（不转义）。
pub fn encode(map: &QueryMap) -> String {
    map.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// 命令解析错误。
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("命令缺少 type 字段：{0:?}")]
    MissingType(String),
}

/// 已解码的命令：保证带有 `type`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    params: QueryMap,
}

impl Command {
    /// 从原始命令串解析。
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        Self::from_params(decode(raw)).map_err(|_| QueryError::MissingType(raw.to_string()))
    }

    /// 从已解码的映射构造。
    pub fn from_params(params: QueryMap) -> Result<Self, QueryError> {
        if !params.contains_key("type") {
            return Err(QueryError::MissingType(encode(&params)));
        }
        Ok(Self { params })
    }

    /// 路由判别值（`type`）。
    pub fn kind(&self) -> &str {
        self.params.get("type").unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    pub fn params(&self) -> &QueryMap {
        &self.params
    }

    pub fn to_query_string(&self) -> String {
        encode(&self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_drops_pair_without_equals() {
        let map = decode("a=1&b");
        assert_eq!(map, QueryMap::new().with("a", "1"));
    }

    #[test]
    fn decode_splits_on_first_equals_only() {
        let map = decode("type=post&ptr-time=a=b");
        assert_eq!(map.get("ptr-time"), Some("a=b"));
    }

    #[test]
    fn decode_keeps_empty_value_and_drops_empty_segment() {
        let map = decode("a=&&b=2");
        assert_eq!(map.get("a"), Some(""));
        assert_eq!(map.get("b"), Some("2"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn duplicate_keys_last_value_wins_in_first_position() {
        let map = decode("type=user&userhash=aaa&type=fav");
        assert_eq!(map.get("type"), Some("fav"));
        assert_eq!(encode(&map), "type=fav&userhash=aaa");
    }

    #[test]
    fn empty_input_yields_empty_map() {
        assert!(decode("").is_empty());
    }

    #[test]
    fn command_requires_type() {
        assert!(matches!(
            Command::parse("userhash=abc"),
            Err(QueryError::MissingType(_))
        ));

        let command = Command::parse("type=user&userhash=abc").expect("valid command");
        assert_eq!(command.kind(), "user");
        assert_eq!(command.get("userhash"), Some("abc"));
        assert_eq!(command.to_query_string(), "type=user&userhash=abc");
    }

    #[test]
    fn remove_returns_previous_value() {
        let mut map = decode("type=link&target=x");
        assert_eq!(map.remove("type"), Some("link".to_string()));
        assert_eq!(map.remove("type"), None);
        assert_eq!(encode(&map), "target=x");
    }
}
