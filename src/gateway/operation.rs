//! # 操作定义
//!
//! 每种后端操作对应一个枚举分支：自带 `type` 判别值、目标端点与请求字段，
//! 并负责按操作语义解释服务器返回的字符串。

use crate::query::QueryMap;

use super::GatewayError;
use super::response::ResponseAction;
use super::transport::Endpoint;

/// 后端操作。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    SaveProfile {
        name: String,
        body: String,
        /// 头像 data URI；为空表示不修改。
        pic: Option<String>,
    },
    ImportUser {
        file: String,
        pass: String,
    },
    ExportUser {
        pass: String,
    },
    NewPost {
        body: String,
        /// 已归一化图片的 data URI 列表。
        pics: Vec<String>,
        ptr_hash: Option<String>,
        ptr_time: Option<String>,
    },
    EditPost {
        body: String,
        create_time: String,
        ptr_hash: Option<String>,
        ptr_time: Option<String>,
        pic_hashes: Vec<String>,
    },
    DeletePost {
        create_time: String,
    },
    SwitchUser {
        userhash: String,
    },
    DeleteUser {
        userhash: String,
    },
    CreateUser,
    /// 收藏切换携带命令的完整参数集。
    ToggleFav {
        params: QueryMap,
    },
    CheckUserHasContent {
        userhash: String,
    },
    CheckUserExists {
        userhash: String,
    },
}

/// 全部已知操作名。
pub const OPERATION_NAMES: [&str; 12] = [
    "save-profile",
    "import-user",
    "export-user",
    "new-post",
    "edit-post",
    "delete-post",
    "switch-user",
    "delete-user",
    "create-user",
    "toggle-fav",
    "check-user-has-content",
    "check-user-exists",
];

impl Operation {
    /// 请求体中的 `type` 判别值。
    pub fn name(&self) -> &'static str {
        match self {
            Self::SaveProfile { .. } => "save-profile",
            Self::ImportUser { .. } => "import-user",
            Self::ExportUser { .. } => "export-user",
            Self::NewPost { .. } => "new-post",
            Self::EditPost { .. } => "edit-post",
            Self::DeletePost { .. } => "delete-post",
            Self::SwitchUser { .. } => "switch-user",
            Self::DeleteUser { .. } => "delete-user",
            Self::CreateUser => "create-user",
            Self::ToggleFav { .. } => "toggle-fav",
            Self::CheckUserHasContent { .. } => "check-user-has-content",
            Self::CheckUserExists { .. } => "check-user-exists",
        }
    }

    /// 只读的存在性检查走短别名端点，其余走通用端点。
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::CheckUserHasContent { .. } | Self::CheckUserExists { .. } => Endpoint::Short,
            _ => Endpoint::General,
        }
    }

    /// 构造收藏切换操作，要求参数中带 `userhash`。
    pub fn toggle_fav(params: &QueryMap) -> Result<Self, GatewayError> {
        required(params, "toggle-fav", "userhash")?;
        Ok(Self::ToggleFav {
            params: params.clone(),
        })
    }

    /// 生成请求体，`type` 总在第一位。
    pub fn to_payload(&self) -> QueryMap {
        let payload = QueryMap::new().with("type", self.name());
        match self {
            Self::SaveProfile { name, body, pic } => payload
                .with("name", name.as_str())
                .with("body", body.as_str())
                .with("pic", pic.as_deref().unwrap_or_default()),
            Self::ImportUser { file, pass } => {
                payload.with("file", file.as_str()).with("pass", pass.as_str())
            }
            Self::ExportUser { pass } => payload.with("pass", pass.as_str()),
            Self::NewPost {
                body,
                pics,
                ptr_hash,
                ptr_time,
            } => payload
                .with("body", body.as_str())
                .with("pics", string_list(pics))
                .with("ptrhash", ptr_hash.as_deref().unwrap_or_default())
                .with("ptrtime", ptr_time.as_deref().unwrap_or_default()),
            Self::EditPost {
                body,
                create_time,
                ptr_hash,
                ptr_time,
                pic_hashes,
            } => payload
                .with("body", body.as_str())
                .with("create-time", create_time.as_str())
                .with("ptr-hash", ptr_hash.as_deref().unwrap_or_default())
                .with("ptr-time", ptr_time.as_deref().unwrap_or_default())
                .with("pic-hashes", string_list(pic_hashes)),
            Self::DeletePost { create_time } => payload.with("create-time", create_time.as_str()),
            Self::SwitchUser { userhash }
            | Self::DeleteUser { userhash }
            | Self::CheckUserHasContent { userhash }
            | Self::CheckUserExists { userhash } => payload.with("userhash", userhash.as_str()),
            Self::CreateUser => payload,
            Self::ToggleFav { params } => {
                let mut payload = payload;
                for (key, value) in params.iter().filter(|(key, _)| *key != "type") {
                    payload.insert(key, value);
                }
                payload
            }
        }
    }

    /// 从操作名与字段解析（用于字符串形式的调用入口）。
    pub fn from_payload(name: &str, payload: &QueryMap) -> Result<Self, GatewayError> {
        let op = match name {
            "save-profile" => Self::SaveProfile {
                name: optional(payload, "name").unwrap_or_default(),
                body: optional(payload, "body").unwrap_or_default(),
                pic: optional(payload, "pic").filter(|pic| !pic.is_empty()),
            },
            "import-user" => Self::ImportUser {
                file: required(payload, "import-user", "file")?,
                pass: optional(payload, "pass").unwrap_or_default(),
            },
            "export-user" => Self::ExportUser {
                pass: optional(payload, "pass").unwrap_or_default(),
            },
            "new-post" => Self::NewPost {
                body: optional(payload, "body").unwrap_or_default(),
                pics: parse_string_list(payload.get("pics").unwrap_or_default()),
                ptr_hash: optional(payload, "ptrhash").filter(|v| !v.is_empty()),
                ptr_time: optional(payload, "ptrtime").filter(|v| !v.is_empty()),
            },
            "edit-post" => Self::EditPost {
                body: optional(payload, "body").unwrap_or_default(),
                create_time: required(payload, "edit-post", "create-time")?,
                ptr_hash: optional(payload, "ptr-hash").filter(|v| !v.is_empty()),
                ptr_time: optional(payload, "ptr-time").filter(|v| !v.is_empty()),
                pic_hashes: parse_string_list(payload.get("pic-hashes").unwrap_or_default()),
            },
            "delete-post" => Self::DeletePost {
                create_time: required(payload, "delete-post", "create-time")?,
            },
            "switch-user" => Self::SwitchUser {
                userhash: required(payload, "switch-user", "userhash")?,
            },
            "delete-user" => Self::DeleteUser {
                userhash: required(payload, "delete-user", "userhash")?,
            },
            "create-user" => Self::CreateUser,
            "toggle-fav" => Self::toggle_fav(payload)?,
            "check-user-has-content" => Self::CheckUserHasContent {
                userhash: required(payload, "check-user-has-content", "userhash")?,
            },
            "check-user-exists" => Self::CheckUserExists {
                userhash: required(payload, "check-user-exists", "userhash")?,
            },
            other => return Err(GatewayError::UnknownOperation(other.to_string())),
        };
        Ok(op)
    }

    /// 按操作语义解释服务器返回串。
    ///
    /// | 操作 | 空串 | 非空 |
    /// |------|------|------|
    /// | export-user / check-user-exists | 忽略 | 跳转到返回地址 |
    /// | check-user-has-content | 忽略 | 作为确认提示 |
    /// | 其他 | 整页刷新 | 显示消息 |
    pub fn response_action(&self, response: &str) -> ResponseAction {
        let response = response.trim();
        match self {
            Self::ExportUser { .. } | Self::CheckUserExists { .. } => {
                if response.is_empty() {
                    ResponseAction::Ignore
                } else {
                    ResponseAction::Navigate(response.to_string())
                }
            }
            Self::CheckUserHasContent { .. } => {
                if response.is_empty() {
                    ResponseAction::Ignore
                } else {
                    ResponseAction::Confirm(response.to_string())
                }
            }
            _ => {
                if response.is_empty() {
                    ResponseAction::Reload
                } else {
                    ResponseAction::ShowMessage(response.to_string())
                }
            }
        }
    }

    /// 确认提示通过后要执行的后续操作。
    pub fn follow_up(&self) -> Option<Operation> {
        match self {
            Self::CheckUserHasContent { userhash } => Some(Self::DeleteUser {
                userhash: userhash.clone(),
            }),
            _ => None,
        }
    }
}

fn optional(payload: &QueryMap, key: &str) -> Option<String> {
    payload.get(key).map(str::to_string)
}

fn required(
    payload: &QueryMap,
    operation: &'static str,
    field: &'static str,
) -> Result<String, GatewayError> {
    payload
        .get(field)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(GatewayError::MissingField { operation, field })
}

/// 多值字段以 JSON 字符串数组传输。
fn string_list(values: &[String]) -> String {
    serde_json::Value::from(values.to_vec()).to_string()
}

fn parse_string_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_else(|_| vec![raw.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::decode;

    #[test]
    fn new_post_payload_carries_pics_as_json_array() {
        let op = Operation::NewPost {
            body: "hello".into(),
            pics: vec!["data:image/jpeg;base64,AAAA".into(), "data:image/jpeg;base64,BBBB".into()],
            ptr_hash: Some("abc".into()),
            ptr_time: None,
        };

        let payload = op.to_payload();
        assert_eq!(payload.get("type"), Some("new-post"));
        assert_eq!(
            payload.get("pics"),
            Some(r#"["data:image/jpeg;base64,AAAA","data:image/jpeg;base64,BBBB"]"#)
        );
        assert_eq!(payload.get("ptrhash"), Some("abc"));
        assert_eq!(payload.get("ptrtime"), Some(""));

        let parsed = Operation::from_payload("new-post", &payload).expect("parse back");
        assert_eq!(parsed, op);
    }

    #[test]
    fn toggle_fav_keeps_full_parameter_set() {
        let params = decode("type=toggle-fav&userhash=u1&ptr-time=99&extra=x");
        let op = Operation::toggle_fav(&params).expect("valid toggle");

        let payload = op.to_payload();
        assert_eq!(
            crate::query::encode(&payload),
            "type=toggle-fav&userhash=u1&ptr-time=99&extra=x"
        );
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let err = Operation::toggle_fav(&decode("type=toggle-fav")).expect_err("needs userhash");
        assert!(matches!(
            err,
            GatewayError::MissingField { operation: "toggle-fav", field: "userhash" }
        ));

        let err = Operation::from_payload("delete-post", &QueryMap::new()).expect_err("needs create-time");
        assert!(matches!(err, GatewayError::MissingField { field: "create-time", .. }));
    }

    #[test]
    fn unknown_operation_name_is_rejected() {
        assert!(matches!(
            Operation::from_payload("drop-tables", &QueryMap::new()),
            Err(GatewayError::UnknownOperation(_))
        ));
    }

    #[test]
    fn every_known_name_round_trips_through_payload() {
        let payload = decode("userhash=u&create-time=1&file=f&pass=p");
        for name in OPERATION_NAMES {
            let op = Operation::from_payload(name, &payload).expect("known operation");
            assert_eq!(op.name(), name);
            assert_eq!(op.to_payload().get("type"), Some(name));
        }
    }

    #[test]
    fn response_interpretation_per_operation() {
        let export = Operation::ExportUser { pass: "p".into() };
        assert_eq!(export.response_action(""), ResponseAction::Ignore);
        assert_eq!(
            export.response_action("/export/user.zip"),
            ResponseAction::Navigate("/export/user.zip".into())
        );

        let check = Operation::CheckUserHasContent { userhash: "u".into() };
        assert_eq!(check.response_action("  "), ResponseAction::Ignore);
        assert_eq!(
            check.response_action("Delete anyway?"),
            ResponseAction::Confirm("Delete anyway?".into())
        );
        assert_eq!(check.follow_up(), Some(Operation::DeleteUser { userhash: "u".into() }));

        let delete = Operation::DeletePost { create_time: "1".into() };
        assert_eq!(delete.response_action(""), ResponseAction::Reload);
        assert_eq!(
            delete.response_action("Post not found"),
            ResponseAction::ShowMessage("Post not found".into())
        );
        assert_eq!(delete.follow_up(), None);
    }

    #[test]
    fn existence_checks_use_short_endpoint() {
        assert_eq!(Operation::CheckUserExists { userhash: "u".into() }.endpoint(), Endpoint::Short);
        assert_eq!(Operation::CreateUser.endpoint(), Endpoint::General);
    }

    #[test]
    fn non_json_pic_list_is_kept_as_single_entry() {
        assert_eq!(parse_string_list("abc"), vec!["abc".to_string()]);
        assert!(parse_string_list("").is_empty());
    }
}
