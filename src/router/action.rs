//! 命令 `type` → 类型化动作。

use crate::gateway::{Endpoint, GatewayError, Operation};
use crate::query::{Command, encode};
use crate::session::{PostRef, ReplyPointer};

use super::host::Dialog;

/// 直接跳转的命令类型。收藏列表走短别名端点。
const NAVIGATION_TYPES: [(&str, Endpoint); 7] = [
    ("user", Endpoint::General),
    ("post", Endpoint::General),
    ("tag", Endpoint::General),
    ("search-results", Endpoint::General),
    ("fav", Endpoint::Short),
    ("fav-users", Endpoint::Short),
    ("fav-posts", Endpoint::Short),
];

/// 由命令参数直接构成请求的操作类型。
const INVOKE_TYPES: [&str; 6] = [
    "switch-user",
    "delete-user",
    "create-user",
    "delete-post",
    "check-user-has-content",
    "check-user-exists",
];

/// 一条命令对应的唯一动作。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Dialog(Dialog),
    Invoke(Operation),
    Navigate(Endpoint),
    Unknown,
}

impl Action {
    /// 解析命令。未知类型得到 `Unknown`；已知类型缺少必要字段时报错。
    pub fn from_command(command: &Command) -> Result<Self, GatewayError> {
        let kind = command.kind();

        if let Some((_, endpoint)) = NAVIGATION_TYPES.iter().find(|(name, _)| *name == kind) {
            return Ok(Self::Navigate(*endpoint));
        }
        if INVOKE_TYPES.contains(&kind) {
            return Operation::from_payload(kind, command.params()).map(Self::Invoke);
        }

        let action = match kind {
            "toggle-fav" => Self::Invoke(Operation::toggle_fav(command.params())?),
            "new-post" => Self::Dialog(Dialog::NewPost(ReplyPointer::from_params(command.params()))),
            "edit-post" => {
                let post = PostRef::from_params(command.params()).ok_or(
                    GatewayError::MissingField {
                        operation: "edit-post",
                        field: "create-time",
                    },
                )?;
                Self::Dialog(Dialog::EditPost(post))
            }
            "profile" => Self::Dialog(Dialog::Profile),
            "import-user" => Self::Dialog(Dialog::ImportUser),
            "export-user" => Self::Dialog(Dialog::ExportUser),
            "search" => Self::Dialog(Dialog::Search),
            "link" => {
                let mut params = command.params().clone();
                params.remove("type");
                Self::Dialog(Dialog::Link {
                    query: encode(&params),
                })
            }
            _ => Self::Unknown,
        };
        Ok(action)
    }
}
