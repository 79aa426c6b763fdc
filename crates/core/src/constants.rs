//! Constants used throughout the filing crates.
//!
//! Wire-level values (envelope codes, messages) live here so the client and the development
//! backend agree on them.

/// Application name, used as the document title suffix.
pub const APP_TITLE: &str = "大模型备案信息填报系统";

/// Default base URL of the filing REST API.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8822";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default listen address of the development REST backend.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8822";

/// Directory under `$HOME` holding client state.
pub const CONFIG_DIR_NAME: &str = ".config/filing";

/// Filename for the persisted session.
pub const SESSION_FILENAME: &str = "session.json";

/// Envelope code for a successful call.
pub const SUCCESS_CODE: i32 = 200;

/// Envelope code for a missing or expired login.
pub const UNAUTHORIZED_CODE: i32 = 401;

/// Envelope code for an authenticated caller lacking permission.
pub const FORBIDDEN_CODE: i32 = 403;

/// Message used when a failed envelope carries none.
pub const DEFAULT_ERROR_MESSAGE: &str = "请求失败";

/// Message returned by a local logout.
pub const LOGOUT_MESSAGE: &str = "登出成功";

/// Default filename for downloaded filing documents.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "downloaded-file.docx";
