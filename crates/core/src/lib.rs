//! # Filing Core
//!
//! Core domain logic for the filing (备案) system.
//!
//! This crate contains pure data operations shared by the client, the CLI and the development
//! backend:
//! - Remark parsing and composition ([`remark`])
//! - The user-template status model and its transition rules ([`status`])
//! - Wire records of the REST API ([`records`])
//! - The login session context and its persistence ([`session`])
//! - The navigation guard and page table ([`navigation`])
//! - Startup configuration ([`config`])
//!
//! **No transport concerns**: HTTP clients and servers belong in `filing-client` and
//! `filing-api-rest`.

pub mod config;
pub mod constants;
pub mod error;
pub mod navigation;
pub mod records;
pub mod remark;
pub mod session;
pub mod status;

pub use config::FilingConfig;
pub use error::{FilingError, FilingResult};
pub use navigation::{Navigation, NavigationGuard, PolicyOutcome};
pub use remark::{
    compose_remark, extract_status_change_info, extract_user_remark, format_remark_for_display,
    has_user_remark, split_remark, Actor, DisplayMode, RemarkParts, REMARK_DELIMITER,
};
pub use session::{FileSessionStore, MemorySessionStore, Role, Session, SessionContext, SessionStore};
pub use status::{
    is_transition_allowed, status_description, status_options, StatusOption, TemplateStatus,
};
