//! In-memory store behind the development backend.
//!
//! Accounts, bearer tokens, templates and applications live in one [`Store`] guarded by a
//! `tokio::sync::RwLock`. Nothing is persisted; a restart brings back the seed data.

use chrono::{Local, NaiveDateTime};
use filing_core::records::{TemplateRegistry, UserAccount, UserTemplate};
use filing_core::{status_description, Role};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
pub struct Account {
    pub id: String,
    pub login_name: String,
    pub password: String,
    pub user_name: String,
    pub role: Role,
    pub create_time: NaiveDateTime,
}

impl Account {
    pub fn new(login_name: &str, password: &str, user_name: &str, role: Role) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            login_name: login_name.to_string(),
            password: password.to_string(),
            user_name: user_name.to_string(),
            role,
            create_time: now(),
        }
    }

    pub fn to_record(&self) -> UserAccount {
        UserAccount {
            id: self.id.clone(),
            login_name: Some(self.login_name.clone()),
            user_name: Some(self.user_name.clone()),
            role: Some(self.role.code()),
            status: Some(1),
            create_time: Some(self.create_time),
            last_login_time: None,
        }
    }
}

/// The authenticated account behind a request.
#[derive(Clone, Debug)]
pub struct Caller {
    pub id: String,
    pub login_name: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub accounts: Vec<Account>,
    /// Bearer token -> account id.
    pub tokens: HashMap<String, String>,
    pub templates: Vec<TemplateRegistry>,
    pub user_templates: Vec<UserTemplate>,
}

impl Store {
    /// Store with an administrator (`admin`/`admin123`), a regular user (`user`/`user123`) and two
    /// templates.
    pub fn seeded() -> Self {
        let created = now();
        let template = |code: &str, name: &str, kind: &str, description: &str| TemplateRegistry {
            id: uuid::Uuid::new_v4().to_string(),
            template_code: Some(code.to_string()),
            template_name: Some(name.to_string()),
            template_description: Some(description.to_string()),
            template_type: Some(kind.to_string()),
            template_content: Some(r#"{"fields":[]}"#.to_string()),
            create_time: Some(created),
            update_time: Some(created),
        };

        Self {
            accounts: vec![
                Account::new("admin", "admin123", "管理员", Role::Admin),
                Account::new("user", "user123", "普通用户", Role::User),
            ],
            tokens: HashMap::new(),
            templates: vec![
                template("LLM-001", "生成式大模型备案表", "语言模型", "大语言模型上线备案信息"),
                template("IMG-001", "图像生成模型备案表", "图像模型", "图像生成服务备案信息"),
            ],
            user_templates: Vec::new(),
        }
    }

    pub fn account_by_login(&self, login_name: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.login_name == login_name)
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn caller(&self, token: &str) -> Option<Caller> {
        let account = self.tokens.get(token).and_then(|id| self.account(id))?;
        Some(Caller {
            id: account.id.clone(),
            login_name: account.login_name.clone(),
            role: account.role,
        })
    }

    pub fn issue_token(&mut self, account_id: &str) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), account_id.to_string());
        token
    }

    pub fn template(&self, id: &str) -> Option<&TemplateRegistry> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn user_template_mut(&mut self, id: &str) -> Option<&mut UserTemplate> {
        self.user_templates.iter_mut().find(|ut| ut.id == id)
    }

    /// An application joined with its template and owner names, as listings return it.
    pub fn decorate(&self, item: &UserTemplate) -> UserTemplate {
        let mut item = item.clone();
        if let Some(template) = item.template_id.as_deref().and_then(|id| self.template(id)) {
            item.template_code = template.template_code.clone();
            item.template_name = template.template_name.clone();
            item.template_description = template.template_description.clone();
            item.template_type = template.template_type.clone();
        }
        if let Some(owner) = item.user_id.as_deref().and_then(|id| self.account(id)) {
            item.user_name = Some(owner.user_name.clone());
        }
        item.status_desc = Some(status_description(item.status).to_string());
        item
    }
}

/// Shared handler state.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    pub fn seeded() -> Self {
        Self::new(Store::seeded())
    }
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
