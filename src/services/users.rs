//! 用户管理页面

use crate::errors::AppError;
use crate::models::{
    fetch_errors, mutation_errors, notices, User, UserForm, UserRole, DELETE_USER_CONFIRMATION,
    MISSING_FIELDS_MESSAGE,
};
use crate::sync::{fetcher, mutate_then_refresh, PollingSource, ViewState};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use validator::Validate;

use super::ViewContext;

/// 表单提交失败时展示的文案：优先使用后端返回的 `detail`
pub fn user_form_error(err: &AppError) -> String {
    match err {
        AppError::Status {
            detail: Some(detail),
            ..
        } => detail.clone(),
        AppError::NotFound(detail) => detail.clone(),
        _ => mutation_errors::UNEXPECTED.to_string(),
    }
}

/// 用户列表：挂载时拉取一次，支持按角色过滤与增删改
pub struct UsersController {
    ctx: ViewContext,
    source: Arc<PollingSource<User>>,
    /// `None` 即 "Tous"
    role_filter: Mutex<Option<UserRole>>,
}

impl UsersController {
    pub fn new(ctx: ViewContext) -> Self {
        let api = ctx.api.clone();
        let source = PollingSource::new(
            "users",
            fetch_errors::USERS,
            None,
            fetcher(move || {
                let api = api.clone();
                async move { api.list_users().await }
            }),
        );
        Self {
            ctx,
            source,
            role_filter: Mutex::new(None),
        }
    }

    pub async fn load(&self) -> Result<(), AppError> {
        self.source.refresh().await
    }

    pub fn source(&self) -> &Arc<PollingSource<User>> {
        &self.source
    }

    pub fn set_role_filter(&self, role: Option<UserRole>) {
        *self.role_filter.lock().unwrap_or_else(|e| e.into_inner()) = role;
    }

    pub fn role_filter(&self) -> Option<UserRole> {
        *self.role_filter.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> ViewState<User> {
        let role = self.role_filter();
        self.source.snapshot().project(|users| {
            users
                .iter()
                .filter(|user| role.map_or(true, |r| user.role == r))
                .cloned()
                .collect()
        })
    }

    /// 新增用户
    pub async fn create(&self, form: UserForm) -> Result<User, AppError> {
        self.submit(None, form).await
    }

    /// 编辑用户
    pub async fn update(&self, id: Uuid, form: UserForm) -> Result<User, AppError> {
        self.submit(Some(id), form).await
    }

    async fn submit(&self, id: Option<Uuid>, form: UserForm) -> Result<User, AppError> {
        let form = form.normalized();
        if let Err(e) = form.validate() {
            tracing::debug!(error = %e, "用户表单校验失败");
            self.ctx.notifier.notify(MISSING_FIELDS_MESSAGE);
            return Err(AppError::from(e));
        }

        let result = match id {
            Some(id) => self.ctx.api.update_user(id, &form).await,
            None => self.ctx.api.create_user(&form).await,
        };
        let user = match result {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(user_id = ?id, error = %e, "用户保存失败");
                self.ctx.notifier.notify(&user_form_error(&e));
                return Err(e);
            }
        };

        let notice = if id.is_some() {
            notices::USER_UPDATED
        } else {
            notices::USER_CREATED
        };
        self.ctx.notifier.notify(notice);
        tracing::info!(user_id = %user.id, "用户已保存");
        self.ctx.activity.user_action(
            None,
            format!(
                "Utilisateur \"{}\" {}.",
                user.name,
                if id.is_some() { "modifié" } else { "ajouté" }
            ),
        );

        if let Err(e) = self.source.refresh().await {
            tracing::debug!(error = %e, "保存用户后刷新失败");
        }
        Ok(user)
    }

    /// 删除用户，需要先确认；返回是否实际执行了删除
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        if !self.ctx.confirmer.confirm(DELETE_USER_CONFIRMATION) {
            tracing::debug!(user_id = %id, "用户取消删除");
            return Ok(false);
        }

        let name = self
            .source
            .snapshot()
            .items
            .into_iter()
            .find(|u| u.id == id)
            .map(|u| u.name);

        mutate_then_refresh(
            self.ctx.api.delete_user(id),
            &self.source,
            self.ctx.notifier.as_ref(),
            mutation_errors::DELETE_USER,
        )
        .await?;

        tracing::info!(user_id = %id, "用户已删除");
        self.ctx.activity.user_action(
            None,
            format!(
                "Utilisateur \"{}\" supprimé.",
                name.unwrap_or_else(|| id.to_string())
            ),
        );
        Ok(true)
    }
}
