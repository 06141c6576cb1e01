//! AI 助手会话

use crate::api::MaintenanceApi;
use crate::errors::AppError;
use crate::models::{AssistantRequest, ChatMessage, MachineRef, ASSISTANT_FAILURE_REPLY};
use crate::sync::ViewLifetime;
use std::sync::{Arc, Mutex, MutexGuard};

/// 会话开场白
pub fn greeting(machine: Option<&MachineRef>) -> String {
    match machine {
        Some(machine) => format!(
            "Bonjour ! Je suis l'assistant IA pour la machine **{}**. Comment puis-je vous aider aujourd'hui ?",
            machine.name
        ),
        None => "Bonjour ! Je suis votre assistant IA. Sélectionnez une machine pour obtenir un contexte plus précis.".to_string(),
    }
}

struct SessionInner {
    machine: Option<MachineRef>,
    messages: Vec<ChatMessage>,
    /// 每次切换机器加一，用于丢弃过期回复
    epoch: u64,
    pending: usize,
}

/// 与所选机器绑定的对话
///
/// 切换机器会重置对话；切换之后或会话关闭之后才到达的回复被丢弃。
pub struct AssistantSession {
    api: Arc<dyn MaintenanceApi>,
    lifetime: ViewLifetime,
    inner: Mutex<SessionInner>,
}

impl AssistantSession {
    pub fn new(api: Arc<dyn MaintenanceApi>) -> Self {
        Self {
            api,
            lifetime: ViewLifetime::new(),
            inner: Mutex::new(SessionInner {
                machine: None,
                messages: vec![ChatMessage::ai(greeting(None))],
                epoch: 0,
                pending: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 切换上下文机器并重置对话
    pub fn select_machine(&self, machine: Option<MachineRef>) {
        let mut inner = self.lock();
        inner.epoch += 1;
        inner.messages = vec![ChatMessage::ai(greeting(machine.as_ref()))];
        inner.pending = 0;
        tracing::debug!(machine = ?machine.as_ref().map(|m| &m.name), epoch = inner.epoch, "助手会话重置");
        inner.machine = machine;
    }

    pub fn machine(&self) -> Option<MachineRef> {
        self.lock().machine.clone()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages.clone()
    }

    /// 是否有等待中的回复
    pub fn is_pending(&self) -> bool {
        self.lock().pending > 0
    }

    /// 发送问题
    ///
    /// 空白输入直接忽略并返回 `Ok(None)`。请求失败时追加固定的致歉回复。
    /// 回复到达前会话被关闭或切换了机器时返回 `Cancelled`，对话不变。
    pub async fn send(&self, text: &str) -> Result<Option<ChatMessage>, AppError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let (epoch, request) = {
            let mut inner = self.lock();
            inner.messages.push(ChatMessage::user(text));
            inner.pending += 1;
            let request = AssistantRequest {
                question: text.to_string(),
                machine_id: inner.machine.as_ref().map(|m| m.id),
            };
            (inner.epoch, request)
        };

        let result = self.lifetime.run(self.api.ask_assistant(&request)).await;

        let mut inner = self.lock();
        if result.is_err() || inner.epoch != epoch {
            tracing::debug!(epoch, current = inner.epoch, "会话已结束或已切换机器，丢弃回复");
            return Err(AppError::Cancelled);
        }
        inner.pending = inner.pending.saturating_sub(1);

        let text = match result {
            Ok(Ok(reply)) => reply.response,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "与 AI 助手通信失败");
                ASSISTANT_FAILURE_REPLY.to_string()
            }
            Err(_) => return Err(AppError::Cancelled),
        };
        let message = ChatMessage::ai(text);
        inner.messages.push(message.clone());
        Ok(Some(message))
    }

    /// 关闭会话，进行中的请求被丢弃
    pub fn close(&self) {
        self.lifetime.cancel();
    }
}

impl Drop for AssistantSession {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}
