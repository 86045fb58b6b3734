//! 事件总线系统，用于解耦模块间通信
//!
//! 职业组件的属性监听只面向单个实体；需要关注所有实体职业变化的系统
//! （日志、成就、UI 等）在这里注册处理器。事件发布时立即按注册顺序分发，
//! 总线只保留有限长度的历史，不积压待处理队列。
//!
//! 事件中的 `entity` 是 `hecs::Entity::to_bits()`，包含代数，
//! 回收后重用同一槽位的实体不会与旧实体混淆。

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use class::Class;

/// 职业生命周期事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// 实体获得职业
    ClassAssigned { entity: u64, class: Class },
    /// 实体职业变更
    ClassChanged {
        entity: u64,
        old_class: Class,
        new_class: Class,
    },
    /// 实体被销毁
    EntityDespawned { entity: u64 },
}

impl GameEvent {
    /// 事件类型名称
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::ClassAssigned { .. } => "ClassAssigned",
            GameEvent::ClassChanged { .. } => "ClassChanged",
            GameEvent::EntityDespawned { .. } => "EntityDespawned",
        }
    }

    /// 事件涉及的实体
    pub fn entity(&self) -> u64 {
        match self {
            GameEvent::ClassAssigned { entity, .. }
            | GameEvent::ClassChanged { entity, .. }
            | GameEvent::EntityDespawned { entity } => *entity,
        }
    }
}

/// 事件处理器 trait
pub trait EventHandler: Send + Sync {
    /// 处理事件
    fn handle(&mut self, event: &GameEvent);

    /// 事件处理器的名称（用于调试）
    fn name(&self) -> &str;
}

/// 事件总线 - 立即分发 + 有界历史
pub struct EventBus {
    handlers: Vec<Box<dyn EventHandler>>,
    history: VecDeque<GameEvent>,
    max_history: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_history_size(100)
    }

    /// 创建一个指定历史记录大小的事件总线
    pub fn with_history_size(max_history: usize) -> Self {
        Self {
            handlers: Vec::new(),
            history: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// 发布事件：记录历史并按注册顺序分发给处理器
    pub fn publish(&mut self, event: GameEvent) {
        for handler in &mut self.handlers {
            handler.handle(&event);
        }
        self.add_to_history(event);
    }

    /// 注册事件处理器
    pub fn subscribe(&mut self, handler: Box<dyn EventHandler>) {
        log::debug!("event handler {} subscribed", handler.name());
        self.handlers.push(handler);
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    fn add_to_history(&mut self, event: GameEvent) {
        if self.max_history == 0 {
            return;
        }
        if self.history.len() >= self.max_history {
            self.history.pop_front();
        }
        self.history.push_back(event);
    }

    /// 历史记录，从旧到新
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &GameEvent> + ExactSizeIterator {
        self.history.iter()
    }

    /// 清空历史记录
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

// ========== 内置事件处理器 ==========

/// 日志记录器 - 把职业事件写成消息（保留最近 `capacity` 条），同时写入 `log`
pub struct LoggingHandler {
    messages: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl LoggingHandler {
    pub fn new(messages: Arc<Mutex<VecDeque<String>>>, capacity: usize) -> Self {
        Self { messages, capacity }
    }
}

impl EventHandler for LoggingHandler {
    fn handle(&mut self, event: &GameEvent) {
        let message = match event {
            GameEvent::ClassAssigned { class, .. } => format!("选择了职业：{}", class),
            GameEvent::ClassChanged {
                old_class,
                new_class,
                ..
            } => format!("职业从{}转为{}", old_class, new_class),
            GameEvent::EntityDespawned { .. } => return, // 其他事件不记录
        };

        log::info!("{}", message);
        if self.capacity == 0 {
            return;
        }
        if let Ok(mut logs) = self.messages.lock() {
            while logs.len() >= self.capacity {
                logs.pop_front();
            }
            logs.push_back(message);
        }
    }

    fn name(&self) -> &str {
        "LoggingHandler"
    }
}
