//! 职业组件错误处理模块
//!
//! 处理职业赋予、职业变更以及实体查询过程中可能出现的错误。

use thiserror::Error;

/// 职业系统运行过程中可能出现的错误类型
#[derive(Debug, Error)]
pub enum GameError {
    /// 职业名称或编号不在封闭的职业枚举之内
    #[error("Invalid character class: {0}")]
    InvalidClass(String),

    /// 实体不存在（已被销毁或从未创建）
    ///
    /// 实体以 `hecs::Entity::to_bits()` 表示，包含代数。
    #[error("No such entity: {0:#x}")]
    NoSuchEntity(u64),

    /// 实体上没有职业组件
    #[error("Entity {0:#x} has no class attribute")]
    MissingClass(u64),

    /// 职业组件只能赋予一次
    #[error("Entity {0:#x} already has a class attribute")]
    ClassAlreadyAssigned(u64),

    /// 游戏状态无效
    #[error("Invalid game state")]
    InvalidGameState,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GameError {
    /// 构造无效职业错误
    pub fn invalid_class(value: impl Into<String>) -> Self {
        GameError::InvalidClass(value.into())
    }

    /// 是否为实体查找类错误（实体不存在或缺少组件）
    pub fn is_lookup_error(&self) -> bool {
        matches!(self, GameError::NoSuchEntity(_) | GameError::MissingClass(_))
    }
}

/// 处理游戏错误并转换为用户友好的消息
pub fn handle_error(error: &GameError) -> String {
    match error {
        GameError::InvalidClass(name) => format!("未知的职业: {}", name),
        GameError::NoSuchEntity(id) => format!("实体 {:#x} 不存在", id),
        GameError::MissingClass(id) => format!("实体 {:#x} 尚未选择职业", id),
        GameError::ClassAlreadyAssigned(id) => format!("实体 {:#x} 已经拥有职业", id),
        _ => error.to_string(),
    }
}
