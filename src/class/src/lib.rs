// src/class/src/lib.rs

use std::fmt;
use std::str::FromStr;

use error::GameError;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// 英雄职业枚举
///
/// 职业集合是封闭的：所有合法取值都在这里声明，组件只保存其中之一。
#[derive(
    Default, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
pub enum Class {
    #[default]
    Warrior, // 战士

    Mage,     // 法师
    Rogue,    // 盗贼
    Huntress, // 女猎手
}

impl Class {
    /// 按声明顺序遍历所有职业
    pub fn all() -> impl Iterator<Item = Class> {
        Class::iter()
    }

    /// 稳定的英文标识，用于日志和按名称查找
    pub fn name(&self) -> &'static str {
        match self {
            Class::Warrior => "Warrior",
            Class::Mage => "Mage",
            Class::Rogue => "Rogue",
            Class::Huntress => "Huntress",
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Class::Warrior => "战士",
                Class::Mage => "法师",
                Class::Rogue => "盗贼",
                Class::Huntress => "女猎手",
            }
        )
    }
}

impl FromStr for Class {
    type Err = GameError;

    /// 按英文名称解析（忽略大小写和首尾空白）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Class::all()
            .find(|class| class.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GameError::invalid_class(s))
    }
}

impl TryFrom<u8> for Class {
    type Error = GameError;

    /// 按声明顺序的编号解析
    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Class::all()
            .nth(index as usize)
            .ok_or_else(|| GameError::invalid_class(format!("#{}", index)))
    }
}
