//! 职业组件 - 保存实体的职业并以只读可观察属性发布

use class::Class;

use crate::property::{PropertyWrapper, ReadOnlyProperty};

/// Character class of one entity.
///
/// The value is fixed when the component is built. Outside this crate it can
/// only be read or observed; the world layer is the sole writer.
///
/// ```compile_fail
/// use class_attribute::{Class, ClassAttribute};
///
/// let attribute = ClassAttribute::new(Class::Warrior);
/// attribute.set_value(Class::Mage);
/// ```
#[derive(Debug)]
pub struct ClassAttribute {
    class: PropertyWrapper<Class>,
}

impl ClassAttribute {
    pub fn new(class: Class) -> Self {
        Self {
            class: PropertyWrapper::new(class),
        }
    }

    /// 当前职业
    pub fn value(&self) -> Class {
        self.class.get()
    }

    /// 职业属性的只读句柄，之后的职业变更都会通知到它的监听器
    pub fn observe(&self) -> ReadOnlyProperty<Class> {
        self.class.read_only_property()
    }

    /// Collaborator path used by `ECSWorld::change_class`.
    pub(crate) fn set_value(&self, class: Class) -> bool {
        self.class.set(class)
    }

    /// 两个组件是否是同一个实例（共享值槽）
    pub fn same_instance(&self, other: &ClassAttribute) -> bool {
        self.observe().ptr_eq(&other.observe())
    }
}

impl From<Class> for ClassAttribute {
    fn from(class: Class) -> Self {
        ClassAttribute::new(class)
    }
}

/// 值相等：比较当前职业，而不是实例身份
impl PartialEq for ClassAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl Eq for ClassAttribute {}
