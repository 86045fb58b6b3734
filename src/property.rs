//! 可观察属性 - 只读句柄 + 内部可写包装器
//!
//! `PropertyWrapper` 持有可写的值槽，`ReadOnlyProperty` 是共享同一值槽的只读句柄。
//! 句柄可以读取和订阅变更，但没有任何写入 API。
//!
//! 分发规则：
//! 1. 值相等的写入不会产生通知
//! 2. 监听器按注册顺序调用
//! 3. 监听器运行期间不持有值槽锁，可以读取属性、增删监听器或再次写入
//! 4. 通知过程中产生的新变更进入队列，由外层分发按发生顺序依次投递

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, trace};
use scopeguard::guard_on_unwind;

/// 监听器标识，在同一个值槽内唯一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener<T> = Arc<Mutex<Box<dyn FnMut(&T, &T) + Send>>>;

struct ListenerEntry<T> {
    id: ListenerId,
    listener: Listener<T>,
}

/// 值槽内部状态
struct Slot<T> {
    value: T,
    listeners: Vec<ListenerEntry<T>>,
    /// 等待投递的 (旧值, 新值)
    pending: VecDeque<(T, T)>,
    dispatching: bool,
    next_id: u64,
}

fn lock_slot<T>(slot: &Mutex<Slot<T>>) -> MutexGuard<'_, Slot<T>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 只读可观察属性
///
/// 克隆得到的句柄共享同一个值槽。句柄没有写入 API：
///
/// ```compile_fail
/// use class_attribute::{Class, ClassAttribute};
///
/// let handle = ClassAttribute::new(Class::Warrior).observe();
/// handle.set(Class::Mage);
/// ```
pub struct ReadOnlyProperty<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for ReadOnlyProperty<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Clone> ReadOnlyProperty<T> {
    /// 获取当前值
    pub fn get(&self) -> T {
        lock_slot(&self.slot).value.clone()
    }

    /// 注册变更监听器，之后的每次变更都会以 (旧值, 新值) 调用它
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&T, &T) + Send + 'static,
    {
        let mut slot = lock_slot(&self.slot);
        let id = ListenerId(slot.next_id);
        slot.next_id += 1;
        slot.listeners.push(ListenerEntry {
            id,
            listener: Arc::new(Mutex::new(Box::new(listener))),
        });
        trace!("listener {:?} added ({} total)", id, slot.listeners.len());
        id
    }

    /// 移除监听器，返回是否确实移除了
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut slot = lock_slot(&self.slot);
        let before = slot.listeners.len();
        slot.listeners.retain(|entry| entry.id != id);
        before != slot.listeners.len()
    }

    /// 当前监听器数量
    pub fn listener_count(&self) -> usize {
        lock_slot(&self.slot).listeners.len()
    }

    /// 两个句柄是否绑定同一个值槽
    pub fn ptr_eq(&self, other: &ReadOnlyProperty<T>) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for ReadOnlyProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyProperty")
            .field("value", &self.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// 可写属性包装器，只由组件所在的 crate 持有
pub struct PropertyWrapper<T> {
    property: ReadOnlyProperty<T>,
}

impl<T: Clone + PartialEq> PropertyWrapper<T> {
    pub fn new(value: T) -> Self {
        Self {
            property: ReadOnlyProperty {
                slot: Arc::new(Mutex::new(Slot {
                    value,
                    listeners: Vec::new(),
                    pending: VecDeque::new(),
                    dispatching: false,
                    next_id: 0,
                })),
            },
        }
    }

    pub fn get(&self) -> T {
        self.property.get()
    }

    /// 返回共享值槽的只读句柄
    pub fn read_only_property(&self) -> ReadOnlyProperty<T> {
        self.property.clone()
    }

    /// 写入新值并通知监听器
    ///
    /// 新值与当前值相等时不做任何事并返回 `false`。
    pub fn set(&self, value: T) -> bool {
        {
            let mut slot = lock_slot(&self.property.slot);
            if slot.value == value {
                return false;
            }
            let old = std::mem::replace(&mut slot.value, value.clone());
            slot.pending.push_back((old, value));

            // 外层分发会负责投递
            if slot.dispatching {
                debug!("nested property change queued");
                return true;
            }
            slot.dispatching = true;
        }

        self.dispatch();
        true
    }

    /// 依次投递队列中的变更，每次只在取快照时短暂持锁
    ///
    /// 单个监听器 panic 不影响其余监听器和后续变更。
    fn dispatch(&self) {
        // 正常结束时在持锁状态下清除标记；这里只负责展开路径
        let _reset = guard_on_unwind((), |_| {
            lock_slot(&self.property.slot).dispatching = false;
        });

        loop {
            let (change, listeners) = {
                let mut slot = lock_slot(&self.property.slot);
                match slot.pending.pop_front() {
                    Some(change) => {
                        let listeners: Vec<_> = slot
                            .listeners
                            .iter()
                            .map(|entry| (entry.id, Arc::clone(&entry.listener)))
                            .collect();
                        (change, listeners)
                    }
                    None => {
                        slot.dispatching = false;
                        return;
                    }
                }
            };

            let (old, new) = change;
            for (id, listener) in listeners {
                // 本次分发期间被移除的监听器不再调用
                let still_registered = lock_slot(&self.property.slot)
                    .listeners
                    .iter()
                    .any(|entry| entry.id == id);
                if !still_registered {
                    continue;
                }

                let mut callback = listener.lock().unwrap_or_else(PoisonError::into_inner);
                if panic::catch_unwind(AssertUnwindSafe(|| (callback.as_mut())(&old, &new))).is_err() {
                    error!("listener {:?} panicked while handling a property change", id);
                }
            }
        }
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for PropertyWrapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyWrapper").field(&self.property).finish()
    }
}
