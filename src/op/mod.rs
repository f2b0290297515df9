pub(crate) mod stateful;
pub(crate) mod stateless;
pub(crate) mod terminal;

/// 按声明的数量预分配缓冲区时的上限
const MAX_PREALLOC: usize = 1 << 16;

/// 根据声明的数量计算缓冲区初始容量，数量未知时不预分配。
pub(crate) fn capacity_hint(size: u64, known: bool) -> usize {
    if known { usize::try_from(size).unwrap_or(MAX_PREALLOC).min(MAX_PREALLOC) } else { 0 }
}
