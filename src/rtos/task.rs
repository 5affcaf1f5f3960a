use super::scheduler::Scheduler;

/// Identity of a task in the scheduler registry.
///
/// Chosen by the owner of the task; the registry holds at most one task per id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskId(pub u8);

/// Task body. Runs to completion in the dispatch loop with the scheduler
/// (so it may add and remove tasks), the application context and the task's
/// opaque parameter.
pub type TaskFunction<C> = fn(&Scheduler<C>, &mut C, usize);

/// Descriptor of one schedulable unit of work
pub struct Task<C> {
    pub id: TaskId,
    pub function: TaskFunction<C>,
    pub param: usize,
    /// Ticks until the first run
    pub expire: u16,
    /// Ticks between runs after the first; 0 runs once and deregisters
    pub period: u16,
}

impl<C> Task<C> {
    /// Task that runs every `period` ticks, first after one full period
    pub const fn periodic(id: TaskId, function: TaskFunction<C>, period: u16) -> Self {
        Self {
            id,
            function,
            param: 0,
            expire: period,
            period,
        }
    }

    /// Task that runs once after `delay` ticks
    pub const fn once(id: TaskId, function: TaskFunction<C>, delay: u16) -> Self {
        Self {
            id,
            function,
            param: 0,
            expire: delay,
            period: 0,
        }
    }

    pub fn with_param(mut self, param: usize) -> Self {
        self.param = param;
        self
    }

    pub fn with_expire(mut self, expire: u16) -> Self {
        self.expire = expire;
        self
    }

    pub fn is_one_shot(&self) -> bool {
        self.period == 0
    }
}

// Manual impls: a derive would demand `C: Clone`
impl<C> Clone for Task<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Task<C> {}

impl<C> core::fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("param", &self.param)
            .field("expire", &self.expire)
            .field("period", &self.period)
            .finish()
    }
}
