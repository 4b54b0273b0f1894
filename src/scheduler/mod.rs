/*!
 * Request scheduling.
 *
 * - `queue`: the bounded multi-lane priority queue
 * - `scheduler`: the dispatch loop, deadlines and shutdown
 */

pub use self::queue::{PriorityQueue, QueueItem};
pub use self::scheduler::{RequestProcessor, Scheduler, SchedulerStats};

pub mod queue;
#[allow(clippy::module_inception)]
pub mod scheduler;
