mod task;

pub use task::{RecordId, Task, TaskRecord, TaskStatus, parse_timestamp};
