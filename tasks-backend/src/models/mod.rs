mod task;
mod user;

pub use task::{DEFAULT_PRIORITY, NewTask, NewTaskV2, Task, TaskDraft, TaskV1};
pub use user::{TokenResponse, User, UserInDb};
