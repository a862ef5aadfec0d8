pub mod error;
pub use error::{ControllerError, TimeoutError};

pub mod controller;
pub use controller::{Controller, ControllerBuilder, TaskHandle};

pub mod event;
pub use event::{Event, EventKind, Subscribe};

mod batch;
pub use batch::{batch_execute, batch_execute_with};

mod map;
pub use map::concurrent_map;

mod retry;
pub use retry::{retry, retry_with};

mod timeout;
pub use timeout::{spawn_with_timeout, with_timeout};

mod util;

pub mod prelude {
    pub use crate::{
        Controller, ControllerError, TaskHandle, TimeoutError, batch_execute, concurrent_map, retry,
        with_timeout,
    };
    pub use pacer_model::{TaskResult, TaskStatus};
}
