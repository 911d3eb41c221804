pub mod calendar;
pub mod capability;
pub mod context;
pub mod dispatcher;
pub mod drive;
pub mod mail;
pub mod report;
pub mod resolver;

pub use capability::{
    AttachmentInfo, CalendarCapability, CalendarEvent, CreatedEvent, DriveCapability, DriveFile,
    DriveQuery, FOLDER_MIME_TYPE, Label, MailCapability, MessageDetail, MessageRef,
    MessageSummary, NewEvent, OutgoingMessage, PermissionRequest, Summarizer,
};
pub use context::{ContextUpdate, ExecutionContext, ResultItem};
pub use dispatcher::{BatchSummary, Capabilities, Clock, Dispatcher, FixedClock, StepOutcome, SystemClock};
pub use report::{MemoryReporter, ReportEvent, Reporter, StdoutReporter, StepReport, StepStatus};
pub use resolver::{NameResolver, ResolverCache};
