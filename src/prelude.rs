pub use crate::counter::{AnimatedCounter, CounterSpec, DisplayKind, NumberFormat};
pub use crate::feedback::{Notification, Notifier, Severity, ToastQueue};
pub use crate::form::{
    ContactFieldError, ContactForm, ContactFormController, FieldLens, FormModel, SubmitOptions,
    SubmitOutcome, SubmitState,
};
pub use crate::motion::CounterMotion;
pub use crate::schedule::{ManualScheduler, Scheduler, SpawnScheduler, TaskHandle};
pub use crate::stats::{StatBoard, StatItem, default_stats};
pub use crate::view::{ViewNode, contact_form_view, stat_card_view, toast_view};
