pub mod crud;
pub mod dialog;
pub mod export;
pub mod form;
pub mod format;
pub mod methods;
pub mod notify;
pub mod regions;
pub mod settings;
pub mod table;

pub use crud::{CrudController, CrudSnapshot, Resource};
pub use form::{FieldError, FieldSpec, FormFields};
pub use methods::MethodsController;
pub use notify::{ChannelConfirm, ChannelNotifier, ConfirmDialog, NotificationSink};
pub use regions::RegionsController;
pub use settings::SettingsController;
pub use table::{Column, Pagination};
