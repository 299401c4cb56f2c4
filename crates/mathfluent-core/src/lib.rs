//! # MathFluent Core
//!
//! Client-side logic of the MathFluent math tutor:
//!
//! - **Solutions**: parse tutor output into steps and fetch per-step explanations
//! - **Chat**: optimistic sends, snapshot reconciliation and cancellable subscriptions
//! - **Collaborators**: the [`MathTutor`] and [`ChatStore`] traits the server implements
//! - **Session**: mock sign-in persisted to a local file

pub mod chat;
pub mod error;
pub mod models;
pub mod session;
pub mod solution;
pub mod store;
pub mod teachers;
pub mod tutor;
pub mod validation;

pub use chat::{direct_thread_id, merge_snapshot, ChatView, Notice, Snapshot, Subscription};
pub use error::{CoreError, FieldError, Result};
pub use models::{
    ChatRoom, Conversation, DirectThread, Message, MessageStatus, OutgoingMessage, Sender, User,
};
pub use session::SessionContext;
pub use solution::{parse_steps, SolutionSession, SolutionStep};
pub use store::ChatStore;
pub use tutor::{ExplainRequest, MathTutor, SolveRequest, TutorReply};
pub use validation::ChatRoomForm;
