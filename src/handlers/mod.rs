//! Event handlers, grouped by feature.

pub mod attachments;
pub mod my_tasks;
pub mod quick_edit;
pub mod start;
pub mod task_add;
pub mod task_edit;
pub mod task_users;
pub mod task_view;
pub mod users;

use std::sync::Arc;

use crate::app::AppState;
use crate::state::Flow;
use crate::telegram::MessageEvent;
use crate::Result;

/// Route a message consumed by the actor's active flow to its handler.
///
/// # Errors
///
/// Propagates the underlying handler error; the dispatcher is the error
/// boundary.
pub async fn flow_input(event: &MessageEvent, flow: Flow, state: &Arc<AppState>) -> Result<()> {
    match flow {
        Flow::WaitingForTitle | Flow::ConfirmingTask { .. } => {
            task_add::handle_title_input(event, state).await
        }
        Flow::WaitingForName { task_id, origin } => {
            task_edit::handle_name_input(event, task_id, origin, state).await
        }
        Flow::WaitingForDesc { task_id, origin } => {
            task_edit::handle_desc_input(event, task_id, origin, state).await
        }
        Flow::WaitingForDeadline { task_id, origin } => {
            task_edit::handle_deadline_input(event, task_id, origin, state).await
        }
        Flow::WaitingForGroupName { task_id, origin } => {
            task_edit::handle_group_name_input(event, task_id, origin, state).await
        }
        Flow::WaitingForTopicName { task_id, origin } => {
            task_edit::handle_topic_name_input(event, task_id, origin, state).await
        }
        Flow::WaitingForUsername { task_id } => {
            users::handle_username_input(event, task_id, state).await
        }
        Flow::CollectingAttachments { task_id } => {
            attachments::handle_collect(event, task_id, state).await
        }
    }
}
