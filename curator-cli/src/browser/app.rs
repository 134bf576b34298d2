//! The browser update loop.
//!
//! `update` is the only place state changes. Every async result and timer
//! comes back through it as a [`Msg`], and stale deliveries are filtered by
//! the generation token each message carries.

use crate::api::{CompanyStatus, TransferJob, TransferRequest};
use crate::browser::commands;
use crate::browser::job::JobTransition;
use crate::browser::msg::Msg;
use crate::browser::state::{State, TransferContext};
use crate::command::Command;

pub fn update(state: &mut State, msg: Msg) -> Command<Msg> {
    match msg {
        Msg::CollectionsLoaded(Ok(collections)) => {
            state.collections_loading = false;
            state.registry.load(collections);
            refresh_list(state)
        }
        Msg::CollectionsLoaded(Err(e)) => {
            state.collections_loading = false;
            log::error!("failed to load collections: {}", e);
            state
                .notifications
                .error("Failed to load collections", e.message());
            Command::None
        }

        Msg::CollectionSelected(id) => {
            if state.registry.select(&id) {
                refresh_list(state)
            } else {
                log::warn!("ignoring selection of unknown collection {}", id);
                Command::None
            }
        }

        Msg::SearchChanged(term) => {
            if state.list.search == term {
                return Command::None;
            }
            state.list.search = term;
            refresh_list(state)
        }

        Msg::PageLoaded { generation, result } => {
            if !state.list.is_current(generation) {
                log::debug!("discarding stale page load");
                return Command::None;
            }
            match result {
                Ok(page) => {
                    if let Some(collection) = state.registry.selected() {
                        let id = collection.id.clone();
                        state.list.apply_refresh(&id, page);
                    }
                }
                Err(e) => state.list.fail_refresh(e.message()),
            }
            Command::None
        }

        Msg::LoadMoreRequested => {
            if !state
                .list
                .trigger_allowed(state.config.load_trigger_spacing())
            {
                return Command::None;
            }
            if !state.list.can_load_more() {
                return Command::None;
            }
            let Some(collection) = state.registry.selected() else {
                return Command::None;
            };
            let collection_id = collection.id.clone();
            let (offset, generation) = state.list.begin_load_more();
            commands::load_next_page(
                state.api.clone(),
                collection_id,
                state.list.search.clone(),
                offset,
                state.config.page_size,
                generation,
            )
        }

        Msg::MorePageLoaded { generation, result } => {
            if !state.list.is_current(generation) {
                log::debug!("discarding stale page append");
                return Command::None;
            }
            match result {
                Ok(page) => state.list.apply_load_more(page),
                Err(e) => {
                    log::warn!("load more failed: {}", e);
                    state.list.fail_load_more(e.is_not_found());
                }
            }
            Command::None
        }

        Msg::RowsReordered(companies) => {
            state.list.reorder(companies);
            state.selection.invalidate_anchor();
            Command::None
        }

        Msg::RowClicked {
            index,
            range_select,
        } => {
            state
                .selection
                .click(index, range_select, &state.list.companies);
            Command::None
        }

        Msg::ToggleSelectAll => {
            state.selection.toggle_select_all(&state.list.loaded_ids());
            Command::None
        }

        Msg::ClearSelection => {
            state.selection.clear();
            Command::None
        }

        Msg::TransferRequested {
            dest_collection_id,
            transfer_all,
        } => start_transfer(state, dest_collection_id, transfer_all),

        Msg::TransferSubmitted { ctx, result } => match result {
            Ok(response) => finish_submission(state, ctx, response),
            Err(e) => {
                if !ctx.is_large {
                    state.list.optimistic_restore(ctx.removed);
                }
                log::error!("transfer submission failed: {}", e);
                state.notifications.error("Transfer failed", e.message());
                Command::None
            }
        },

        Msg::PollDue(generation) => {
            if !state.job.is_current(generation) {
                return Command::None;
            }
            let Some(job) = state.job.current() else {
                return Command::None;
            };
            commands::poll_job(state.api.clone(), job.job_id.clone(), generation)
        }

        Msg::PollCompleted { generation, result } => {
            if !state.job.is_current(generation) {
                log::debug!("discarding stale job poll");
                return Command::None;
            }
            match result {
                Ok(job) => handle_job_snapshot(state, generation, job),
                Err(e) => {
                    // Polling stops here; the delayed authoritative refresh
                    // still corrects counts if the job finished server-side.
                    log::warn!("job status poll failed: {}", e);
                    Command::None
                }
            }
        }

        Msg::JobDisplayExpired(generation) => {
            if state.job.is_current(generation) {
                state.job.clear();
                state.active_transfer = None;
            }
            Command::None
        }

        Msg::ListReloadDue(generation) => {
            if generation != state.reload_generation {
                return Command::None;
            }
            state.list.clear_cache();
            refresh_list(state)
        }

        Msg::CollectionsRefreshDue(token) => {
            if !state.registry.is_current(token) {
                return Command::None;
            }
            commands::refresh_collections(state.api.clone())
        }

        Msg::CollectionsRefreshed(result) => {
            match result {
                Ok(collections) => state.registry.apply_refresh(collections),
                // Counts stay optimistic until a later refresh succeeds.
                Err(e) => log::warn!("collection refresh failed: {}", e),
            }
            Command::None
        }
    }
}

/// Show the selected collection filtered by the current search term, either
/// from cache or by fetching the first page.
fn refresh_list(state: &mut State) -> Command<Msg> {
    let Some(collection) = state.registry.selected() else {
        return Command::None;
    };
    let collection_id = collection.id.clone();
    state.selection.invalidate_anchor();
    match state.list.refresh(&collection_id) {
        None => Command::None,
        Some(generation) => commands::load_first_page(
            state.api.clone(),
            collection_id,
            state.list.search.clone(),
            state.config.page_size,
            generation,
        ),
    }
}

/// Classify the transfer, apply the optimistic mutation, announce it, and
/// submit the request.
fn start_transfer(state: &mut State, dest_collection_id: String, transfer_all: bool) -> Command<Msg> {
    let Some(source) = state.registry.selected() else {
        return Command::None;
    };
    let source_collection_id = source.id.clone();
    if source_collection_id == dest_collection_id {
        log::warn!("ignoring transfer into the current collection");
        return Command::None;
    }

    let selected_ids = state.selection.selected_in(&state.list.companies);
    if !transfer_all && selected_ids.is_empty() {
        return Command::None;
    }

    let dest_name = state
        .registry
        .get(&dest_collection_id)
        .map(|c| c.collection_name.clone())
        .unwrap_or_default();
    let new_status = CompanyStatus::from_collection_name(&dest_name);
    let is_large = transfer_all || selected_ids.len() > state.config.small_batch_threshold;

    let mut removed = Vec::new();
    let mut patched = Vec::new();
    let affected_count = if is_large {
        let ids = if transfer_all {
            state.list.loaded_ids()
        } else {
            selected_ids.clone()
        };
        patched = state.list.optimistic_status_patch(&ids, new_status);
        patched.len()
    } else {
        removed = state.list.optimistic_remove(&selected_ids);
        removed.len()
    };
    state.selection.clear();

    let (action, _) = new_status.action_text();
    state.notifications.info(
        format!("Processing {} {}", affected_count, company_label(affected_count)),
        format!("{}...", action),
    );

    let ctx = TransferContext {
        source_collection_id,
        dest_collection_id: dest_collection_id.clone(),
        new_status,
        company_ids: selected_ids.clone(),
        transfer_all,
        affected_count,
        is_large,
        removed,
        patched,
    };
    let request = TransferRequest {
        company_ids: selected_ids,
        dest_collection_id,
        transfer_all,
    };
    commands::submit_transfer(state.api.clone(), ctx, request)
}

/// Post-submission effects: optimistic count shift, debounced registry
/// refresh, and either an immediate success or the start of job polling.
fn finish_submission(
    state: &mut State,
    ctx: TransferContext,
    response: crate::api::TransferResponse,
) -> Command<Msg> {
    let mut cmds = Vec::new();
    let is_large = ctx.is_large;

    state.registry.apply_counts(
        &ctx.source_collection_id,
        &ctx.dest_collection_id,
        ctx.affected_count as u64,
    );

    match response.job_id {
        Some(job_id) => {
            let estimated_total = if ctx.transfer_all {
                state.config.transfer_all_estimated_total
            } else {
                ctx.company_ids.len() as u64
            };
            let generation = state.job.begin(job_id.clone(), estimated_total);
            state.active_transfer = Some(ctx);
            cmds.push(commands::poll_job(state.api.clone(), job_id, generation));
        }
        // Large transfers stay quiet here: their rows are only
        // status-patched, so the success report and the cache clear wait
        // for the confirmed completion.
        None if !is_large => {
            let (_, done) = ctx.new_status.action_text();
            state.notifications.success(
                "Status updated!",
                format!(
                    "{} {} {}",
                    ctx.affected_count,
                    company_label(ctx.affected_count),
                    done
                ),
            );
            // Cached snapshots of other collections are stale now.
            state.list.clear_cache();
        }
        None => {}
    }

    let token = state.registry.schedule_refresh();
    cmds.push(Command::delay(
        state.config.registry_refresh_delay(is_large),
        Msg::CollectionsRefreshDue(token),
    ));

    Command::batch(cmds)
}

/// Fold in a job poll snapshot and run transition side effects.
fn handle_job_snapshot(state: &mut State, generation: u64, job: TransferJob) -> Command<Msg> {
    let is_terminal = job.status.is_terminal();
    let transition = state.job.apply(job.clone());
    let mut cmds = Vec::new();

    match transition {
        Some(JobTransition::Completed) => {
            state.notifications.success(
                "Status updated!",
                format!(
                    "{} {} processed successfully",
                    job.total,
                    company_label(job.total as usize)
                ),
            );

            // Counts changed server-side; refresh now instead of waiting out
            // the submission-time debounce.
            state.registry.cancel_pending();
            cmds.push(commands::refresh_collections(state.api.clone()));

            // Reload the list after the server settles.
            state.reload_generation += 1;
            cmds.push(Command::delay(
                state.config.reload_settle(),
                Msg::ListReloadDue(state.reload_generation),
            ));
        }
        Some(JobTransition::Failed) => {
            state.notifications.error(
                "Update failed",
                job.error_message
                    .clone()
                    .unwrap_or_else(|| "The transfer could not be completed".to_string()),
            );
            if state.config.rollback_patch_on_job_failure {
                if let Some(ctx) = &state.active_transfer {
                    let patched = ctx.patched.clone();
                    state.list.restore_statuses(&patched);
                }
            }
        }
        Some(JobTransition::Started) | None => {}
    }

    if is_terminal {
        cmds.push(Command::delay(
            state.config.completion_display(),
            Msg::JobDisplayExpired(generation),
        ));
    } else {
        cmds.push(Command::delay(
            state.config.poll_interval(),
            Msg::PollDue(generation),
        ));
    }

    Command::batch(cmds)
}

fn company_label(count: usize) -> &'static str {
    if count == 1 {
        "company"
    } else {
        "companies"
    }
}
