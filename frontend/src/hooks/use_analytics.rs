use crate::services::analytics::{aggregate_by_category, filter_transactions};
use crate::services::api::{redirect_to_login, ApiClient, ApiError};
use crate::services::date_utils;
use crate::services::logging::Logger;
use crate::state::filter::{FilterController, FilterEdit};
use shared::{CategoryAggregate, Transaction};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
pub struct AnalyticsState {
    pub transactions: Vec<Transaction>,
    pub category_data: Vec<CategoryAggregate>,
    /// Snapshot of the draft/applied filters for rendering.
    pub controller: FilterController,
    pub loading: bool,
    /// True while a submit is in flight; the UI disables the submit button
    /// so a second submit cannot race the first.
    pub filter_loading: bool,
}

#[derive(Clone)]
pub struct UseAnalyticsActions {
    pub refresh: Callback<()>,
    /// Edit the draft filter; the displayed aggregates do not move.
    pub edit_filter: Callback<FilterEdit>,
    /// Commit the draft and recompute, preferring the server summary.
    pub submit_filters: Callback<()>,
    /// Back to the default filter, recomputed locally.
    pub reset_filters: Callback<()>,
}

pub struct UseAnalyticsResult {
    pub state: AnalyticsState,
    pub actions: UseAnalyticsActions,
}

/// Analytics view hook: owns the filter controller and keeps the category
/// breakdown in sync with the applied filter.
///
/// On submit the locally aggregated result shows immediately, then the
/// server-side summary for the same kind is fetched opportunistically: a
/// successful, non-empty server response overrides the local aggregation,
/// unless a newer submit or reset has happened in the meantime (each
/// submission carries a sequence number and stale responses are dropped).
///
/// The controller and the transaction cache live in shared cells so that
/// async continuations always see the latest state; `snapshot` is the copy
/// handed to the rendering layer.
#[hook]
pub fn use_analytics(api_client: &ApiClient) -> UseAnalyticsResult {
    let controller = use_mut_ref(|| FilterController::new(date_utils::today()));
    let transaction_cache = use_mut_ref(Vec::<Transaction>::new);

    let snapshot = use_state(|| controller.borrow().clone());
    let transactions = use_state(Vec::<Transaction>::new);
    let category_data = use_state(Vec::<CategoryAggregate>::new);
    let loading = use_state(|| true);
    let filter_loading = use_state(|| false);

    let refresh = {
        let api_client = api_client.clone();
        let controller = controller.clone();
        let transaction_cache = transaction_cache.clone();
        let transactions = transactions.clone();
        let category_data = category_data.clone();
        let loading = loading.clone();

        use_callback((), move |_, _| {
            let api_client = api_client.clone();
            let controller = controller.clone();
            let transaction_cache = transaction_cache.clone();
            let transactions = transactions.clone();
            let category_data = category_data.clone();
            let loading = loading.clone();

            spawn_local(async move {
                loading.set(true);

                let list = match api_client.get_transactions().await {
                    Ok(list) => list,
                    Err(ApiError::Unauthorized) => {
                        redirect_to_login();
                        return;
                    }
                    Err(e) => {
                        Logger::error_with_component(
                            "use_analytics",
                            &format!("failed to fetch transactions: {}", e),
                        );
                        Vec::new()
                    }
                };

                let (applied, seq) = {
                    let controller = controller.borrow();
                    (controller.applied().clone(), controller.current_seq())
                };
                category_data.set(aggregate_by_category(&filter_transactions(
                    &list, &applied,
                )));
                *transaction_cache.borrow_mut() = list.clone();
                transactions.set(list);

                // The server summary is preferred when it has data.
                match api_client.get_category_analytics(&applied.kind).await {
                    Ok(server_data) if !server_data.is_empty() => {
                        if controller.borrow().is_current(seq) {
                            category_data.set(server_data);
                        }
                    }
                    Ok(_) => {}
                    Err(ApiError::Unauthorized) => {
                        redirect_to_login();
                        return;
                    }
                    Err(e) => {
                        Logger::info_with_component(
                            "use_analytics",
                            &format!("using local aggregation, server summary failed: {}", e),
                        );
                    }
                }

                loading.set(false);
            });
        })
    };

    let edit_filter = {
        let controller = controller.clone();
        let snapshot = snapshot.clone();
        use_callback((), move |edit: FilterEdit, _| {
            controller.borrow_mut().edit_draft(edit);
            snapshot.set(controller.borrow().clone());
        })
    };

    let submit_filters = {
        let api_client = api_client.clone();
        let controller = controller.clone();
        let transaction_cache = transaction_cache.clone();
        let snapshot = snapshot.clone();
        let category_data = category_data.clone();
        let filter_loading = filter_loading.clone();

        use_callback((), move |_, _| {
            let api_client = api_client.clone();
            let controller = controller.clone();
            let category_data = category_data.clone();
            let filter_loading = filter_loading.clone();

            let (applied, seq) = controller.borrow_mut().submit();
            snapshot.set(controller.borrow().clone());
            filter_loading.set(true);

            // Optimistic path: recompute locally right away.
            category_data.set(aggregate_by_category(&filter_transactions(
                &transaction_cache.borrow(),
                &applied,
            )));

            spawn_local(async move {
                match api_client.get_category_analytics(&applied.kind).await {
                    Ok(server_data) if !server_data.is_empty() => {
                        if controller.borrow().is_current(seq) {
                            category_data.set(server_data);
                        } else {
                            Logger::debug_with_component(
                                "use_analytics",
                                "dropping stale category summary response",
                            );
                        }
                    }
                    Ok(_) => {
                        Logger::debug_with_component(
                            "use_analytics",
                            "server summary empty, keeping local aggregation",
                        );
                    }
                    Err(ApiError::Unauthorized) => {
                        redirect_to_login();
                        return;
                    }
                    Err(e) => {
                        Logger::info_with_component(
                            "use_analytics",
                            &format!("using local aggregation, server summary failed: {}", e),
                        );
                    }
                }

                filter_loading.set(false);
            });
        })
    };

    let reset_filters = {
        let controller = controller.clone();
        let transaction_cache = transaction_cache.clone();
        let snapshot = snapshot.clone();
        let category_data = category_data.clone();

        use_callback((), move |_, _| {
            let default = controller.borrow_mut().reset(date_utils::today());
            snapshot.set(controller.borrow().clone());

            // No server round-trip on reset; the local recompute is the
            // whole story.
            category_data.set(aggregate_by_category(&filter_transactions(
                &transaction_cache.borrow(),
                &default,
            )));
        })
    };

    // Initial fetch on mount.
    {
        let refresh = refresh.clone();
        use_effect_with((), move |_| {
            refresh.emit(());
            || ()
        });
    }

    UseAnalyticsResult {
        state: AnalyticsState {
            transactions: (*transactions).clone(),
            category_data: (*category_data).clone(),
            controller: (*snapshot).clone(),
            loading: *loading,
            filter_loading: *filter_loading,
        },
        actions: UseAnalyticsActions {
            refresh,
            edit_filter,
            submit_filters,
            reset_filters,
        },
    }
}
